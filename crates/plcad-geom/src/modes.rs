//! LP mode cutoffs and the mode-to-core assignment used by mode selective lanterns.

use std::collections::BTreeMap;

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::CoreMap;

use crate::layout::multilayer_layout;

/// Normalised cutoff frequency of each LP mode (zeros of the Bessel functions).
pub const LP_MODE_CUTOFFS: [(&str, f64); 26] = [
    ("LP01", 0.000),
    ("LP11", 2.405),
    ("LP21", 3.832),
    ("LP02", 3.832),
    ("LP31", 5.136),
    ("LP12", 5.520),
    ("LP41", 6.380),
    ("LP22", 7.016),
    ("LP03", 7.016),
    ("LP51", 7.588),
    ("LP13", 8.654),
    ("LP32", 8.417),
    ("LP61", 8.772),
    ("LP42", 9.761),
    ("LP71", 9.936),
    ("LP23", 10.174),
    ("LP04", 10.174),
    ("LP52", 11.065),
    ("LP81", 11.086),
    ("LP33", 11.620),
    ("LP14", 11.792),
    ("LP91", 12.225),
    ("LP62", 12.339),
    ("LP43", 13.015),
    ("LP24", 13.324),
    ("LP05", 13.324),
];

fn cutoff(mode: &str) -> Option<f64> {
    LP_MODE_CUTOFFS
        .iter()
        .find(|(name, _)| *name == mode)
        .map(|(_, value)| *value)
}

/// Azimuthal (`m`) and radial (`l`) numbers of an `LPml` mode name.
pub fn mode_numbers(mode: &str) -> Option<(u32, u32)> {
    let digits = mode.strip_prefix("LP")?;
    let mut chars = digits.chars();
    let azimuthal = chars.next()?.to_digit(10)?;
    let radial = chars.next()?.to_digit(10)?;
    if chars.next().is_some() {
        return None;
    }
    Some((azimuthal, radial))
}

/// Modes whose cutoff does not exceed that of `highest_mode`, ordered by cutoff.
pub fn modes_below_cutoff(highest_mode: &str) -> Result<Vec<&'static str>, PlcadError> {
    let limit = cutoff(highest_mode).ok_or_else(|| {
        PlcadError::Geometry(
            ErrorInfo::new("modes.unknown", "mode not found in the cutoff table")
                .with_context("mode", highest_mode),
        )
    })?;
    let mut modes: Vec<(&'static str, f64)> = LP_MODE_CUTOFFS
        .iter()
        .filter(|(_, value)| *value <= limit)
        .copied()
        .collect();
    modes.sort_by(|a, b| a.1.total_cmp(&b.1));
    Ok(modes.into_iter().map(|(name, _)| name).collect())
}

/// Groups modes by radial number, preserving their order within each group.
pub fn group_by_radial<'a>(modes: &[&'a str]) -> BTreeMap<u32, Vec<&'a str>> {
    let mut groups: BTreeMap<u32, Vec<&'a str>> = BTreeMap::new();
    for mode in modes {
        if let Some((_, radial)) = mode_numbers(mode) {
            groups.entry(radial).or_default().push(mode);
        }
    }
    groups
}

/// One layer per radial group, highest radial number innermost.
///
/// Modes with a non-zero azimuthal number occupy two cores (`a`/`b`
/// orientations), the rest one.
pub fn layers_for_modes(groups: &BTreeMap<u32, Vec<&str>>) -> Vec<(usize, f64)> {
    groups
        .iter()
        .rev()
        .map(|(_, modes)| {
            let circles = modes
                .iter()
                .map(|mode| match mode_numbers(mode) {
                    Some((azimuthal, _)) if azimuthal > 0 => 2,
                    _ => 1,
                })
                .sum();
            (circles, 1.0)
        })
        .collect()
}

/// Core map keyed by mode name for every mode up to `highest_mode`, plus the
/// enclosing capillary diameter.
pub fn mode_core_map(highest_mode: &str, cladding_dia: f64) -> Result<(CoreMap, f64), PlcadError> {
    let supported = modes_below_cutoff(highest_mode)?;
    let groups = group_by_radial(&supported);
    let layers = layers_for_modes(&groups);
    let layout = multilayer_layout(cladding_dia, &layers);
    let cap_dia = layout.capillary_diameter(cladding_dia);

    let mut core_map = CoreMap::new();
    for (layer_idx, modes) in groups.values().rev().enumerate() {
        let Some(coords) = layout.layers.get(layer_idx) else {
            break;
        };
        let mut cursor = 0;
        for mode in modes {
            let azimuthal = mode_numbers(mode).map(|(m, _)| m).unwrap_or(0);
            if azimuthal > 0 && cursor + 1 < coords.len() {
                core_map.insert(format!("{mode}a"), coords[cursor]);
                core_map.insert(format!("{mode}b"), coords[cursor + 1]);
                cursor += 2;
            } else if cursor < coords.len() {
                core_map.insert(*mode, coords[cursor]);
                cursor += 1;
            }
        }
    }
    Ok((core_map, cap_dia))
}

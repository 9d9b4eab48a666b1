//! Packing of cladding circles into concentric rings.

use std::f64::consts::{FRAC_PI_2, PI};

use plcad_core::{Coord, CoreMap};
use serde::{Deserialize, Serialize};

/// Circles evenly spaced around a reference circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingLayout {
    /// Radius of the reference circle through the centres.
    pub radius: f64,
    /// Circle centres, starting at the rotation angle.
    pub centres: Vec<Coord>,
}

/// Centres and reference radius for each packed layer, innermost first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultilayerLayout {
    /// Centres of each layer.
    pub layers: Vec<Vec<Coord>>,
    /// Reference radius of each layer.
    pub radii: Vec<f64>,
}

impl MultilayerLayout {
    fn centre_only() -> Self {
        Self {
            layers: vec![vec![Coord::new(0.0, 0.0)]],
            radii: vec![0.0],
        }
    }

    /// Total number of placed circles.
    pub fn count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    /// Diameter of the capillary that encloses every layer.
    pub fn capillary_diameter(&self, cladding_dia: f64) -> f64 {
        match self.radii.last() {
            Some(radius) => 2.0 * radius + cladding_dia,
            None => cladding_dia,
        }
    }
}

/// Places `n` touching circles of diameter `cladding_dia` on a ring, the first
/// at angle `rotation`. A single circle sits at the origin.
pub fn ring_layout(cladding_dia: f64, n: usize, rotation: f64) -> RingLayout {
    match n {
        0 => RingLayout {
            radius: 0.0,
            centres: Vec::new(),
        },
        1 => RingLayout {
            radius: cladding_dia / 2.0,
            centres: vec![Coord::new(0.0, 0.0)],
        },
        _ => {
            let radius = cladding_dia / (2.0 * (PI / n as f64).sin());
            let centres = (0..n)
                .map(|idx| {
                    let angle = 2.0 * PI * idx as f64 / n as f64 + rotation;
                    Coord::new(radius * angle.cos(), radius * angle.sin())
                })
                .collect();
            RingLayout { radius, centres }
        }
    }
}

/// Densest concentric packing for `layers` given as `(circle count, scale factor)`.
///
/// Scale factors are carried for configuration compatibility; packing is
/// always the touching arrangement. A centre circle with a single ring puts
/// the ring at one cladding diameter; otherwise each layer sits one cladding
/// diameter outside the previous one.
pub fn multilayer_layout(cladding_dia: f64, layers: &[(usize, f64)]) -> MultilayerLayout {
    let total: usize = layers.iter().map(|(n, _)| n).sum();
    if total <= 1 {
        return MultilayerLayout::centre_only();
    }

    if layers.len() == 2 && layers[0].0 == 1 && layers[1].0 > 0 {
        let n_outer = layers[1].0;
        let outer_radius = cladding_dia;
        let ring = ring_layout(cladding_dia, n_outer, FRAC_PI_2);
        let norm = if n_outer > 1 {
            let first = ring.centres[0];
            (first.x * first.x + first.y * first.y).sqrt()
        } else {
            1.0
        };
        let outer = if norm > 0.0 {
            ring.centres
                .iter()
                .map(|coord| coord.scaled(outer_radius / norm))
                .collect()
        } else {
            ring.centres
        };
        return MultilayerLayout {
            layers: vec![vec![Coord::new(0.0, 0.0)], outer],
            radii: vec![0.0, outer_radius],
        };
    }

    let mut layout = MultilayerLayout {
        layers: Vec::new(),
        radii: Vec::new(),
    };
    let mut previous_radius = 0.0;
    for (idx, &(n, _)) in layers.iter().enumerate() {
        if n == 0 {
            continue;
        }
        let ring = ring_layout(cladding_dia, n, FRAC_PI_2);
        if idx == 0 {
            if n == 1 {
                layout.layers.push(vec![Coord::new(0.0, 0.0)]);
                layout.radii.push(0.0);
                previous_radius = 0.0;
            } else {
                layout.layers.push(ring.centres);
                layout.radii.push(ring.radius);
                previous_radius = ring.radius;
            }
        } else {
            let optimal = previous_radius + cladding_dia;
            let centres = if ring.radius > 0.0 {
                let scale = optimal / ring.radius;
                ring.centres.iter().map(|coord| coord.scaled(scale)).collect()
            } else {
                ring.centres
            };
            layout.layers.push(centres);
            layout.radii.push(optimal);
            previous_radius = optimal;
        }
    }
    layout
}

/// Core map keyed `"0"`, `"1"`, … in layer order, plus the enclosing capillary diameter.
pub fn indexed_core_map(layers: &[(usize, f64)], cladding_dia: f64) -> (CoreMap, f64) {
    let layout = multilayer_layout(cladding_dia, layers);
    let cap_dia = layout.capillary_diameter(cladding_dia);
    let core_map = layout
        .layers
        .iter()
        .flatten()
        .enumerate()
        .map(|(idx, coord)| (idx.to_string(), *coord))
        .collect();
    (core_map, cap_dia)
}

//! Closed-form taper evaluation and the sigmoid taper ratio profile.

use plcad_core::errors::{ErrorInfo, PlcadError};
use serde::{Deserialize, Serialize};

const DEFAULT_TAPER_LENGTH: f64 = 100.0;
const DEFAULT_START_DIA: f64 = 10.0;
const DEFAULT_END_DIA: f64 = 5.0;
const DEFAULT_TAPER_RATE: f64 = -0.05;

/// Geometry of a linear taper evaluated at one position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaperProperties {
    /// Diameter at the requested position.
    pub diameter: f64,
    /// Change in diameter per unit length.
    pub taper_rate: f64,
    /// Ratio of start to end diameter.
    pub taper_factor: f64,
    /// Diameter at the end of the taper.
    pub end_dia: f64,
}

/// Evaluates a linear taper at `position`.
///
/// A taper factor takes precedence: the missing diameter is derived from the
/// one given (or from a 10 µm start when neither is). Without a factor a
/// missing diameter is extrapolated with a rate of -0.05 per unit length.
/// The taper length defaults to 100 and `position` must lie within it.
pub fn taper_properties(
    position: f64,
    start_dia: Option<f64>,
    end_dia: Option<f64>,
    taper_length: Option<f64>,
    taper_factor: Option<f64>,
) -> Result<TaperProperties, PlcadError> {
    let taper_length = taper_length.unwrap_or(DEFAULT_TAPER_LENGTH);
    let (start, end) = match taper_factor {
        Some(factor) => {
            if factor == 0.0 || !factor.is_finite() {
                return Err(PlcadError::Geometry(
                    ErrorInfo::new("taper.factor", "taper factor must be finite and non-zero")
                        .with_context("taper_factor", factor.to_string()),
                ));
            }
            match (start_dia, end_dia) {
                (Some(start), _) => (start, start / factor),
                (None, Some(end)) => (end * factor, end),
                (None, None) => (DEFAULT_START_DIA, DEFAULT_START_DIA / factor),
            }
        }
        None => match (start_dia, end_dia) {
            (Some(start), Some(end)) => (start, end),
            (None, None) => (DEFAULT_START_DIA, DEFAULT_END_DIA),
            (None, Some(end)) => (end - DEFAULT_TAPER_RATE * taper_length, end),
            (Some(start), None) => (start, start - DEFAULT_TAPER_RATE * taper_length),
        },
    };

    if !(0.0..=taper_length).contains(&position) {
        return Err(PlcadError::Geometry(
            ErrorInfo::new("taper.position", "position lies outside the taper")
                .with_context("position", position.to_string())
                .with_context("taper_length", taper_length.to_string())
                .with_hint(format!("choose a position between 0 and {taper_length}")),
        ));
    }

    let taper_factor = if end != 0.0 { start / end } else { f64::INFINITY };
    let taper_rate = (end - start) / taper_length;
    Ok(TaperProperties {
        diameter: start + taper_rate * position,
        taper_rate,
        taper_factor,
        end_dia: end,
    })
}

fn sigmoid(x: f64, center: f64, width: f64) -> f64 {
    1.0 / (1.0 + (-(x - center) / width).exp())
}

/// Fraction of the taper completed at `z`, in `[0, 1]`.
///
/// Three overlapping sigmoids centred at one third, one half and two thirds
/// of the taper, weighted 0.1 / 0.8 / 0.1.
pub fn sigmoid_taper_ratio(z: f64, taper_length: f64) -> f64 {
    let s1 = sigmoid(z, taper_length * 0.33, taper_length / 6.0);
    let s2 = sigmoid(z, taper_length * 0.5, taper_length / 10.0);
    let s3 = sigmoid(z, taper_length * 0.67, taper_length / 6.0);
    (0.1 * s1 + 0.8 * s2 + 0.1 * s3).clamp(0.0, 1.0)
}

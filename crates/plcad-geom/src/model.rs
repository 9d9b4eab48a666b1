//! Sampled physical model of a lantern taper.

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::{Coord, CoreMap};
use serde::{Deserialize, Serialize};

use crate::taper::sigmoid_taper_ratio;

/// Capillary inner diameter property. The three property names here are
/// the ones [`TaperModel::interpolate`] accepts.
pub const CAPILLARY_INNER_DIAMETER: &str = "capillary_inner_diameter";
/// Capillary outer diameter property.
pub const CAPILLARY_OUTER_DIAMETER: &str = "capillary_outer_diameter";
/// Fiber cladding diameter property.
pub const FIBER_DIAMETER: &str = "fiber_diameter";

/// Inputs for [`TaperModel::build`]. Lengths and diameters in microns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaperModelSpec {
    /// Number of axial samples.
    pub num_points: usize,
    /// Taper length.
    pub taper_length: f64,
    /// Initial fiber cladding diameter.
    pub cladding_diameter: f64,
    /// Derived from `final_capillary_id` when absent.
    pub final_cladding_diameter: Option<f64>,
    /// Capillary inner diameter at the taper exit.
    pub final_capillary_id: f64,
    /// Initial capillary inner diameter.
    pub capillary_id: f64,
    /// Capillary outer diameter.
    pub capillary_od: f64,
}

/// Position and diameter of one fiber at the taper exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberEndpoint {
    /// Core label.
    pub label: String,
    /// Exit position.
    pub position: Coord,
    /// Exit cladding diameter.
    pub diameter: f64,
}

/// Fiber and capillary geometry sampled along the taper axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TaperModel {
    z: Vec<f64>,
    capillary_inner: Vec<f64>,
    capillary_outer: Vec<f64>,
    fiber_diameters: Vec<f64>,
    labels: Vec<String>,
    fiber_positions: Vec<Vec<Coord>>,
}

impl TaperModel {
    /// Samples the taper for the fibers placed by `core_map`.
    ///
    /// Capillary and fiber diameters blend from their initial to final values
    /// following [`sigmoid_taper_ratio`]; fiber positions shrink with the
    /// radius still available inside the capillary.
    pub fn build(spec: &TaperModelSpec, core_map: &CoreMap) -> Result<Self, PlcadError> {
        if spec.num_points < 2 {
            return Err(PlcadError::Geometry(
                ErrorInfo::new("model.num_points", "taper model needs at least two samples")
                    .with_context("num_points", spec.num_points.to_string()),
            ));
        }
        if !spec.taper_length.is_finite() || spec.taper_length <= 0.0 {
            return Err(PlcadError::Geometry(
                ErrorInfo::new("model.taper_length", "taper length must be positive")
                    .with_context("taper_length", spec.taper_length.to_string()),
            ));
        }
        if spec.capillary_id == 0.0 {
            return Err(PlcadError::Geometry(ErrorInfo::new(
                "model.capillary_id",
                "capillary inner diameter must be non-zero",
            )));
        }

        let num_fibers = core_map.len();
        let final_cladding = spec.final_cladding_diameter.unwrap_or_else(|| {
            if num_fibers > 1 {
                spec.final_capillary_id / (1.0 + 2.0 / (num_fibers as f64).sqrt())
            } else {
                spec.final_capillary_id / 3.0
            }
        });
        let labels: Vec<String> = core_map.keys().map(str::to_string).collect();
        let initial: Vec<Coord> = core_map.iter().map(|(_, coord)| coord).collect();
        let initial_available = spec.capillary_id / 2.0 - spec.cladding_diameter / 2.0;

        let last = (spec.num_points - 1) as f64;
        let mut model = TaperModel {
            z: Vec::with_capacity(spec.num_points),
            capillary_inner: Vec::with_capacity(spec.num_points),
            capillary_outer: Vec::with_capacity(spec.num_points),
            fiber_diameters: Vec::with_capacity(spec.num_points),
            labels,
            fiber_positions: Vec::with_capacity(spec.num_points),
        };
        for idx in 0..spec.num_points {
            let z = spec.taper_length * idx as f64 / last;
            let ratio = sigmoid_taper_ratio(z, spec.taper_length);
            let inner = spec.capillary_id * (1.0 - ratio) + spec.final_capillary_id * ratio;
            let outer = spec.capillary_od * (1.0 - ratio)
                + (inner / spec.capillary_id) * spec.capillary_od * ratio;
            let fiber = spec.cladding_diameter * (1.0 - ratio) + final_cladding * ratio;
            let current_available = inner / 2.0 - fiber / 2.0;
            let scale = if initial_available > 0.0 {
                current_available / initial_available
            } else {
                0.0
            };

            model.z.push(z);
            model.capillary_inner.push(inner);
            model.capillary_outer.push(outer);
            model.fiber_diameters.push(fiber);
            model
                .fiber_positions
                .push(initial.iter().map(|coord| coord.scaled(scale)).collect());
        }
        Ok(model)
    }

    /// Longitudinal sample positions.
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Fiber labels in core-map order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Samples of a named property.
    pub fn samples(&self, property: &str) -> Result<&[f64], PlcadError> {
        match property {
            CAPILLARY_INNER_DIAMETER => Ok(&self.capillary_inner),
            CAPILLARY_OUTER_DIAMETER => Ok(&self.capillary_outer),
            FIBER_DIAMETER => Ok(&self.fiber_diameters),
            other => Err(PlcadError::Geometry(
                ErrorInfo::new("model.property", "taper model has no such property")
                    .with_context("property", other)
                    .with_list(
                        "available",
                        [CAPILLARY_INNER_DIAMETER, CAPILLARY_OUTER_DIAMETER, FIBER_DIAMETER],
                    ),
            )),
        }
    }

    /// Piecewise-linear value of `property` at `position`, held constant beyond either end.
    pub fn interpolate(&self, property: &str, position: f64) -> Result<f64, PlcadError> {
        let values = self.samples(property)?;
        if !position.is_finite() {
            return Err(PlcadError::Geometry(
                ErrorInfo::new("model.position", "interpolation position must be finite")
                    .with_context("position", position.to_string()),
            ));
        }
        Ok(interpolate_linear(&self.z, values, position))
    }

    /// Position and diameter of each fiber at the last sample.
    pub fn endpoints(&self) -> Vec<FiberEndpoint> {
        let last = self.z.len() - 1;
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, label)| FiberEndpoint {
                label: label.clone(),
                position: self.fiber_positions[last][idx],
                diameter: self.fiber_diameters[last],
            })
            .collect()
    }

    /// Capillary inner diameter at the last sample.
    pub fn final_capillary_inner(&self) -> f64 {
        self.capillary_inner[self.capillary_inner.len() - 1]
    }
}

/// Linear interpolation over ascending `xs`, clamped to the end values.
pub fn interpolate_linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let upper = xs[..n].partition_point(|&sample| sample <= x);
    let lower = upper - 1;
    let span = xs[upper] - xs[lower];
    if span == 0.0 {
        return ys[lower];
    }
    let t = (x - xs[lower]) / span;
    ys[lower] + t * (ys[upper] - ys[lower])
}

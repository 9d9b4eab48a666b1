#![deny(missing_docs)]
#![doc = "Core traits and data types shared by the plcad lantern design generator."]

use std::path::Path;

use serde_json::Value;

pub mod errors;
pub mod params;
mod types;

pub use errors::{ErrorInfo, PlcadError};
pub use params::{LanternParams, LaunchMode, LaunchType, MonitorType, TaperConfig, TaperType};
pub use types::{Coord, CoreMap};

/// Ordered key/value pairs forwarded to a lantern's global design parameters.
pub type GlobalParams = [(String, Value)];

/// Contract every registered lantern archetype implements.
///
/// A builder is created empty by its factory, populated once through
/// [`LanternBuilder::create_lantern`], and then queried for the physical
/// geometry the simulation domain is derived from. Builders are owned by a
/// single invocation and never shared.
pub trait LanternBuilder {
    /// Constructs the lantern geometry and returns the core map.
    fn create_lantern(&mut self, params: &LanternParams) -> Result<CoreMap, PlcadError>;

    /// Diameter of the capillary that encloses the fiber bundle, in microns.
    fn capillary_outer_diameter(&self) -> f64;

    /// Evaluates a named property of the physical taper model at a longitudinal position.
    fn model_property(&self, property: &str, position: f64) -> Result<f64, PlcadError>;

    /// Merges simulation parameters into the design's global parameter block.
    fn update_global_params(&mut self, params: &GlobalParams);

    /// Serializes the design representation to `path`.
    fn write(&self, path: &Path) -> Result<(), PlcadError>;
}

impl std::fmt::Debug for dyn LanternBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanternBuilder").finish_non_exhaustive()
    }
}

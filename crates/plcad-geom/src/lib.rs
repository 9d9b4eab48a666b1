#![deny(missing_docs)]

//! Taper geometry, fiber layouts and LP mode tables for photonic lanterns.

pub mod layout;
pub mod model;
pub mod modes;
pub mod taper;

pub use layout::{indexed_core_map, multilayer_layout, ring_layout, MultilayerLayout, RingLayout};
pub use model::{
    interpolate_linear, FiberEndpoint, TaperModel, TaperModelSpec, CAPILLARY_INNER_DIAMETER,
    CAPILLARY_OUTER_DIAMETER, FIBER_DIAMETER,
};
pub use modes::{
    group_by_radial, layers_for_modes, mode_core_map, mode_numbers, modes_below_cutoff,
    LP_MODE_CUTOFFS,
};
pub use taper::{sigmoid_taper_ratio, taper_properties, TaperProperties};

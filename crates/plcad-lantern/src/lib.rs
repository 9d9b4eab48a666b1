#![deny(missing_docs)]

//! Design-file circuit and the built-in photonic lantern archetypes.
//!
//! [`PhotonicLantern`] places fibers in concentric rings from a
//! `layer_config`; [`ModeSelectiveLantern`] assigns one fiber per LP mode up
//! to `highest_mode`. Both share [`LayeredLantern`], which tapers the bundle
//! through a [`plcad_geom::TaperModel`] and records the result in a
//! [`DesignCircuit`].

pub mod circuit;
pub mod fiber;
pub mod layered;

pub use circuit::{DesignCircuit, PropertyList};
pub use fiber::{Fiber, FiberBundle, FiberProps};
pub use layered::{
    CoreLayout, LayeredLantern, ModeGroups, ModeSelectiveLantern, PhotonicLantern, RingLayers,
};

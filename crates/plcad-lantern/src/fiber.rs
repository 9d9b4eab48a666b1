//! Per-fiber optical properties and the bundle they form.

use std::collections::BTreeMap;

use plcad_core::{Coord, CoreMap};
use serde::{Deserialize, Serialize};

/// Dimensions in microns and refractive indices of one fiber.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiberProps {
    /// Core diameter.
    pub core_dia: f64,
    /// Cladding diameter.
    pub cladding_dia: f64,
    /// Core refractive index.
    pub core_index: f64,
    /// Cladding refractive index.
    pub cladding_index: f64,
    /// Background refractive index.
    pub bg_index: f64,
}

impl Default for FiberProps {
    fn default() -> Self {
        Self {
            core_dia: 10.4,
            cladding_dia: 125.0,
            core_index: 1.45213,
            cladding_index: 1.44692,
            bg_index: 1.4345,
        }
    }
}

/// One fiber of the bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fiber {
    /// Core label.
    pub label: String,
    /// Entrance position.
    pub position: Coord,
    /// Optical properties.
    pub props: FiberProps,
}

/// Fibers of a lantern in core-map order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiberBundle {
    fibers: Vec<Fiber>,
}

impl FiberBundle {
    /// One fiber per core-map entry, all starting from `defaults`.
    pub fn from_core_map(core_map: &CoreMap, defaults: FiberProps) -> Self {
        let fibers = core_map
            .iter()
            .map(|(label, position)| Fiber {
                label: label.to_string(),
                position,
                props: defaults,
            })
            .collect();
        Self { fibers }
    }

    /// Fibers in core-map order.
    pub fn iter(&self) -> impl Iterator<Item = &Fiber> + '_ {
        self.fibers.iter()
    }

    /// Fiber labelled `label`.
    pub fn get(&self, label: &str) -> Option<&Fiber> {
        self.fibers.iter().find(|fiber| fiber.label == label)
    }

    /// Number of fibers.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Applies `set` to every fiber named in `overrides`; unknown names are ignored.
    pub fn apply<F>(&mut self, overrides: Option<&BTreeMap<String, f64>>, set: F)
    where
        F: Fn(&mut FiberProps, f64),
    {
        let Some(overrides) = overrides else {
            return;
        };
        for fiber in &mut self.fibers {
            if let Some(value) = overrides.get(&fiber.label) {
                set(&mut fiber.props, *value);
            }
        }
    }
}

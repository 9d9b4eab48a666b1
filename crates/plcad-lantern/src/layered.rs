//! Lantern builder shared by the layered archetypes.

use std::collections::BTreeMap;
use std::path::Path;

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::{CoreMap, GlobalParams, LanternBuilder, LanternParams, MonitorType};
use plcad_geom::{indexed_core_map, mode_core_map, TaperModel, TaperModelSpec};
use serde_json::Value;
use tracing::debug;

use crate::circuit::{DesignCircuit, PropertyList};
use crate::fiber::{FiberBundle, FiberProps};

/// Strategy that places fibers for a [`LayeredLantern`].
pub trait CoreLayout {
    /// Name of the option the layout reads from [`LanternParams::options`].
    fn option_key(&self) -> &'static str;

    /// Core map and enclosing capillary diameter for `params`.
    fn core_map(
        &self,
        params: &LanternParams,
        cladding_dia: f64,
    ) -> Result<(CoreMap, f64), PlcadError>;
}

/// Concentric rings given as `layer_config: [[count, scale], ...]`; cores are
/// numbered from `"0"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RingLayers;

impl CoreLayout for RingLayers {
    fn option_key(&self) -> &'static str {
        "layer_config"
    }

    fn core_map(
        &self,
        params: &LanternParams,
        cladding_dia: f64,
    ) -> Result<(CoreMap, f64), PlcadError> {
        let layers: Vec<(usize, f64)> = params.require(self.option_key())?;
        let total: usize = layers.iter().map(|(count, _)| count).sum();
        if total == 0 {
            return Err(PlcadError::Construction(
                ErrorInfo::new("layout.empty", "layer configuration places no fibers")
                    .with_context("layer_config", format!("{layers:?}"))
                    .with_hint("give at least one layer with a non-zero fiber count"),
            ));
        }
        Ok(indexed_core_map(&layers, cladding_dia))
    }
}

/// One core per LP mode up to `highest_mode`, keyed by mode name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeGroups;

impl CoreLayout for ModeGroups {
    fn option_key(&self) -> &'static str {
        "highest_mode"
    }

    fn core_map(
        &self,
        params: &LanternParams,
        cladding_dia: f64,
    ) -> Result<(CoreMap, f64), PlcadError> {
        let highest_mode: String = params.require(self.option_key())?;
        mode_core_map(&highest_mode, cladding_dia).map_err(as_construction)
    }
}

/// Lantern whose fibers are taken from a [`CoreLayout`] and drawn into a
/// single tapered capillary.
#[derive(Debug)]
pub struct LayeredLantern<L> {
    layout: L,
    defaults: FiberProps,
    circuit: DesignCircuit,
    bundle: FiberBundle,
    cap_dia: f64,
    model: Option<TaperModel>,
}

/// Lantern built from a ring layer configuration.
pub type PhotonicLantern = LayeredLantern<RingLayers>;
/// Lantern with one core per supported LP mode.
pub type ModeSelectiveLantern = LayeredLantern<ModeGroups>;

impl<L: CoreLayout + Default> Default for LayeredLantern<L> {
    fn default() -> Self {
        Self::new(L::default(), FiberProps::default())
    }
}

impl<L: CoreLayout> LayeredLantern<L> {
    /// Builder placing fibers with `layout`, starting from `defaults`.
    pub fn new(layout: L, defaults: FiberProps) -> Self {
        Self {
            layout,
            defaults,
            circuit: lantern_circuit(&defaults),
            bundle: FiberBundle::default(),
            cap_dia: defaults.cladding_dia,
            model: None,
        }
    }

    /// Circuit assembled by the last build.
    pub fn circuit(&self) -> &DesignCircuit {
        &self.circuit
    }

    /// Fibers of the last build.
    pub fn bundle(&self) -> &FiberBundle {
        &self.bundle
    }

    /// Taper model of the last build.
    pub fn model(&self) -> Option<&TaperModel> {
        self.model.as_ref()
    }

    fn configure_bundle(&mut self, core_map: &CoreMap, params: &LanternParams) {
        let mut bundle = FiberBundle::from_core_map(core_map, self.defaults);
        bundle.apply(params.core_dia_dict.as_ref(), |props, v| props.core_dia = v);
        bundle.apply(params.cladding_dia_dict.as_ref(), |props, v| {
            props.cladding_dia = v
        });
        bundle.apply(params.cladding_index_dict.as_ref(), |props, v| {
            props.cladding_index = v
        });
        bundle.apply(params.core_index_dict.as_ref(), |props, v| {
            props.core_index = v
        });
        bundle.apply(params.bg_index_dict.as_ref(), |props, v| props.bg_index = v);
        self.bundle = bundle;
    }

    fn add_fiber_segments(
        &mut self,
        model: &TaperModel,
        params: &LanternParams,
    ) -> BTreeMap<String, usize> {
        let tapered = params.taper_factor > 1.0;
        let endpoints = model.endpoints();
        let model_cladding = self.defaults.cladding_dia;
        let mut pathways = BTreeMap::new();

        for (layer, segment_key) in [("CORE", "core"), ("CLADDING", "cladding")] {
            let taper = params.taper_config.for_segment(segment_key).tag();
            for (fiber, endpoint) in self.bundle.iter().zip(&endpoints) {
                let (dia, index) = if layer == "CORE" {
                    (fiber.props.core_dia, fiber.props.core_index)
                } else {
                    (fiber.props.cladding_dia, fiber.props.cladding_index)
                };
                let delta = index - fiber.props.bg_index;
                let end_dia = dia * endpoint.diameter / model_cladding;
                let mut props = PropertyList::new()
                    .with("comp_name", format!("{}_{layer}", fiber.label))
                    .with("begin.x", fiber.position.x)
                    .with("begin.y", fiber.position.y)
                    .with("begin.z", 0)
                    .with("begin.height", dia)
                    .with("begin.width", dia)
                    .with("begin.delta", delta)
                    .with("end.x", endpoint.position.x)
                    .with("end.y", endpoint.position.y)
                    .with("end.z", params.taper_length)
                    .with("end.height", end_dia)
                    .with("end.width", end_dia)
                    .with("end.delta", delta);
                if tapered {
                    set_taper_tags(&mut props, taper);
                }
                let segment = self.circuit.add_segment(&props);
                if layer == "CORE" {
                    let pathway = self.circuit.add_pathway(&[segment]);
                    self.circuit.add_monitor(
                        pathway,
                        &PropertyList::new().with("monitor_type", params.monitor_type.tag()),
                    );
                    pathways.insert(fiber.label.clone(), pathway);
                }
            }
        }
        pathways
    }

    fn add_capillary_segment(&mut self, model: &TaperModel, params: &LanternParams) {
        let end_dia = model.final_capillary_inner();
        let mut props = PropertyList::new()
            .with("comp_name", "CAPILLARY")
            .with("begin.x", 0)
            .with("begin.y", 0)
            .with("begin.z", 0)
            .with("begin.height", self.cap_dia)
            .with("begin.width", self.cap_dia)
            .with("begin.delta", 0)
            .with("end.x", 0)
            .with("end.y", 0)
            .with("end.z", params.taper_length)
            .with("end.height", end_dia)
            .with("end.width", end_dia)
            .with("end.delta", 0);
        set_taper_tags(&mut props, params.taper_config.for_segment("cap").tag());
        let segment = self.circuit.add_segment(&props);
        let pathway = self.circuit.add_pathway(&[segment]);
        self.circuit.add_monitor(
            pathway,
            &PropertyList::new().with("monitor_type", MonitorType::PartialPower.tag()),
        );
    }

    fn add_launch_fields(
        &mut self,
        params: &LanternParams,
        pathways: &BTreeMap<String, usize>,
    ) -> Result<(), PlcadError> {
        for mode in params.launch_mode.modes() {
            let (Some(fiber), Some(pathway)) = (self.bundle.get(mode), pathways.get(mode)) else {
                return Err(PlcadError::Construction(
                    ErrorInfo::new("lantern.launch_mode", "launch mode is not a core of this lantern")
                        .with_context("launch_mode", mode)
                        .with_list("available", self.bundle.iter().map(|fiber| fiber.label.as_str())),
                ));
            };
            let props = PropertyList::new()
                .with("launch_type", params.launch_type.tag())
                .with("launch_tilt", 0)
                .with("launch_pathway", *pathway)
                .with("launch_width", fiber.props.core_dia)
                .with("launch_height", fiber.props.core_dia)
                .with("launch_position", fiber.position.x)
                .with("launch_position_y", fiber.position.y);
            self.circuit.add_launch_field(*pathway, &props);
        }
        Ok(())
    }
}

impl<L: CoreLayout> LanternBuilder for LayeredLantern<L> {
    fn create_lantern(&mut self, params: &LanternParams) -> Result<CoreMap, PlcadError> {
        if !params.taper_factor.is_finite() || params.taper_factor <= 0.0 {
            return Err(PlcadError::Construction(
                ErrorInfo::new("lantern.taper_factor", "taper factor must be positive")
                    .with_context("taper_factor", params.taper_factor.to_string()),
            ));
        }

        let (core_map, cap_dia) = self.layout.core_map(params, self.defaults.cladding_dia)?;
        debug!(
            layout = self.layout.option_key(),
            cores = core_map.len(),
            cap_dia,
            "core map built"
        );

        self.circuit = lantern_circuit(&self.defaults);
        self.cap_dia = cap_dia;
        self.configure_bundle(&core_map, params);
        for file in params.taper_config.user_files() {
            self.circuit.add_user_taper(file);
        }

        let spec = TaperModelSpec {
            num_points: params.num_points,
            taper_length: params.taper_length,
            cladding_diameter: self.defaults.cladding_dia,
            final_cladding_diameter: None,
            final_capillary_id: params.final_capillary_id,
            capillary_id: cap_dia,
            capillary_od: params.capillary_od,
        };
        let model = TaperModel::build(&spec, &core_map).map_err(as_construction)?;

        let pathways = self.add_fiber_segments(&model, params);
        self.add_capillary_segment(&model, params);
        self.add_launch_fields(params, &pathways)?;

        self.circuit.set_param("grid_size", 1);
        self.circuit.set_param("grid_size_y", 1);
        self.circuit
            .set_param("slice_display_mode", "DISPLAY_CONTOURMAPXY");
        debug!(
            segments = self.circuit.segment_count(),
            launch_fields = self.circuit.launch_field_count(),
            "lantern circuit assembled"
        );

        self.model = Some(model);
        Ok(core_map)
    }

    fn capillary_outer_diameter(&self) -> f64 {
        self.cap_dia
    }

    fn model_property(&self, property: &str, position: f64) -> Result<f64, PlcadError> {
        let model = self.model.as_ref().ok_or_else(|| {
            PlcadError::Construction(
                ErrorInfo::new("lantern.not_built", "taper model queried before create_lantern")
                    .with_context("property", property),
            )
        })?;
        model.interpolate(property, position)
    }

    fn update_global_params(&mut self, params: &GlobalParams) {
        self.circuit.update_params(params);
    }

    fn write(&self, path: &Path) -> Result<(), PlcadError> {
        self.circuit.write(path)
    }
}

fn lantern_circuit(defaults: &FiberProps) -> DesignCircuit {
    let mut circuit = DesignCircuit::new();
    let base: [(&str, Value); 9] = [
        ("structure", "STRUCT_FIBER".into()),
        ("cad_aspectratio_x", 50.into()),
        ("cad_aspectratio_y", 50.into()),
        ("background_index", defaults.bg_index.into()),
        ("grid_size", 1.into()),
        ("grid_size_y", 1.into()),
        ("fem_nev", 1.into()),
        ("sim_tool", "ST_BEAMPROP".into()),
        ("slice_display_mode", "DISPLAY_CONTOURMAPXZ".into()),
    ];
    for (key, value) in base {
        circuit.set_param(key, value);
    }
    circuit
}

fn set_taper_tags(props: &mut PropertyList, taper: &str) {
    for key in ["width_taper", "height_taper", "position_y_taper", "position_taper"] {
        props.set(key, taper);
    }
}

fn as_construction(err: PlcadError) -> PlcadError {
    match err {
        PlcadError::Geometry(info) => PlcadError::Construction(info),
        other => other,
    }
}

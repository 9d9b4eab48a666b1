//! Simulation domain derived from the lantern's taper geometry.
//!
//! The bundle diameter at `domain_min` fixes a square boundary centred on the
//! axis; grid spacing follows from explicit steps or a target grid-point
//! count, and the boundary is then padded by `num_pads` cells, half again as
//! much on the negative Y side as on the others.

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::LanternBuilder;
use plcad_geom::{taper_properties, CAPILLARY_INNER_DIAMETER};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::params::{CommonParams, SimType, SortNeff};

/// Property queried from the lantern model on the interpolation branch.
pub const DOMAIN_PROPERTY: &str = CAPILLARY_INNER_DIAMETER;

/// Extra padding applied on the negative Y side relative to the other sides.
pub const MIN_Y_PADDING_RATIO: f64 = 1.5;

/// Subset of [`CommonParams`] the domain depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainInputs {
    /// Input-to-output diameter ratio; above one selects the analytic taper.
    pub taper_factor: f64,
    /// Taper length in microns.
    pub taper_length: f64,
    /// Axial position the window is sized at.
    pub domain_min: f64,
    /// Explicit X grid step; derived from `num_grid` when absent.
    pub step_x: Option<f64>,
    /// Explicit Y grid step; derived from `num_grid` when absent.
    pub step_y: Option<f64>,
    /// Grid points across the unpadded window.
    pub num_grid: u32,
    /// Padding cells added outside the window.
    pub num_pads: u32,
}

impl DomainInputs {
    /// Copies the domain-related fields of `common`.
    pub fn from_common(common: &CommonParams) -> Self {
        Self {
            taper_factor: common.taper_factor,
            taper_length: common.taper_length,
            domain_min: common.domain_min,
            step_x: common.step_x,
            step_y: common.step_y,
            num_grid: common.num_grid,
            num_pads: common.num_pads,
        }
    }

    /// Rejects inputs that cannot produce a domain for any lantern.
    pub fn validate(&self) -> Result<(), PlcadError> {
        for (name, step) in [("step_x", self.step_x), ("step_y", self.step_y)] {
            if let Some(step) = step {
                if !step.is_finite() || step <= 0.0 {
                    return Err(PlcadError::DomainDerivation(
                        ErrorInfo::new("domain.step", "grid step must be positive")
                            .with_context(name, step.to_string()),
                    ));
                }
            }
        }
        if self.num_grid == 0 {
            return Err(PlcadError::DomainDerivation(
                ErrorInfo::new("domain.num_grid", "num_grid must be at least one")
                    .with_hint("set num_grid or give explicit step_x and step_y"),
            ));
        }
        if !self.domain_min.is_finite() {
            return Err(PlcadError::DomainDerivation(
                ErrorInfo::new("domain.domain_min", "domain_min must be finite")
                    .with_context("domain_min", self.domain_min.to_string()),
            ));
        }
        if !self.taper_factor.is_finite() || !self.taper_length.is_finite() {
            return Err(PlcadError::DomainDerivation(
                ErrorInfo::new("domain.taper", "taper inputs must be finite")
                    .with_context("taper_factor", self.taper_factor.to_string())
                    .with_context("taper_length", self.taper_length.to_string()),
            ));
        }
        if TaperStrategy::select(self.taper_factor) == TaperStrategy::Analytic
            && !(0.0..=self.taper_length).contains(&self.domain_min)
        {
            return Err(PlcadError::DomainDerivation(
                ErrorInfo::new("taper.position", "domain_min lies outside the taper")
                    .with_context("domain_min", self.domain_min.to_string())
                    .with_context("taper_length", self.taper_length.to_string()),
            ));
        }
        Ok(())
    }
}

/// How the bundle diameter at `domain_min` is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaperStrategy {
    /// Linear taper from the capillary diameter by `taper_factor`.
    Analytic,
    /// Lookup in the lantern's sampled taper model.
    Interpolated,
}

impl TaperStrategy {
    /// Analytic for taper factors strictly above one.
    pub fn select(taper_factor: f64) -> Self {
        if taper_factor > 1.0 {
            TaperStrategy::Analytic
        } else {
            TaperStrategy::Interpolated
        }
    }
}

/// Bundle diameter at `inputs.domain_min` and the strategy that produced it.
pub fn diameter_at(
    lantern: &dyn LanternBuilder,
    inputs: &DomainInputs,
) -> Result<(f64, TaperStrategy), PlcadError> {
    let strategy = TaperStrategy::select(inputs.taper_factor);
    let diameter = match strategy {
        TaperStrategy::Analytic => {
            taper_properties(
                inputs.domain_min,
                Some(lantern.capillary_outer_diameter()),
                None,
                Some(inputs.taper_length),
                Some(inputs.taper_factor),
            )
            .map_err(as_domain_error)?
            .diameter
        }
        TaperStrategy::Interpolated => lantern
            .model_property(DOMAIN_PROPERTY, inputs.domain_min)
            .map_err(as_domain_error)?,
    };
    debug!(?strategy, diameter, domain_min = inputs.domain_min, "taper diameter evaluated");
    Ok((diameter, strategy))
}

/// Boundary box and grid spacing of the simulation window, in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainGeometry {
    /// Padded upper X bound.
    pub boundary_max: f64,
    /// Padded lower X bound.
    pub boundary_min: f64,
    /// Padded upper Y bound.
    pub boundary_max_y: f64,
    /// Padded lower Y bound, padded half again as much as the others.
    pub boundary_min_y: f64,
    /// Axial position the window was sized at.
    pub domain_min: f64,
    /// X grid spacing, named `grid_size` in design files.
    #[serde(rename = "grid_size", alias = "grid_size_x")]
    pub grid_size_x: f64,
    /// Y grid spacing.
    pub grid_size_y: f64,
}

/// Computes the padded simulation window for a bundle of `diameter`.
pub fn derive_domain(diameter: f64, inputs: &DomainInputs) -> Result<DomainGeometry, PlcadError> {
    if !diameter.is_finite() || diameter <= 0.0 {
        return Err(PlcadError::DomainDerivation(
            ErrorInfo::new("domain.diameter", "taper diameter must be positive")
                .with_context("diameter", diameter.to_string()),
        ));
    }
    inputs.validate()?;

    let radius = diameter / 2.0;
    let mut boundary_max = radius.ceil();
    let mut boundary_min = (-radius).floor();
    let mut boundary_max_y = radius.ceil();
    let mut boundary_min_y = (-radius).floor();

    let num_grid = f64::from(inputs.num_grid);
    let grid_size_x = inputs.step_x.unwrap_or(2.0 * boundary_max / num_grid);
    let grid_size_y = inputs.step_y.unwrap_or(2.0 * boundary_max_y / num_grid);
    debug!(grid_size_x, grid_size_y, "grid sizes calculated");

    let pads = f64::from(inputs.num_pads);
    boundary_min_y -= MIN_Y_PADDING_RATIO * pads * grid_size_y;
    boundary_max_y += pads * grid_size_y;
    boundary_min -= pads * grid_size_x;
    boundary_max += pads * grid_size_x;

    Ok(DomainGeometry {
        boundary_max,
        boundary_min,
        boundary_max_y,
        boundary_min_y,
        domain_min: inputs.domain_min,
        grid_size_x,
        grid_size_y,
    })
}

/// Fixed engine settings written with every domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Snap X coordinates to the grid.
    pub grid_align_x: u8,
    /// Snap Y coordinates to the grid.
    pub grid_align_y: u8,
    /// Engine tool tag, `ST_BEAMPROP` or `ST_FEMSIM`.
    pub sim_tool: String,
    /// Number of FEM eigenmodes.
    pub fem_nev: u32,
    /// Seed the FEM solver with effective indices.
    pub fem_neff_seeding: u8,
    /// Mode output format.
    pub mode_output_format: String,
    /// Slice display mode.
    pub slice_display_mode: String,
    /// Field output format.
    pub field_output_format: String,
    /// Launch type code for mode launches.
    pub mode_launch_type: u8,
    /// CAD aspect ratio along X.
    pub cad_aspectratio_x: u32,
    /// CAD aspect ratio along Y.
    pub cad_aspectratio_y: u32,
    /// FEM H-field output flag.
    pub fem_outh: u8,
    /// FEM S-parameter output flag.
    pub fem_outs: u8,
    /// Plot the FEM mesh.
    pub fem_plot_mesh: u8,
    /// Save the FEM mesh file.
    pub fem_save_meshfile: u8,
    /// Solve for leaky modes.
    pub fem_leaky: u8,
    /// Float the FEM boundary.
    pub fem_float: u8,
    /// Eigenmode ordering code.
    pub fem_sortev: i64,
}

impl EngineConfig {
    /// Fixed engine settings for `sim_type`, with `fem_nev`, `save_neff` and `mode_output` taken from `common`.
    pub fn new(sim_type: SimType, sort_neff: SortNeff, common: &CommonParams) -> Self {
        Self {
            grid_align_x: 1,
            grid_align_y: 1,
            sim_tool: sim_type.tool().to_string(),
            fem_nev: common.femnev,
            fem_neff_seeding: u8::from(common.save_neff),
            mode_output_format: common.mode_output.clone(),
            slice_display_mode: "DISPLAY_CONTOURMAPXY".to_string(),
            field_output_format: "OUTPUT_REAL_IMAG".to_string(),
            mode_launch_type: 2,
            cad_aspectratio_x: 50,
            cad_aspectratio_y: 50,
            fem_outh: 0,
            fem_outs: 0,
            fem_plot_mesh: 0,
            fem_save_meshfile: 0,
            fem_leaky: 1,
            fem_float: 0,
            fem_sortev: sort_neff.code(),
        }
    }
}

/// Derived domain plus engine settings handed to the lantern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDomain {
    /// Padded window and grid spacing.
    #[serde(flatten)]
    pub geometry: DomainGeometry,
    /// Engine settings.
    pub engine: EngineConfig,
    /// How the bundle diameter was obtained.
    pub strategy: TaperStrategy,
}

impl SimulationDomain {
    /// Ordered global design parameters: geometry first, then engine settings.
    pub fn design_params(&self) -> Vec<(String, Value)> {
        let g = &self.geometry;
        let e = &self.engine;
        let entries: [(&str, Value); 25] = [
            ("boundary_max", g.boundary_max.into()),
            ("boundary_min", g.boundary_min.into()),
            ("boundary_max_y", g.boundary_max_y.into()),
            ("boundary_min_y", g.boundary_min_y.into()),
            ("domain_min", g.domain_min.into()),
            ("grid_size", g.grid_size_x.into()),
            ("grid_size_y", g.grid_size_y.into()),
            ("grid_align_x", e.grid_align_x.into()),
            ("grid_align_y", e.grid_align_y.into()),
            ("sim_tool", e.sim_tool.clone().into()),
            ("fem_nev", e.fem_nev.into()),
            ("fem_neff_seeding", e.fem_neff_seeding.into()),
            ("mode_output_format", e.mode_output_format.clone().into()),
            ("slice_display_mode", e.slice_display_mode.clone().into()),
            ("field_output_format", e.field_output_format.clone().into()),
            ("mode_launch_type", e.mode_launch_type.into()),
            ("cad_aspectratio_x", e.cad_aspectratio_x.into()),
            ("cad_aspectratio_y", e.cad_aspectratio_y.into()),
            ("fem_outh", e.fem_outh.into()),
            ("fem_outs", e.fem_outs.into()),
            ("fem_plot_mesh", e.fem_plot_mesh.into()),
            ("fem_save_meshfile", e.fem_save_meshfile.into()),
            ("fem_leaky", e.fem_leaky.into()),
            ("fem_float", e.fem_float.into()),
            ("fem_sortev", e.fem_sortev.into()),
        ];
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

/// Full derivation: diameter, window and engine settings.
pub fn simulation_domain(
    lantern: &dyn LanternBuilder,
    inputs: &DomainInputs,
    engine: EngineConfig,
) -> Result<SimulationDomain, PlcadError> {
    let (diameter, strategy) = diameter_at(lantern, inputs)?;
    let geometry = derive_domain(diameter, inputs)?;
    Ok(SimulationDomain {
        geometry,
        engine,
        strategy,
    })
}

fn as_domain_error(err: PlcadError) -> PlcadError {
    match err {
        PlcadError::Geometry(info) => PlcadError::DomainDerivation(info),
        other => other,
    }
}

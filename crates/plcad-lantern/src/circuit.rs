//! In-memory design circuit and its `.ind` text rendering.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use plcad_core::errors::PlcadError;
use serde_json::Value;

/// Ordered key/value list where setting an existing key replaces it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyList {
    entries: Vec<(String, Value)>,
}

impl PropertyList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, overwriting in place if present.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`PropertyList::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets every pair in `other`.
    pub fn extend(&mut self, other: &[(String, Value)]) {
        for (key, value) in other {
            self.set(key.clone(), value.clone());
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Block {
    id: usize,
    props: PropertyList,
}

#[derive(Debug, Clone, PartialEq)]
struct Pathway {
    id: usize,
    segments: Vec<usize>,
}

/// Segments, pathways, monitors and launch fields of one design, plus its
/// global parameter block.
///
/// Identifiers are assigned sequentially from 1 per element kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignCircuit {
    params: PropertyList,
    segments: Vec<Block>,
    pathways: Vec<Pathway>,
    monitors: Vec<Block>,
    launch_fields: Vec<Block>,
    user_tapers: Vec<String>,
}

impl Default for DesignCircuit {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignCircuit {
    /// Circuit with the engine's baseline global parameters.
    pub fn new() -> Self {
        let params = PropertyList::new()
            .with("alpha", 0)
            .with("background_index", 1)
            .with("cad_aspectratio", 1)
            .with("delta", 0.1)
            .with("dimension", 3)
            .with("eim", 0)
            .with("free_space_wavelength", 1.55)
            .with("height", 1)
            .with("k0", "(2 * pi) / free_space_wavelength")
            .with("lambda", "free_space_wavelength")
            .with("launch_tilt", 1)
            .with("sim_tool", "ST_BEAMPROP")
            .with("structure", "STRUCT_CHANNEL")
            .with("width", 1);
        Self {
            params,
            segments: Vec::new(),
            pathways: Vec::new(),
            monitors: Vec::new(),
            launch_fields: Vec::new(),
            user_tapers: Vec::new(),
        }
    }

    /// Sets a global parameter, overwriting in place if present.
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.set(key, value);
    }

    /// Sets every global parameter in `params`.
    pub fn update_params(&mut self, params: &[(String, Value)]) {
        self.params.extend(params);
    }

    /// Global parameter stored under `key`.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Adds a fiber segment; `props` override the zeroed defaults. Returns its id.
    pub fn add_segment(&mut self, props: &PropertyList) -> usize {
        let id = self.segments.len() + 1;
        let mut merged = PropertyList::new()
            .with("structure", "STRUCT_FIBER")
            .with("comp_name", "CORE");
        for key in [
            "begin.x",
            "begin.y",
            "begin.z",
            "begin.height",
            "begin.width",
            "begin.delta",
            "end.x",
            "end.y",
            "end.z",
            "end.height",
            "end.width",
            "end.delta",
        ] {
            merged.set(key, 0);
        }
        for (key, value) in props.iter() {
            merged.set(key, value.clone());
        }
        self.segments.push(Block { id, props: merged });
        id
    }

    /// Adds a pathway through `segments`. Returns its id.
    pub fn add_pathway(&mut self, segments: &[usize]) -> usize {
        let id = self.pathways.len() + 1;
        self.pathways.push(Pathway {
            id,
            segments: segments.to_vec(),
        });
        id
    }

    /// Attaches a monitor to `pathway`. Returns its id.
    pub fn add_monitor(&mut self, pathway: usize, props: &PropertyList) -> usize {
        let id = self.monitors.len() + 1;
        let mut merged = PropertyList::new()
            .with("pathway", pathway)
            .with("monitor_type", "MONITOR_WG_POWER")
            .with("monitor_component", "COMPONENT_BOTH");
        for (key, value) in props.iter() {
            merged.set(key, value.clone());
        }
        self.monitors.push(Block { id, props: merged });
        id
    }

    /// Adds a launch field on `pathway`. Its properties are also merged into
    /// the global parameters.
    pub fn add_launch_field(&mut self, pathway: usize, props: &PropertyList) -> usize {
        let id = self.launch_fields.len() + 1;
        let mut merged = PropertyList::new()
            .with("launch_pathway", pathway)
            .with("launch_type", "LAUNCH_GAUSSIAN")
            .with("launch_random_set", 69)
            .with("launch_align_file", 1)
            .with("launch_width", 0)
            .with("launch_height", 0)
            .with("launch_position", 0)
            .with("launch_position_y", 0)
            .with("launch_polarizer", 2)
            .with("launch_polarizer_angle", 45);
        for (key, value) in props.iter() {
            merged.set(key, value.clone());
        }
        for (key, value) in merged.iter() {
            self.params.set(key, value.clone());
        }
        self.launch_fields.push(Block { id, props: merged });
        id
    }

    /// Registers a user taper data file, once. Returns its 1-based index.
    pub fn add_user_taper(&mut self, file: &str) -> usize {
        match self.user_tapers.iter().position(|existing| existing == file) {
            Some(idx) => idx + 1,
            None => {
                self.user_tapers.push(file.to_string());
                self.user_tapers.len()
            }
        }
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of pathways.
    pub fn pathway_count(&self) -> usize {
        self.pathways.len()
    }

    /// Number of monitors.
    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    /// Number of launch fields.
    pub fn launch_field_count(&self) -> usize {
        self.launch_fields.len()
    }

    /// Renders the full design file.
    pub fn render(&self) -> String {
        let mut out = String::from("# Global parameters\n");
        for (key, value) in self.params.iter() {
            let _ = writeln!(out, "{key} = {}", render_value(value));
        }
        out.push('\n');

        if !self.user_tapers.is_empty() {
            out.push_str("# User Tapers\n");
            for (idx, file) in self.user_tapers.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "user_taper {}\n\ttype = UF_DATAFILE\n\tfilename = {file}\nend user_taper\n",
                    idx + 1
                );
            }
        }
        render_blocks(&mut out, "# Segments", "segment", &self.segments);
        if !self.pathways.is_empty() {
            out.push_str("# Pathways\n");
            for pathway in &self.pathways {
                let _ = writeln!(out, "pathway {}", pathway.id);
                for segment in &pathway.segments {
                    let _ = writeln!(out, "\t{segment}");
                }
                out.push_str("end pathway\n\n");
            }
        }
        render_blocks(&mut out, "# Monitors", "monitor", &self.monitors);
        render_blocks(&mut out, "# Launch Fields", "launch_field", &self.launch_fields);
        out
    }

    /// Writes [`DesignCircuit::render`] to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), PlcadError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| PlcadError::io("circuit.create_dir", parent, err))?;
            }
        }
        fs::write(path, self.render()).map_err(|err| PlcadError::io("circuit.write", path, err))
    }
}

fn render_blocks(out: &mut String, heading: &str, kind: &str, blocks: &[Block]) {
    if blocks.is_empty() {
        return;
    }
    out.push_str(heading);
    out.push('\n');
    for block in blocks {
        let _ = writeln!(out, "{kind} {}", block.id);
        for (key, value) in block.props.iter() {
            let _ = writeln!(out, "\t{key} = {}", render_value(value));
        }
        let _ = writeln!(out, "end {kind}\n");
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => u8::from(*flag).to_string(),
        other => other.to_string(),
    }
}

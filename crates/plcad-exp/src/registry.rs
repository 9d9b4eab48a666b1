use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use plcad_core::errors::{ErrorInfo, PlcadError};
use plcad_core::{LanternBuilder, LaunchMode};
use plcad_lantern::{ModeSelectiveLantern, PhotonicLantern};
use serde::Serialize;
use tracing::debug;

/// Creates an empty lantern builder for one invocation.
pub type BuilderFactory = Arc<dyn Fn() -> Box<dyn LanternBuilder> + Send + Sync>;

/// Immutable description of a registered lantern archetype.
#[derive(Clone, Serialize)]
pub struct ArchetypeDescriptor {
    #[serde(skip)]
    factory: BuilderFactory,
    /// Launch mode used when none is given.
    pub default_launch_mode: LaunchMode,
    /// Design file name prefix.
    pub file_prefix: String,
    /// Options that must be supplied.
    pub required_params: Vec<String>,
    /// Option the builder reads its layout from.
    pub primary_param: String,
}

impl ArchetypeDescriptor {
    /// Builds a fresh lantern for this archetype.
    pub fn build(&self) -> Box<dyn LanternBuilder> {
        (self.factory)()
    }
}

impl fmt::Debug for ArchetypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchetypeDescriptor")
            .field("default_launch_mode", &self.default_launch_mode)
            .field("file_prefix", &self.file_prefix)
            .field("required_params", &self.required_params)
            .field("primary_param", &self.primary_param)
            .finish_non_exhaustive()
    }
}

/// Name → archetype table consulted by the parameter resolver.
///
/// The registry is an ordinary owned value: populate it once at start-up and
/// pass it by shared reference to every invocation afterwards.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    entries: BTreeMap<String, ArchetypeDescriptor>,
}

impl ArchetypeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the `mode_selective` and `photonic` archetypes.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            "mode_selective",
            || Box::new(ModeSelectiveLantern::default()) as Box<dyn LanternBuilder>,
            "LP01",
            "mspl",
            &["highest_mode"],
            "highest_mode",
        );
        registry.register(
            "photonic",
            || Box::new(PhotonicLantern::default()) as Box<dyn LanternBuilder>,
            "0",
            "photonic_lantern",
            &["layer_config"],
            "layer_config",
        );
        registry
    }

    /// Adds an archetype, replacing any previous entry of the same name.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
        default_launch_mode: impl Into<LaunchMode>,
        file_prefix: impl Into<String>,
        required_params: &[&str],
        primary_param: impl Into<String>,
    ) where
        F: Fn() -> Box<dyn LanternBuilder> + Send + Sync + 'static,
    {
        let name = name.into();
        let descriptor = ArchetypeDescriptor {
            factory: Arc::new(factory),
            default_launch_mode: default_launch_mode.into(),
            file_prefix: file_prefix.into(),
            required_params: required_params.iter().map(|p| p.to_string()).collect(),
            primary_param: primary_param.into(),
        };
        if self.entries.insert(name.clone(), descriptor).is_some() {
            debug!(archetype = %name, "replaced registered archetype");
        } else {
            debug!(archetype = %name, "registered archetype");
        }
    }

    /// Looks up `name`, listing every registered archetype when it is unknown.
    pub fn resolve(&self, name: &str) -> Result<&ArchetypeDescriptor, PlcadError> {
        self.entries.get(name).ok_or_else(|| {
            PlcadError::UnknownArchetype(
                ErrorInfo::new("registry.unknown_archetype", "lantern type is not registered")
                    .with_context("lantern_type", name)
                    .with_list("available", self.names())
                    .with_hint("register the archetype or pick one of the available types"),
            )
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Registered archetypes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArchetypeDescriptor)> + '_ {
        self.entries
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Number of registered archetypes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Structured error types shared across plcad crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PlcadError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (names, paths, values).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds a context entry holding a list of names, stored as a JSON array.
    pub fn with_list<I, S>(self, key: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let items = items
            .into_iter()
            .map(|item| item.as_ref().to_string())
            .collect::<Vec<_>>();
        let encoded = serde_json::to_string(&items).unwrap_or_default();
        self.with_context(key, encoded)
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Reads back a list stored with [`ErrorInfo::with_list`].
    pub fn list(&self, key: &str) -> Vec<String> {
        self.context
            .get(key)
            .and_then(|value| serde_json::from_str(value).ok())
            .unwrap_or_default()
    }
}

/// Canonical error type for lantern design generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PlcadError {
    /// The requested archetype is not registered.
    #[error("unknown archetype: {0}")]
    UnknownArchetype(ErrorInfo),
    /// One or more archetype-required parameters were not supplied.
    #[error("missing required parameters: {0}")]
    MissingRequiredParameters(ErrorInfo),
    /// The simulation type is not one the engine understands.
    #[error("invalid simulation type: {0}")]
    InvalidSimulationType(ErrorInfo),
    /// A parameter has a value outside its accepted set.
    #[error("invalid parameter: {0}")]
    InvalidParameter(ErrorInfo),
    /// The lantern builder rejected its inputs.
    #[error("construction failure: {0}")]
    Construction(ErrorInfo),
    /// The simulation domain could not be derived.
    #[error("domain derivation failure: {0}")]
    DomainDerivation(ErrorInfo),
    /// Taper or layout evaluation failed.
    #[error("geometry error: {0}")]
    Geometry(ErrorInfo),
    /// Filesystem errors while emitting artifacts.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PlcadError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PlcadError::UnknownArchetype(info)
            | PlcadError::MissingRequiredParameters(info)
            | PlcadError::InvalidSimulationType(info)
            | PlcadError::InvalidParameter(info)
            | PlcadError::Construction(info)
            | PlcadError::DomainDerivation(info)
            | PlcadError::Geometry(info)
            | PlcadError::Io(info)
            | PlcadError::Serde(info) => info,
        }
    }

    /// Wraps a filesystem error with the path it concerned.
    pub fn io(code: &str, path: &std::path::Path, err: std::io::Error) -> Self {
        PlcadError::Io(
            ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
        )
    }
}

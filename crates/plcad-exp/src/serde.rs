use plcad_core::errors::{ErrorInfo, PlcadError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Serializes `value` as JSON indented by four spaces.
pub fn to_pretty_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, PlcadError> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer).map_err(|err| {
        PlcadError::Serde(ErrorInfo::new("serde.encode", err.to_string()))
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes JSON, reporting the line and column of a failure.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PlcadError> {
    serde_json::from_slice(bytes).map_err(|err| {
        PlcadError::Serde(
            ErrorInfo::new("serde.decode", err.to_string())
                .with_context("line", err.line().to_string())
                .with_context("column", err.column().to_string()),
        )
    })
}

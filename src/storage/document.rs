//! Documents, identifiers and owners

use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};

/// A stored document: a JSON object keyed by string fields.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// The process that owns a set of sites.
///
/// Two owners are the same owner when their names are equal; the data
/// directory is where file sites of this owner keep their files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    name: String,
    data_dir: PathBuf,
}

impl Owner {
    /// Create an owner identity
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, data_dir: P) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Identity token used for registry lookup
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owner's configured data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Reject identifiers that would escape a point's directory or collide with
/// the hidden temp files written during a save.
///
/// Identifiers are otherwise used verbatim, so characters the host
/// filesystem disallows remain the caller's concern.
pub(crate) fn check_identifier(identifier: &str) -> StorageResult<()> {
    if identifier.is_empty()
        || identifier.starts_with('.')
        || identifier.contains("..")
        || identifier.contains('/')
        || identifier.contains('\\')
        || identifier.contains('\0')
    {
        return Err(StorageError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

/// Parse a JSON text into a document, rejecting non-object values.
pub(crate) fn parse_document(location: &str, text: &str) -> StorageResult<Document> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(StorageError::decode(
            location,
            format!("expected a JSON object, found {}", json_kind(&other)),
        )),
        Err(e) => Err(StorageError::decode(location, e)),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

use std::path::Path;

use bytelens_core::{traits::CodeDeserializer, CodeObject, Error, Result};
use tracing::debug;

/// Fixed-size header layouts that precede the serialized unit in a
/// compiled-module file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderFormat {
    /// magic + mtime
    Legacy,
    /// magic + mtime + source size
    Sized,
    /// magic + flags + mtime/hash + source size
    #[default]
    Flagged,
}

impl HeaderFormat {
    pub fn header_size(self) -> usize {
        match self {
            HeaderFormat::Legacy => 8,
            HeaderFormat::Sized => 12,
            HeaderFormat::Flagged => 16,
        }
    }
}

/// Reads units serialized as JSON (see [`CodeObject`]'s serde layout).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeserializer;

impl CodeDeserializer for JsonDeserializer {
    fn deserialize(&self, bytes: &[u8]) -> Result<CodeObject> {
        serde_json::from_slice(bytes).map_err(|e| Error::UnsupportedInput(e.to_string()))
    }
}

/// Strips the container header and hands the payload to a deserializer.
#[derive(Debug, Clone)]
pub struct Container<D> {
    format: HeaderFormat,
    deserializer: D,
}

impl<D: CodeDeserializer> Container<D> {
    pub fn new(format: HeaderFormat, deserializer: D) -> Self {
        Self { format, deserializer }
    }

    pub fn load(&self, bytes: &[u8]) -> Result<CodeObject> {
        let header = self.format.header_size();
        if bytes.len() < header {
            return Err(Error::UnsupportedInput(format!(
                "input has {} bytes, shorter than the {}-byte header",
                bytes.len(),
                header
            )));
        }
        debug!(header, payload = bytes.len() - header, "loading unit from container");
        self.deserializer.deserialize(&bytes[header..])
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<CodeObject> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Decode(format!("failed to read {}: {}", path.display(), e)))?;
        self.load(&bytes)
    }
}

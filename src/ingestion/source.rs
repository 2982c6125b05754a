//! Tabular Source Trait - Abstract handle for the two input tables

use crate::error::DataSourceError;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Anything the loader can read a CSV table from.
///
/// Implementations:
/// - FileSource: a path on disk
/// - MemorySource: bytes already in memory (uploads, streams, tests)
pub trait TabularSource: Send + Sync {
    /// Human-readable name used in errors and logs (e.g. "orders")
    fn source_name(&self) -> &str;

    /// Get source type (e.g., "file", "memory")
    fn source_type(&self) -> &str;

    /// Get source URI/location (if applicable)
    fn source_uri(&self) -> Option<String>;

    /// Read the complete contents of the source
    fn read_bytes(&self) -> Result<Arc<[u8]>, DataSourceError>;
}

/// CSV file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    source_name: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(source_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_name: source_name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TabularSource for FileSource {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn source_type(&self) -> &str {
        "file"
    }

    fn source_uri(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }

    fn read_bytes(&self) -> Result<Arc<[u8]>, DataSourceError> {
        std::fs::read(&self.path)
            .map(Arc::from)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DataSourceError::NotFound {
                    source_name: self.source_name.clone(),
                    path: self.path.clone(),
                },
                _ => DataSourceError::Unreadable {
                    source_name: self.source_name.clone(),
                    reason: format!("{}: {}", self.path.display(), e),
                },
            })
    }
}

/// CSV payload held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    source_name: String,
    bytes: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(source_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            source_name: source_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_text(source_name: impl Into<String>, text: &str) -> Self {
        Self::new(source_name, text.as_bytes())
    }

    /// Drain a reader into memory so the payload can be hashed and parsed.
    pub fn from_reader<R: Read>(
        source_name: impl Into<String>,
        mut reader: R,
    ) -> Result<Self, DataSourceError> {
        let source_name = source_name.into();
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| DataSourceError::Unreadable {
                source_name: source_name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(source_name, buf))
    }
}

impl TabularSource for MemorySource {
    fn source_name(&self) -> &str {
        &self.source_name
    }

    fn source_type(&self) -> &str {
        "memory"
    }

    fn source_uri(&self) -> Option<String> {
        None
    }

    fn read_bytes(&self) -> Result<Arc<[u8]>, DataSourceError> {
        Ok(Arc::clone(&self.bytes))
    }
}

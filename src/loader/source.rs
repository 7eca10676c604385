use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{ConvError, Result};

/// Where parameter arrays come from.
///
/// A source identifier is opaque to the engine; implementations decide how
/// to resolve it. Each `open` yields a fresh stream positioned at the start.
pub trait ParamSource {
    fn open(&self, id: &str) -> Result<Box<dyn Read + '_>>;
}

/// Resolves identifiers as file paths under a root directory.
///
/// Identifiers ending in `.gz` are decompressed on the fly.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSource { root: root.into() }
    }

    /// Resolves identifiers relative to the working directory.
    pub fn cwd() -> Self {
        FileSource::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ParamSource for FileSource {
    fn open(&self, id: &str) -> Result<Box<dyn Read + '_>> {
        // Path::join keeps absolute identifiers as they are
        let path = self.root.join(id);
        log::trace!("opening parameter file {}", path.display());
        let file = File::open(&path).map_err(|e| ConvError::io(id, e))?;
        if id.ends_with(".gz") {
            return Ok(Box::new(BufReader::new(GzDecoder::new(file))));
        }
        Ok(Box::new(BufReader::new(file)))
    }
}

/// In-memory parameter store, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn insert_bytes(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(id.into(), bytes);
    }

    /// Stores `values` as little-endian `f32`s, the same encoding the
    /// loader expects from files.
    pub fn insert_floats(&mut self, id: impl Into<String>, values: &[f32]) {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.insert_bytes(id, bytes);
    }

    pub fn with_floats(mut self, id: impl Into<String>, values: &[f32]) -> Self {
        self.insert_floats(id, values);
        self
    }
}

impl ParamSource for MemorySource {
    fn open(&self, id: &str) -> Result<Box<dyn Read + '_>> {
        log::trace!("opening in-memory parameters `{}`", id);
        let bytes = self
            .entries
            .get(id)
            .ok_or_else(|| ConvError::io(id, "no such entry"))?;
        Ok(Box::new(Cursor::new(bytes.as_slice())))
    }
}

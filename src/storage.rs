//! Where a data file's text lives.
//!
//! [`FileStorage`] keeps it on disk; [`MemoryStorage`] keeps it in memory,
//! which tests and embedded defaults use.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::Result;

/// Extension every data file path ends with.
pub const FILE_EXTENSION: &str = "succ";

/// Backing store of a data file's text.
pub trait Storage: Send {
    /// Reads the whole text. Storage that does not exist yet reads as empty.
    fn read(&self) -> Result<String>;

    /// Replaces the whole text.
    fn write(&mut self, text: &str) -> Result<()>;

    fn exists(&self) -> bool;

    /// Names the storage in logs and errors.
    fn identifier(&self) -> String;
}

/// Text held in memory. Clones share the same text.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    text: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Storage that exists and holds `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        MemoryStorage {
            text: Arc::new(Mutex::new(Some(text.into()))),
        }
    }

    /// Storage that does not exist until written.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.text.lock().clone().unwrap_or_default()
    }

    /// Replaces the text as an outside writer would.
    pub fn set_contents(&self, text: impl Into<String>) {
        *self.text.lock() = Some(text.into());
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("len", &self.text.lock().as_ref().map(String::len))
            .finish()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<String> {
        Ok(self.contents())
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.set_contents(text);
        Ok(())
    }

    fn exists(&self) -> bool {
        self.text.lock().is_some()
    }

    fn identifier(&self) -> String {
        "<memory>".to_string()
    }
}

/// A file on disk.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Uses `path` with its extension replaced by `.succ`, so `settings` and
    /// `settings.v2` both become `settings.succ`. Relative
    /// paths are resolved against the current directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut path = path.as_ref().to_path_buf();
        path.set_extension(FILE_EXTENSION);
        if path.is_relative() {
            path = std::env::current_dir()?.join(path);
        }
        Ok(FileStorage { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        trace!(path = %self.path.display(), bytes = text.len(), "writing data file");
        fs::write(&self.path, text)?;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn identifier(&self) -> String {
        self.path.display().to_string()
    }
}

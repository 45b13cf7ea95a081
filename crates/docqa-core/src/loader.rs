//! Loader contracts and the per-type loader registry.
//!
//! A [`LoaderFactory`] is registered for each [`FileType`] the deployment
//! can parse. During ingestion the session asks the registry for the
//! factory matching the resolved type, opens a [`Loader`] on the persisted
//! file, and hands it to the retrieval engine. The core never looks inside
//! a loader; only the engine calls [`Loader::load`].
//!
//! # Example
//!
//! ```rust
//! use std::path::Path;
//! use std::sync::Arc;
//! use anyhow::Result;
//! use docqa_core::{DocumentUnit, FileType, Loader, LoaderFactory, LoaderRegistry};
//!
//! struct Plain(std::path::PathBuf);
//!
//! impl Loader for Plain {
//!     fn path(&self) -> &Path { &self.0 }
//!     fn file_type(&self) -> FileType { FileType::Text }
//!     fn load(&self) -> Result<Vec<DocumentUnit>> {
//!         Ok(vec![DocumentUnit::new("notes.txt", "hello")])
//!     }
//! }
//!
//! struct PlainFactory;
//!
//! impl LoaderFactory for PlainFactory {
//!     fn file_type(&self) -> FileType { FileType::Text }
//!     fn open(&self, path: &Path) -> Result<Box<dyn Loader>> {
//!         Ok(Box::new(Plain(path.to_path_buf())))
//!     }
//! }
//!
//! let mut registry = LoaderRegistry::new();
//! registry.register(Arc::new(PlainFactory));
//! assert!(registry.loader_for(FileType::Text).is_some());
//! assert!(registry.loader_for(FileType::Pdf).is_none());
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::file_type::FileType;

/// One retrievable unit of parsed text, before chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUnit {
    /// Origin identifier carried into citations (usually the file name).
    pub source: String,
    /// Extracted plain text.
    pub content: String,
}

impl DocumentUnit {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// A parser bound to one file on disk.
pub trait Loader: Send + Sync {
    /// The file this loader reads.
    fn path(&self) -> &Path;

    /// The format this loader parses.
    fn file_type(&self) -> FileType;

    /// Parse the file into document units.
    fn load(&self) -> Result<Vec<DocumentUnit>>;
}

/// Produces [`Loader`]s for one file type.
pub trait LoaderFactory: Send + Sync {
    /// The format handled by loaders from this factory.
    fn file_type(&self) -> FileType;

    /// Open a loader on the file at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn Loader>>;
}

/// Maps file types to loader factories.
///
/// Registering a second factory for the same type replaces the first.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    factories: Vec<Arc<dyn LoaderFactory>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register a factory for its file type.
    pub fn register(&mut self, factory: Arc<dyn LoaderFactory>) {
        let ft = factory.file_type();
        self.factories.retain(|f| f.file_type() != ft);
        self.factories.push(factory);
    }

    /// Look up the factory for `file_type`.
    pub fn loader_for(&self, file_type: FileType) -> Option<&dyn LoaderFactory> {
        self.factories
            .iter()
            .find(|f| f.file_type() == file_type)
            .map(|f| f.as_ref())
    }

    /// File types with a registered factory, in registration order.
    pub fn file_types(&self) -> Vec<FileType> {
        self.factories.iter().map(|f| f.file_type()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }
}

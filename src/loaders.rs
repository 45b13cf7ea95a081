//! Format-specific document loaders.
//!
//! One [`FormatLoaderFactory`] per [`FileType`], each pairing the type with
//! its extraction routine from [`crate::extract`]. [`default_registry`]
//! registers all of them.
//!
//! Units are named after the file; spreadsheets yield one unit per sheet,
//! named `<file>#Sheet<N>`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use docqa_core::{DocumentUnit, FileType, Loader, LoaderFactory, LoaderRegistry};

use crate::extract::{self, ExtractError, Section};

type ExtractFn = fn(&Path, &[u8]) -> Result<Vec<Section>, ExtractError>;

/// Creates loaders for one file type.
pub struct FormatLoaderFactory {
    file_type: FileType,
    extract: ExtractFn,
}

impl FormatLoaderFactory {
    pub fn for_type(file_type: FileType) -> Self {
        let extract: ExtractFn = match file_type {
            FileType::Pdf => |_, bytes| extract::non_empty(extract::extract_pdf(bytes)?),
            FileType::Docx => |path, bytes| {
                if has_extension(path, "doc") {
                    return Err(ExtractError::LegacyFormat("doc"));
                }
                extract::non_empty(extract::extract_docx(bytes)?)
            },
            FileType::Excel => |path, bytes| {
                if has_extension(path, "xls") {
                    return Err(ExtractError::LegacyFormat("xls"));
                }
                let sections = extract::extract_xlsx(bytes)?;
                if sections.is_empty() {
                    return Err(ExtractError::Empty);
                }
                Ok(sections)
            },
            FileType::Csv => |_, bytes| extract::non_empty(extract::extract_csv(bytes)?),
            FileType::Text => |_, bytes| extract::non_empty(extract::extract_plain(bytes)),
            FileType::Json => |_, bytes| extract::non_empty(extract::extract_json(bytes)?),
        };
        Self { file_type, extract }
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

impl LoaderFactory for FormatLoaderFactory {
    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Loader>> {
        if !path.is_file() {
            bail!("file not found: {}", path.display());
        }
        Ok(Box::new(FileLoader {
            path: path.to_path_buf(),
            file_type: self.file_type,
            extract: self.extract,
        }))
    }
}

/// Loader bound to one file on disk.
pub struct FileLoader {
    path: PathBuf,
    file_type: FileType,
    extract: ExtractFn,
}

impl Loader for FileLoader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn load(&self) -> Result<Vec<DocumentUnit>> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let sections = (self.extract)(&self.path, &bytes)?;

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        Ok(sections
            .into_iter()
            .map(|s| {
                let source = match s.label {
                    Some(label) => format!("{}#{}", name, label),
                    None => name.clone(),
                };
                DocumentUnit::new(source, s.text)
            })
            .collect())
    }
}

/// Registry with a loader for every supported file type.
pub fn default_registry() -> LoaderRegistry {
    let mut registry = LoaderRegistry::new();
    for ft in FileType::ALL {
        registry.register(Arc::new(FormatLoaderFactory::for_type(ft)));
    }
    registry
}

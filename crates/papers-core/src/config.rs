//! User configuration.
//!
//! Read from a TOML file:
//!
//! ```toml
//! [papers]
//! papers-directory = "/home/me/papers"
//! document-directory = "/home/me/Documents/pdfs"
//! ```
//!
//! Every key is optional; a missing table means defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PapersError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub papers: PapersSection,
}

/// The `[papers]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PapersSection {
    /// Default repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub papers_directory: Option<PathBuf>,
    /// Where documents are kept, instead of `<root>/doc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_directory: Option<PathBuf>,
}

impl Config {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::NotFound`] if the file does not exist and
    /// [`PapersError::Parse`] if it is not valid TOML for this shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PapersError::NotFound(path.to_path_buf()),
            _ => PapersError::Io(e),
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            PapersError::Config(message) => PapersError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`PapersError::Config`] if the text is not valid TOML for this shape.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PapersError::Config(e.to_string()))
    }

    pub fn papers_directory(&self) -> Option<&Path> {
        self.papers.papers_directory.as_deref()
    }

    pub fn document_directory(&self) -> Option<&Path> {
        self.papers.document_directory.as_deref()
    }
}

//! Template store: the directory holding `<name>.plate` files
//!
//! This module provides:
//! - Store location (`--templates-dir`, `$PLATES_DIR`, or `~/.plates`)
//! - Listing of available template names
//! - Reading a template's source by name
//! - Store settings (`settings.yaml`)

pub mod settings;

use crate::error::EngineError;
use anyhow::{Context, Result};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

pub use settings::{StoreSettings, SETTINGS_FILE};

/// Extension of template definition files
pub const TEMPLATE_EXTENSION: &str = "plate";

/// Store directory name under the home directory
pub const STORE_DIR_NAME: &str = ".plates";

/// Environment variable overriding the store location
pub const STORE_DIR_ENV: &str = "PLATES_DIR";

/// Directory of template definitions
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the store root
    ///
    /// An explicit directory wins, then `$PLATES_DIR`, then `<home>/.plates`.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Ok(Self::new(dir));
        }

        if let Some(dir) = std::env::var_os(STORE_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(dir)));
        }

        let home = dirs::home_dir().context("Could not determine the home directory")?;
        Ok(Self::new(home.join(STORE_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the store directory if it does not exist yet
    pub fn setup(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create template store {}", self.root.display()))
    }

    /// Path of the definition file for `name`
    pub fn template_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }

    /// Names of all templates in the store, sorted
    pub fn available(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            anyhow::bail!("Template store not found: {}", self.root.display());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry
                .with_context(|| format!("Failed to list templates in {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Read the source of template `name`
    pub async fn read(&self, name: &str) -> Result<String, EngineError> {
        let path = self.template_path(name);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == IoErrorKind::NotFound => Err(EngineError::TemplateNotFound {
                name: name.to_string(),
                path,
            }),
            Err(source) => Err(EngineError::ReadTemplate { path, source }),
        }
    }

    /// Load `settings.yaml` from the store
    pub fn settings(&self) -> Result<StoreSettings> {
        StoreSettings::load(&self.root.join(SETTINGS_FILE))
    }
}

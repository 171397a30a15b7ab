//! `typegen.toml` configuration and source-root resolution.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TypegenError};

/// File name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "typegen.toml";

/// Configuration stored in `typegen.toml`. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypegenConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Project roots tried in order when no source is given
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
    #[serde(default = "default_entities_dir")]
    pub entities_dir: String,
    #[serde(default = "default_interfaces_dir")]
    pub interfaces_dir: String,
    #[serde(default = "default_enums_dir")]
    pub enums_dir: String,
    /// Treat syntax errors in source units as fatal
    #[serde(default)]
    pub strict: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            entities_dir: default_entities_dir(),
            interfaces_dir: default_interfaces_dir(),
            enums_dir: default_enums_dir(),
            strict: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_types_dir")]
    pub types_dir: String,
    /// Import path for auxiliary value types, relative to an entity module
    #[serde(default = "default_auxiliary_module")]
    pub auxiliary_module: String,
    #[serde(default = "default_true")]
    pub root_barrel: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            types_dir: default_types_dir(),
            auxiliary_module: default_auxiliary_module(),
            root_barrel: true,
        }
    }
}

fn default_candidates() -> Vec<String> {
    ["../api", "../backend", "../server", ".."]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_entities_dir() -> String {
    "src/entities".to_string()
}

fn default_interfaces_dir() -> String {
    "src/interfaces".to_string()
}

fn default_enums_dir() -> String {
    "src/enums".to_string()
}

fn default_types_dir() -> String {
    "src/types".to_string()
}

fn default_auxiliary_module() -> String {
    "../api".to_string()
}

fn default_true() -> bool {
    true
}

impl TypegenConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| TypegenError::read(path, e))?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TypegenError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Pretty TOML for `typegen init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TypegenError::Config {
            path: PathBuf::from(CONFIG_FILE_NAME),
            message: e.to_string(),
        })
    }

    /// Locate the source project root.
    ///
    /// An explicit root must contain the entities directory. Otherwise every
    /// candidate is tried relative to `base`, first match wins.
    pub fn resolve_source(&self, base: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
        let tried: Vec<PathBuf> = match explicit {
            Some(path) => vec![base.join(path)],
            None => self.source.candidates.iter().map(|c| base.join(c)).collect(),
        };

        for root in &tried {
            if root.join(&self.source.entities_dir).is_dir() {
                log::debug!("source root: {}", root.display());
                return Ok(root.clone());
            }
            log::debug!("no {} under {}", self.source.entities_dir, root.display());
        }

        Err(TypegenError::SourceNotFound { tried })
    }
}

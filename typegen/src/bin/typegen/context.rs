use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use typegen::{CONFIG_FILE_NAME, TypeGenerator, TypegenConfig};

/// Project context for typegen operations
pub struct ProjectContext {
    /// Directory the command was run from
    pub working_dir: PathBuf,
    /// Directory holding typegen.toml, or the working directory without one
    pub project_dir: PathBuf,
    /// Path to the config file that was loaded, if any
    pub config_path: Option<PathBuf>,
    /// Loaded configuration (defaults when no file exists)
    pub config: TypegenConfig,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    /// Find project context starting from the given directory
    pub fn find_from(start: &Path) -> Result<Self> {
        match Self::find_config(start) {
            Some(config_path) => {
                let config = TypegenConfig::load(&config_path)?;
                let project_dir = config_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| start.to_path_buf());
                Ok(Self {
                    working_dir: start.to_path_buf(),
                    project_dir,
                    config_path: Some(config_path),
                    config,
                })
            }
            None => Ok(Self {
                working_dir: start.to_path_buf(),
                project_dir: start.to_path_buf(),
                config_path: None,
                config: TypegenConfig::default(),
            }),
        }
    }

    /// Walk up from `start` looking for typegen.toml
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Generator configured for this project.
    ///
    /// Explicit paths are taken relative to the working directory; the output
    /// defaults to the project directory.
    pub fn generator(&self, source: Option<&Path>, output: Option<&Path>) -> TypeGenerator {
        let mut generator = TypeGenerator::new()
            .project_dir(&self.project_dir)
            .config(self.config.clone());

        if let Some(source) = source {
            generator = generator.source_root(self.working_dir.join(source));
        }
        if let Some(output) = output {
            generator = generator.output_root(self.working_dir.join(output));
        }

        generator
    }
}

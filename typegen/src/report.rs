//! Run summary and soft-failure diagnostics.

use std::path::PathBuf;

use serde::Serialize;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
}

/// A non-fatal finding recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
}

/// Collects diagnostics and mirrors them to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        self.entries.push(Diagnostic {
            level: Level::Warning,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.entries.push(Diagnostic {
            level: Level::Info,
            message,
        });
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level == Level::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// What happened to one output module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Written,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Summary of a completed generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub entities: Vec<String>,
    pub enum_count: usize,
    pub api_declaration_count: usize,
    pub files: Vec<FileOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn written(&self) -> usize {
        self.files.iter().filter(|f| f.status == FileStatus::Written).count()
    }

    pub fn unchanged(&self) -> usize {
        self.files.iter().filter(|f| f.status == FileStatus::Unchanged).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warning)
    }
}

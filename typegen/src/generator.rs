//! The generation pipeline behind a builder.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::build_catalog;
use crate::classifier::classify;
use crate::config::TypegenConfig;
use crate::emitter::{EmitOptions, render_all};
use crate::errors::Result;
use crate::model::{EntityArena, TypeCatalog};
use crate::parser::TsParser;
use crate::report::{Diagnostics, GenerationReport};
use crate::scanner::{marked_declarations, scan_directory};
use crate::synthesizer::{ApiModule, SynthesizedInterface, synthesize, synthesize_api};
use crate::writer::write_modules;

/// Builder for configuring and running a generation.
#[derive(Debug, Clone)]
pub struct TypeGenerator {
    project_dir: PathBuf,
    source_root: Option<PathBuf>,
    output_root: Option<PathBuf>,
    config: TypegenConfig,
    strict: Option<bool>,
}

/// Everything derived from the sources, before rendering.
#[derive(Debug)]
pub struct Analysis {
    pub source_root: PathBuf,
    pub arena: EntityArena,
    pub catalog: TypeCatalog,
    pub interfaces: Vec<SynthesizedInterface>,
    pub api: ApiModule,
    pub diagnostics: Diagnostics,
}

impl TypeGenerator {
    /// Create a generator with default configuration, rooted at `.`.
    pub fn new() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            source_root: None,
            output_root: None,
            config: TypegenConfig::default(),
            strict: None,
        }
    }

    /// Directory that source candidates are resolved against.
    ///
    /// Default: `.`
    pub fn project_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_dir = path.into();
        self
    }

    /// Explicit source project root (must contain the entities directory).
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Root that the output layout is written under.
    ///
    /// Default: the project directory
    pub fn output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = Some(path.into());
        self
    }

    pub fn config(mut self, config: TypegenConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the configured strict-parsing setting.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    fn is_strict(&self) -> bool {
        self.strict.unwrap_or(self.config.source.strict)
    }

    fn output_dir(&self) -> PathBuf {
        self.output_root.clone().unwrap_or_else(|| self.project_dir.clone())
    }

    /// Scan, classify and synthesize without writing anything.
    pub fn analyze(&self) -> Result<Analysis> {
        let settings = &self.config.source;
        let source_root = self
            .config
            .resolve_source(&self.project_dir, self.source_root.as_deref())?;
        let strict = self.is_strict();

        let mut diagnostics = Diagnostics::new();
        let mut parser = TsParser::new()?;

        let entities_dir = source_root.join(&settings.entities_dir);
        let units = scan_directory(&entities_dir, &mut parser, strict, &mut diagnostics)?;

        let catalog = build_catalog(
            &units,
            &source_root.join(&settings.enums_dir),
            &source_root.join(&settings.interfaces_dir),
            &mut parser,
            strict,
            &mut diagnostics,
        )?;

        let mut arena = EntityArena::new();
        for unit in &units {
            for declaration in marked_declarations(unit) {
                let record = classify(unit, &declaration, &catalog);
                if let Some(previous) = arena.get(&record.name) {
                    diagnostics.warn(format!(
                        "{}: entity '{}' redeclared; replacing the one from {}",
                        record.source_file, record.name, previous.source_file
                    ));
                }
                arena.insert(record.name.clone(), record);
            }
        }

        let interfaces = synthesize(&arena, &catalog, &mut diagnostics);
        let api = synthesize_api(&arena, &catalog);

        Ok(Analysis {
            source_root,
            arena,
            catalog,
            interfaces,
            api,
            diagnostics,
        })
    }

    /// Run the full pipeline and write the output modules.
    ///
    /// Every module is rendered before the first write, so a fatal error
    /// leaves the output untouched.
    pub fn run(self) -> Result<GenerationReport> {
        let analysis = self.analyze()?;
        let output_root = self.output_dir();
        let types_dir = PathBuf::from(&self.config.output.types_dir);

        let root_barrel = self
            .config
            .output
            .root_barrel
            .then(|| barrel_directories(&output_root, &types_dir));

        let options = EmitOptions {
            types_dir,
            auxiliary_module: self.config.output.auxiliary_module.clone(),
            root_barrel,
        };
        let modules = render_all(
            &analysis.interfaces,
            &analysis.api,
            &analysis.catalog,
            &options,
        );
        let files = write_modules(&output_root, &modules)?;

        let report = GenerationReport {
            source_root: analysis.source_root,
            output_root,
            entities: analysis.arena.keys().cloned().collect(),
            enum_count: analysis.catalog.enums.len(),
            api_declaration_count: analysis.catalog.api_declarations.len(),
            files,
            diagnostics: analysis.diagnostics.into_vec(),
        };

        log::info!(
            "generated {} entities ({} files written, {} unchanged)",
            report.entities.len(),
            report.written(),
            report.unchanged()
        );

        Ok(report)
    }
}

impl Default for TypeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sibling directories of the types directory that already have an index
/// module, plus the types directory itself, sorted.
fn barrel_directories(output_root: &Path, types_dir: &Path) -> Vec<String> {
    let parent = output_root.join(types_dir.parent().unwrap_or(Path::new("")));

    let mut directories: Vec<String> = WalkDir::new(&parent)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| e.path().join("index.ts").exists() || e.path().join("index.tsx").exists())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();

    if let Some(name) = types_dir.file_name() {
        directories.push(name.to_string_lossy().to_string());
    }

    directories.sort();
    directories.dedup();
    directories
}

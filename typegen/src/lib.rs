//! Shared TypeScript interfaces from decorated ORM entity sources.
//!
//! `typegen` reads a flat directory of TypeORM-style entity classes, classifies
//! their decorated members, flattens single-table inheritance and writes one
//! interface module per entity plus barrel modules for entities, enums and API
//! shapes.
//!
//! # Example
//!
//! ```ignore
//! let report = typegen::generate_types()
//!     .source_root("../api")
//!     .output_root(".")
//!     .run()?;
//!
//! for warning in report.warnings() {
//!     eprintln!("{}", warning.message);
//! }
//! ```
//!
//! The pipeline runs strictly forward: scanner, catalog, classifier, synthesizer,
//! emitter, writer. Rendering finishes before anything is written.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod decorators;
pub mod emitter;
pub mod errors;
pub mod generator;
pub mod model;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod synthesizer;
pub mod type_mapping;
pub mod writer;

pub use config::{CONFIG_FILE_NAME, TypegenConfig};
pub use errors::{Result, TypegenError};
pub use generator::{Analysis, TypeGenerator};
pub use model::{EntityArena, EntityRecord, MemberKind, MemberRecord, TypeCatalog};
pub use report::{Diagnostic, FileOutcome, FileStatus, GenerationReport, Level};
pub use synthesizer::SynthesizedInterface;

/// Create a generator with default settings.
pub fn generate_types() -> TypeGenerator {
    TypeGenerator::new()
}

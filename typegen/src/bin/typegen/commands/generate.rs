use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use typegen::{GenerationReport, Level};

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, themed_table};
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Autodetect Source",
        commands: &[
            "typegen generate                       # Try ../api, ../backend, ../server, ..",
            "typegen                                # Same as 'typegen generate'",
        ],
    },
    ExampleGroup {
        title: "Explicit Paths",
        commands: &[
            "typegen generate ../api                # Read ../api/src/entities",
            "typegen generate ../api ./shared       # Write into ./shared/src/types",
            "typegen generate ../api --strict       # Fail on any syntax error",
        ],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &["typegen generate ../api --output json   # Print the run report as JSON"],
    },
];

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Source project root containing the entities directory
    #[arg(value_name = "SOURCE", env = "TYPEGEN_SOURCE")]
    pub source: Option<PathBuf>,

    /// Output project root (defaults to the project directory)
    #[arg(value_name = "OUTPUT")]
    pub destination: Option<PathBuf>,

    /// Treat syntax errors in source files as fatal
    #[arg(long)]
    pub strict: bool,
}

pub fn handle_generate(args: GenerateArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    if let Some(path) = &ctx.config_path {
        output.verbose(&format!("Using {}", path.display()));
    }

    let mut generator = ctx.generator(args.source.as_deref(), args.destination.as_deref());
    if args.strict {
        generator = generator.strict(true);
    }

    output.progress("Generating types");
    let report = generator.run();
    output.clear_line();
    let report = report.context("Type generation failed")?;

    for diagnostic in &report.diagnostics {
        match diagnostic.level {
            Level::Warning => output.warning(&diagnostic.message),
            Level::Info => output.verbose(&diagnostic.message),
        }
    }
    for file in &report.files {
        output.verbose(&format!(
            "{} {} ({:?})",
            ICONS.file,
            file.path.display(),
            file.status
        ));
    }

    output.display(&report)?;
    output.success(&format!(
        "Generated {} entity interfaces ({} written, {} unchanged)",
        report.entities.len(),
        report.written(),
        report.unchanged()
    ));

    Ok(())
}

impl TableDisplay for GenerationReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Item", "Value"]);
        let rows = [
            ("Source", self.source_root.display().to_string()),
            ("Output", self.output_root.display().to_string()),
            ("Entities", self.entities.len().to_string()),
            ("Enums", self.enum_count.to_string()),
            ("API declarations", self.api_declaration_count.to_string()),
            ("Files written", self.written().to_string()),
            ("Files unchanged", self.unchanged().to_string()),
            ("Warnings", self.warnings().count().to_string()),
        ];
        for (label, value) in rows {
            table.add_row(vec![Cell::new(label), Cell::new(value)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "entities={} written={} unchanged={} warnings={}",
            self.entities.len(),
            self.written(),
            self.unchanged(),
            self.warnings().count()
        )
    }
}

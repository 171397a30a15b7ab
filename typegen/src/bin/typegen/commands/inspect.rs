use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;
use typegen::{Level, MemberRecord};

use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, flag, themed_table};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Entity Overview",
        commands: &[
            "typegen inspect                        # List classified entities",
            "typegen inspect ../api                 # Inspect an explicit source root",
        ],
    },
    ExampleGroup {
        title: "Single Entity",
        commands: &[
            "typegen inspect --entity Order         # Show Order's flattened fields",
            "typegen inspect -e Order --output json # Fields as JSON",
        ],
    },
];

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Source project root containing the entities directory
    #[arg(value_name = "SOURCE", env = "TYPEGEN_SOURCE")]
    pub source: Option<PathBuf>,

    /// Show the synthesized fields of one entity
    #[arg(short, long, value_name = "NAME")]
    pub entity: Option<String>,

    /// Treat syntax errors in source files as fatal
    #[arg(long)]
    pub strict: bool,
}

/// One row of the entity overview
#[derive(Debug, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub file: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub fields: usize,
    pub relations: usize,
    pub computed: usize,
}

#[derive(Debug, Serialize)]
pub struct EntityListing {
    pub entities: Vec<EntitySummary>,
}

/// Flattened fields of a single entity
#[derive(Debug, Serialize)]
pub struct EntityFields {
    pub name: String,
    pub fields: Vec<MemberRecord>,
    pub imports: Vec<String>,
}

pub fn handle_inspect(args: InspectArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;

    let mut generator = ctx.generator(args.source.as_deref(), None);
    if args.strict {
        generator = generator.strict(true);
    }

    output.progress("Analyzing entities");
    let analysis = generator.analyze();
    output.clear_line();
    let analysis = analysis.context("Entity analysis failed")?;

    for diagnostic in analysis.diagnostics.warnings() {
        output.warning(&diagnostic.message);
    }

    match args.entity {
        Some(name) => {
            let interface = analysis
                .interfaces
                .iter()
                .find(|i| i.name == name)
                .with_context(|| {
                    format!("Entity '{name}' not found in {}", analysis.source_root.display())
                })?;

            output.heading(&format!("Entity {}", interface.name));
            if let Some(record) = analysis.arena.get(&name) {
                output.key_value(
                    "Declared in",
                    &format!("{}:{}", record.source_file, record.source_line),
                );
                if let Some(parent) = &record.parent_name {
                    output.key_value("Parent", parent);
                }
            }

            let imports = interface
                .entity_refs
                .iter()
                .chain(&interface.enum_refs)
                .chain(&interface.auxiliary_refs)
                .cloned()
                .collect();

            output.display(&EntityFields {
                name: interface.name.clone(),
                fields: interface.fields.clone(),
                imports,
            })?;
        }
        None => {
            output.heading(&format!("Entities in {}", analysis.source_root.display()));

            let entities = analysis
                .arena
                .values()
                .zip(&analysis.interfaces)
                .map(|(record, interface)| EntitySummary {
                    name: record.name.clone(),
                    file: record.source_file.clone(),
                    line: record.source_line,
                    parent: record.parent_name.clone(),
                    fields: interface.fields.len(),
                    relations: interface.fields.iter().filter(|f| f.is_relation).count(),
                    computed: record.computed_members.len(),
                })
                .collect();

            output.display(&EntityListing { entities })?;

            let info_count = analysis
                .diagnostics
                .into_vec()
                .into_iter()
                .filter(|d| d.level == Level::Info)
                .inspect(|d| output.verbose(&d.message))
                .count();
            if info_count > 0 && !output.options.verbose {
                output.info(&format!(
                    "{info_count} informational notes; rerun with -v to see them"
                ));
            }
        }
    }

    Ok(())
}

impl TableDisplay for EntityListing {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(
            options,
            &["Entity", "File", "Parent", "Fields", "Relations", "Computed"],
        );

        if self.entities.is_empty() {
            table.add_row(vec![Cell::new("No entities found")]);
            return table;
        }

        for entity in &self.entities {
            table.add_row(vec![
                Cell::new(&entity.name),
                Cell::new(format!("{}:{}", entity.file, entity.line)),
                Cell::new(entity.parent.as_deref().unwrap_or("")),
                Cell::new(entity.fields),
                Cell::new(entity.relations),
                Cell::new(entity.computed),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.entities
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TableDisplay for EntityFields {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(
            options,
            &["Field", "Type", "Optional", "Array", "Relation", "Kind"],
        );

        for field in &self.fields {
            table.add_row(vec![
                Cell::new(&field.name),
                Cell::new(&field.type_name),
                Cell::new(flag(field.optional)),
                Cell::new(flag(field.is_array)),
                Cell::new(flag(field.is_relation)),
                Cell::new(field.kind),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let fields: Vec<String> = self.fields.iter().map(MemberRecord::declaration).collect();
        format!("{} {{ {} }}", self.name, fields.join("; "))
    }
}

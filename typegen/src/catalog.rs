//! Type catalog: enum and auxiliary type names known before classification.

use std::path::Path;

use indexmap::IndexSet;

use crate::errors::Result;
use crate::model::{NamedDeclaration, TypeCatalog};
use crate::parser::{SourceUnit, TsParser, descendants_of_kind};
use crate::report::Diagnostics;
use crate::scanner::scan_directory;

const ENUM_KINDS: &[&str] = &["enum_declaration"];
const SHAPE_KINDS: &[&str] = &["interface_declaration", "type_alias_declaration"];

/// Build the catalog.
///
/// Enums come from the already parsed entity units and from `enums_dir`;
/// auxiliary types and API shapes come from `interfaces_dir`. Either directory
/// may be missing.
pub fn build_catalog(
    entity_units: &[SourceUnit],
    enums_dir: &Path,
    interfaces_dir: &Path,
    parser: &mut TsParser,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<TypeCatalog> {
    let mut catalog = TypeCatalog::default();

    for unit in entity_units {
        add_enums(&mut catalog, unit, diagnostics);
    }

    if enums_dir.is_dir() {
        for unit in scan_directory(enums_dir, parser, strict, diagnostics)? {
            add_enums(&mut catalog, &unit, diagnostics);
        }
    } else {
        diagnostics.info(format!("no enums directory at {}", enums_dir.display()));
    }

    if interfaces_dir.is_dir() {
        for unit in scan_directory(interfaces_dir, parser, strict, diagnostics)? {
            for declaration in exported_declarations(&unit, SHAPE_KINDS) {
                if !catalog.auxiliary.insert(declaration.name.clone()) {
                    diagnostics.warn(format!(
                        "{}: duplicate declaration '{}' ignored",
                        unit.file_name(),
                        declaration.name
                    ));
                    continue;
                }
                catalog.api_declarations.push(declaration);
            }
        }
    } else {
        diagnostics.info(format!("no interfaces directory at {}", interfaces_dir.display()));
    }

    log::debug!(
        "catalog: {} enums, {} auxiliary types",
        catalog.enums.len(),
        catalog.auxiliary.len()
    );

    Ok(catalog)
}

fn add_enums(catalog: &mut TypeCatalog, unit: &SourceUnit, diagnostics: &mut Diagnostics) {
    for declaration in exported_declarations(unit, ENUM_KINDS) {
        if catalog.enums.contains_key(&declaration.name) {
            diagnostics.warn(format!(
                "{}: duplicate enum '{}' ignored",
                unit.file_name(),
                declaration.name
            ));
            continue;
        }
        catalog.enums.insert(declaration.name.clone(), declaration);
    }
}

/// Exported declarations of the given kinds, with the full `export ...` text.
pub fn exported_declarations(unit: &SourceUnit, kinds: &[&str]) -> Vec<NamedDeclaration> {
    descendants_of_kind(unit.root(), &["export_statement"])
        .into_iter()
        .filter_map(|export| {
            let declaration = export.child_by_field_name("declaration")?;
            if !kinds.contains(&declaration.kind()) {
                return None;
            }
            let name = unit.text(declaration.child_by_field_name("name")?).to_string();

            let mut references = IndexSet::new();
            for node in descendants_of_kind(declaration, &["type_identifier"]) {
                let referenced = unit.text(node);
                if referenced != name {
                    references.insert(referenced.to_string());
                }
            }

            Some(NamedDeclaration {
                name,
                text: unit.text(export).to_string(),
                references: references.into_iter().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(code: &str) -> SourceUnit {
        let mut parser = TsParser::new().unwrap();
        parser.parse_source(Path::new("test.ts"), code.to_string()).unwrap()
    }

    #[test]
    fn test_exported_enums_only() {
        let unit = parse(
            r#"
            export enum OrderStatus { Pending = 'pending', Paid = 'paid' }
            enum Internal { A }
            @Entity()
            export class Order {}
            "#,
        );

        let enums = exported_declarations(&unit, ENUM_KINDS);
        assert_eq!(enums.len(), 1);
        assert_eq!(enums[0].name, "OrderStatus");
        assert!(enums[0].text.starts_with("export enum OrderStatus"));
    }

    #[test]
    fn test_shape_references() {
        let unit = parse(
            r#"
            export interface OrderSummary {
                order: Order;
                status: OrderStatus;
                previous?: OrderSummary;
            }
            export type Attachment = { url: string; kind: MediaKind };
            interface Hidden { a: string }
            "#,
        );

        let shapes = exported_declarations(&unit, SHAPE_KINDS);
        let names: Vec<_> = shapes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["OrderSummary", "Attachment"]);
        assert_eq!(shapes[0].references, vec!["Order", "OrderStatus"]);
        assert_eq!(shapes[1].references, vec!["MediaKind"]);
    }

    #[test]
    fn test_missing_directories_are_informational() {
        let temp_dir = TempDir::new().unwrap();
        let entities = vec![parse("export enum Gender { Male, Female }")];

        let mut parser = TsParser::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let catalog = build_catalog(
            &entities,
            &temp_dir.path().join("enums"),
            &temp_dir.path().join("interfaces"),
            &mut parser,
            false,
            &mut diagnostics,
        )
        .unwrap();

        assert!(catalog.is_enum("Gender"));
        assert!(catalog.auxiliary.is_empty());
        assert_eq!(diagnostics.warnings().count(), 0);
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_enum_keeps_first() {
        let temp_dir = TempDir::new().unwrap();
        let enums_dir = temp_dir.path().join("enums");
        fs::create_dir(&enums_dir).unwrap();
        fs::write(
            enums_dir.join("gender.ts"),
            "export enum Gender { Other }\n",
        )
        .unwrap();

        let entities = vec![parse("export enum Gender { Male, Female }")];
        let mut parser = TsParser::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let catalog = build_catalog(
            &entities,
            &enums_dir,
            &temp_dir.path().join("interfaces"),
            &mut parser,
            false,
            &mut diagnostics,
        )
        .unwrap();

        assert!(catalog.enums["Gender"].text.contains("Male"));
        assert_eq!(diagnostics.warnings().count(), 1);
    }
}

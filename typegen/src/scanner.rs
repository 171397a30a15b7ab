//! Declaration scanner: finds classes marked `@Entity` or `@ChildEntity`.

use std::path::{Path, PathBuf};

use tree_sitter::Node;
use walkdir::WalkDir;

use crate::decorators::{DecoratorSet, Tag, class_decorators};
use crate::errors::{Result, TypegenError};
use crate::parser::{SourceUnit, TsParser, descendants_of_kind};
use crate::report::Diagnostics;

const CLASS_KINDS: &[&str] = &["class_declaration", "abstract_class_declaration"];

/// Which model marker a class carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMarker {
    Plain,
    Child,
}

/// A class declaration carrying a model marker.
pub struct MarkedDeclaration<'t> {
    pub node: Node<'t>,
    pub name: String,
    pub marker: ModelMarker,
    pub decorators: DecoratorSet,
}

/// List `.ts` files (excluding `.d.ts`) directly inside `dir`, sorted by name.
pub fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TypegenError::SourceNotFound {
            tried: vec![dir.to_path_buf()],
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| TypegenError::read(dir, e.into()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy();

        if entry.file_type().is_file() && name.ends_with(".ts") && !name.ends_with(".d.ts") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Read and parse every source unit of a directory.
///
/// Syntax errors are fatal when `strict` is set; otherwise the best-effort tree
/// is kept and a warning is recorded.
pub fn scan_directory(
    dir: &Path,
    parser: &mut TsParser,
    strict: bool,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();

    for path in list_source_files(dir)? {
        let unit = parser.parse_file(&path)?;

        if let Some((line, column)) = unit.first_syntax_error() {
            if strict {
                return Err(TypegenError::Parse {
                    path,
                    message: format!("syntax error at line {line}, column {column}"),
                });
            }
            diagnostics.warn(format!(
                "{}: syntax error at line {line}, column {column}; continuing with a best-effort tree",
                unit.file_name()
            ));
        }

        units.push(unit);
    }

    Ok(units)
}

/// Marked class declarations of a unit, in source order.
pub fn marked_declarations(unit: &SourceUnit) -> Vec<MarkedDeclaration<'_>> {
    descendants_of_kind(unit.root(), CLASS_KINDS)
        .into_iter()
        .filter_map(|node| {
            let name = unit.text(node.child_by_field_name("name")?).to_string();
            let decorators = class_decorators(unit, node);

            let marker = if decorators.has(&Tag::ChildEntity) {
                ModelMarker::Child
            } else if decorators.has(&Tag::Entity) {
                ModelMarker::Plain
            } else {
                return None;
            };

            Some(MarkedDeclaration {
                node,
                name,
                marker,
                decorators,
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
    fn test_marked_declarations() {
        let unit = parse(
            r#"
            @Entity()
            export class User {}

            @ChildEntity()
            export class Admin extends User {}

            export class Helper {}

            @Entity
            abstract class Base {}
            "#,
        );

        let found: Vec<_> = marked_declarations(&unit)
            .into_iter()
            .map(|d| (d.name, d.marker))
            .collect();

        assert_eq!(
            found,
            vec![
                ("User".to_string(), ModelMarker::Plain),
                ("Admin".to_string(), ModelMarker::Child),
                ("Base".to_string(), ModelMarker::Plain),
            ]
        );
    }

    #[test]
    fn test_list_source_files_is_flat_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.ts"), "").unwrap();
        fs::write(temp_dir.path().join("a.ts"), "").unwrap();
        fs::write(temp_dir.path().join("types.d.ts"), "").unwrap();
        fs::write(temp_dir.path().join("notes.md"), "").unwrap();
        fs::create_dir(temp_dir.path().join("nested")).unwrap();
        fs::write(temp_dir.path().join("nested/c.ts"), "").unwrap();

        let names: Vec<_> = list_source_files(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.ts", "b.ts"]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("entities");
        let err = list_source_files(&missing).unwrap_err();
        assert!(matches!(err, TypegenError::SourceNotFound { .. }));
    }

    #[test]
    fn test_strict_mode_rejects_syntax_errors() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("Broken.ts"),
            "@Entity()\nexport class Broken {\n  name: string\n  @@@\n}\n",
        )
        .unwrap();

        let mut parser = TsParser::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let err = scan_directory(temp_dir.path(), &mut parser, true, &mut diagnostics)
            .err()
            .unwrap();
        assert!(matches!(err, TypegenError::Parse { .. }));

        let units = scan_directory(temp_dir.path(), &mut parser, false, &mut diagnostics).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
    }
}

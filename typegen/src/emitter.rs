//! Renders TypeScript modules in memory. Nothing here touches the file system.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::model::TypeCatalog;
use crate::synthesizer::{ApiModule, SynthesizedInterface};

pub const HEADER: &str = "// Generated by typegen. Do not edit manually.";

const INDENT: &str = "    ";

/// Output group sub-directories, in barrel order.
pub const GROUPS: [&str; 3] = ["api", "entities", "enums"];

/// A rendered module and its path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
    pub path: PathBuf,
    pub content: String,
}

/// Layout knobs for emission.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Types directory relative to the output root, e.g. `src/types`
    pub types_dir: PathBuf,
    /// Import path of auxiliary value types from an entity module
    pub auxiliary_module: String,
    /// Directory names re-exported by the root barrel; `None` disables it
    pub root_barrel: Option<Vec<String>>,
}

/// Render every output module.
pub fn render_all(
    interfaces: &[SynthesizedInterface],
    api: &ApiModule,
    catalog: &TypeCatalog,
    options: &EmitOptions,
) -> Vec<RenderedModule> {
    let types_dir = options.types_dir.as_path();
    let entities_dir = types_dir.join("entities");

    let mut modules: Vec<RenderedModule> = interfaces
        .iter()
        .map(|interface| RenderedModule {
            path: entities_dir.join(format!("{}.ts", interface.name)),
            content: render_entity(interface, &options.auxiliary_module),
        })
        .collect();

    let names: Vec<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
    modules.push(RenderedModule {
        path: entities_dir.join("index.ts"),
        content: render_entities_barrel(&names),
    });
    modules.push(RenderedModule {
        path: types_dir.join("enums").join("index.ts"),
        content: render_enums(catalog),
    });
    modules.push(RenderedModule {
        path: types_dir.join("api").join("index.ts"),
        content: render_api(api),
    });
    modules.push(RenderedModule {
        path: types_dir.join("index.ts"),
        content: render_barrel(GROUPS.iter().map(|g| format!("./{g}"))),
    });

    if let Some(directories) = &options.root_barrel {
        modules.push(RenderedModule {
            path: root_barrel_path(types_dir),
            content: render_barrel(directories.iter().map(|d| format!("./{d}"))),
        });
    }

    modules
}

/// Where the root barrel goes: `index.ts` next to the types directory.
pub fn root_barrel_path(types_dir: &Path) -> PathBuf {
    types_dir
        .parent()
        .map(|parent| parent.join("index.ts"))
        .unwrap_or_else(|| PathBuf::from("index.ts"))
}

/// One entity interface module.
pub fn render_entity(interface: &SynthesizedInterface, auxiliary_module: &str) -> String {
    let mut content = String::new();
    let _ = writeln!(content, "{HEADER}");
    let _ = writeln!(content);

    let mut has_imports = false;
    for name in &interface.entity_refs {
        let _ = writeln!(content, "import type {{ {name} }} from './{name}';");
        has_imports = true;
    }
    has_imports |= write_combined_import(&mut content, &interface.enum_refs, "../enums");
    has_imports |= write_combined_import(&mut content, &interface.auxiliary_refs, auxiliary_module);
    if has_imports {
        let _ = writeln!(content);
    }

    if interface.fields.is_empty() {
        let _ = writeln!(content, "export interface {} {{}}", interface.name);
        return content;
    }

    let _ = writeln!(content, "export interface {} {{", interface.name);
    for field in &interface.fields {
        let _ = writeln!(content, "{INDENT}{};", field.declaration());
    }
    let _ = writeln!(content, "}}");
    content
}

/// `entities/index.ts`: one re-export per entity module.
pub fn render_entities_barrel(names: &[&str]) -> String {
    render_barrel(names.iter().map(|name| format!("./{name}")))
}

/// `enums/index.ts`: every extracted enum declaration, verbatim.
pub fn render_enums(catalog: &TypeCatalog) -> String {
    render_declarations("", catalog.enums.values().map(|d| d.text.as_str()))
}

/// `api/index.ts`: API-shape declarations prefixed by their imports.
pub fn render_api(api: &ApiModule) -> String {
    let mut imports = String::new();
    for name in &api.entity_refs {
        let _ = writeln!(imports, "import type {{ {name} }} from '../entities/{name}';");
    }
    write_combined_import(&mut imports, &api.enum_refs, "../enums");

    render_declarations(&imports, api.declarations.iter().map(|d| d.text.as_str()))
}

/// A barrel of `export * from '<path>';` lines.
pub fn render_barrel<I>(paths: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut content = String::new();
    let _ = writeln!(content, "{HEADER}");
    let _ = writeln!(content);

    let mut empty = true;
    for path in paths {
        let _ = writeln!(content, "export * from '{path}';");
        empty = false;
    }
    if empty {
        let _ = writeln!(content, "export {{}};");
    }
    content
}

fn render_declarations<'a, I>(imports: &str, declarations: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut content = String::new();
    let _ = writeln!(content, "{HEADER}");
    let _ = writeln!(content);

    if !imports.is_empty() {
        content.push_str(imports);
        let _ = writeln!(content);
    }

    let mut empty = true;
    for declaration in declarations {
        if !empty {
            let _ = writeln!(content);
        }
        let _ = writeln!(content, "{}", declaration.trim_end());
        empty = false;
    }
    if empty {
        let _ = writeln!(content, "export {{}};");
    }
    content
}

fn write_combined_import(content: &mut String, names: &IndexSet<String>, from: &str) -> bool {
    if names.is_empty() {
        return false;
    }
    let joined = names.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    let _ = writeln!(content, "import type {{ {joined} }} from '{from}';");
    true
}

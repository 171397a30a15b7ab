//! Interface synthesizer: flattens inheritance and computes import sets.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::model::{
    EntityArena, EntityRecord, MemberRecord, NamedDeclaration, TypeCatalog, is_builtin_type,
};
use crate::report::Diagnostics;

/// One entity ready for emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedInterface {
    pub name: String,
    pub fields: Vec<MemberRecord>,
    pub entity_refs: IndexSet<String>,
    pub enum_refs: IndexSet<String>,
    pub auxiliary_refs: IndexSet<String>,
}

/// The API-shape group with the imports its declarations need.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiModule {
    pub declarations: Vec<NamedDeclaration>,
    pub entity_refs: IndexSet<String>,
    pub enum_refs: IndexSet<String>,
}

/// Synthesize every entity of the arena, in arena order.
pub fn synthesize(
    arena: &EntityArena,
    catalog: &TypeCatalog,
    diagnostics: &mut Diagnostics,
) -> Vec<SynthesizedInterface> {
    arena
        .values()
        .map(|record| synthesize_entity(arena, record, catalog, diagnostics))
        .collect()
}

/// Synthesize a single entity against a complete arena.
pub fn synthesize_entity(
    arena: &EntityArena,
    record: &EntityRecord,
    catalog: &TypeCatalog,
    diagnostics: &mut Diagnostics,
) -> SynthesizedInterface {
    let fields = flattened_fields(arena, record, diagnostics);

    let mut entity_refs = IndexSet::new();
    let mut enum_refs = IndexSet::new();
    let mut auxiliary_refs = IndexSet::new();

    for field in &fields {
        let name = field.type_name.as_str();
        if is_builtin_type(name) || name == record.name {
            continue;
        }

        if arena.contains_key(name) {
            entity_refs.insert(name.to_string());
        } else if catalog.is_enum(name) {
            enum_refs.insert(name.to_string());
        } else if catalog.is_auxiliary(name) {
            auxiliary_refs.insert(name.to_string());
        } else if field.is_relation {
            diagnostics.warn(format!(
                "{}.{}: relation target '{}' is not a known entity",
                record.name, field.name, name
            ));
        }
    }

    SynthesizedInterface {
        name: record.name.clone(),
        fields,
        entity_refs,
        enum_refs,
        auxiliary_refs,
    }
}

/// Ancestor members (root first), then own, then computed.
///
/// A name seen twice keeps its first position and takes the most derived
/// definition.
fn flattened_fields(
    arena: &EntityArena,
    record: &EntityRecord,
    diagnostics: &mut Diagnostics,
) -> Vec<MemberRecord> {
    let mut chain = vec![record];
    let mut visited = IndexSet::from([record.name.as_str()]);
    let mut current = record;

    while current.is_child
        && let Some(parent_name) = current.parent_name.as_deref()
    {
        if !visited.insert(parent_name) {
            diagnostics.warn(format!(
                "{}: inheritance cycle through '{}'; ancestry cut there",
                record.name, parent_name
            ));
            break;
        }

        match arena.get(parent_name) {
            Some(parent) => {
                chain.push(parent);
                current = parent;
            }
            None => {
                if current.name == record.name {
                    diagnostics.warn(format!(
                        "{}: parent entity '{}' not found; emitting own fields only",
                        record.name, parent_name
                    ));
                }
                break;
            }
        }
    }

    let mut merged: IndexMap<&str, &MemberRecord> = IndexMap::new();
    for ancestor in chain.iter().rev() {
        for member in ancestor.members() {
            merged.insert(member.name.as_str(), member);
        }
    }

    merged.into_values().cloned().collect()
}

/// Resolve the imports of the API-shape declarations.
pub fn synthesize_api(arena: &EntityArena, catalog: &TypeCatalog) -> ApiModule {
    let declared: IndexSet<&str> =
        catalog.api_declarations.iter().map(|d| d.name.as_str()).collect();

    let mut entity_refs = IndexSet::new();
    let mut enum_refs = IndexSet::new();

    for declaration in &catalog.api_declarations {
        for name in &declaration.references {
            if declared.contains(name.as_str()) {
                continue;
            }
            if arena.contains_key(name) {
                entity_refs.insert(name.clone());
            } else if catalog.is_enum(name) {
                enum_refs.insert(name.clone());
            }
        }
    }

    ApiModule {
        declarations: catalog.api_declarations.clone(),
        entity_refs,
        enum_refs,
    }
}

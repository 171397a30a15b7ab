//! Member classifier: turns a marked class declaration into an [`EntityRecord`].

use tree_sitter::Node;

use crate::decorators::{Decorator, DecoratorSet, Tag, decorators_of, parse_decorator};
use crate::model::{ANY_TYPE, EntityRecord, MemberKind, MemberRecord, TypeCatalog};
use crate::parser::{SourceUnit, children, line_of, named_children};
use crate::scanner::{MarkedDeclaration, ModelMarker};
use crate::type_mapping::{map_column_type, map_computed_type, relation_target};

/// Field decorators in precedence order. The first one present decides the rule.
const FIELD_TAGS: &[Tag] = &[
    Tag::PrimaryGeneratedColumn,
    Tag::PrimaryColumn,
    Tag::Column,
    Tag::CreateDateColumn,
    Tag::UpdateDateColumn,
    Tag::DeleteDateColumn,
    Tag::TreeParent,
    Tag::TreeChildren,
    Tag::ManyToOne,
    Tag::OneToOne,
    Tag::OneToMany,
    Tag::ManyToMany,
];

/// Syntactic view of a class field before classification.
struct FieldSignature<'a> {
    name: &'a str,
    optional_syntax: bool,
    declared_type: Option<&'a str>,
}

/// Classify every member of a marked declaration.
pub fn classify(
    unit: &SourceUnit,
    declaration: &MarkedDeclaration<'_>,
    catalog: &TypeCatalog,
) -> EntityRecord {
    let mut record = EntityRecord::new(
        &declaration.name,
        unit.file_name(),
        line_of(declaration.node),
    );

    if declaration.marker == ModelMarker::Child {
        record.is_child = true;
        record.parent_name = extends_target(unit, declaration.node);
    }

    let Some(body) = declaration.node.child_by_field_name("body") else {
        return record;
    };

    // Decorators of methods and accessors are siblings preceding them in the body
    let mut pending: Vec<Decorator> = Vec::new();

    for member in named_children(body) {
        match member.kind() {
            "decorator" => {
                if let Some(decorator) = parse_decorator(unit, member) {
                    pending.push(decorator);
                }
                continue;
            }
            "public_field_definition" => {
                let mut decorators = DecoratorSet(std::mem::take(&mut pending));
                decorators.0.extend(decorators_of(unit, member).0);

                if let Some(signature) = field_signature(unit, member) {
                    match classify_field(&record.name, &signature, &decorators, catalog) {
                        Some(classified) => {
                            log::debug!(
                                "{}.{}: {} ({})",
                                record.name,
                                classified.name,
                                classified.type_name,
                                classified.kind
                            );
                            record.own_members.push(classified);
                        }
                        None => log::debug!(
                            "{}.{}: dropped [{}]",
                            record.name,
                            signature.name,
                            decorators.names().join(", ")
                        ),
                    }
                }
            }
            "method_definition" => {
                let mut decorators = DecoratorSet(std::mem::take(&mut pending));
                decorators.0.extend(decorators_of(unit, member).0);

                if let Some(computed) = classify_getter(unit, member, &decorators) {
                    log::debug!(
                        "{}.{}: {} (computed)",
                        record.name,
                        computed.name,
                        computed.type_name
                    );
                    record.computed_members.push(computed);
                }
            }
            _ => {}
        }
        pending.clear();
    }

    record
}

/// Immediate supertype named in an `extends` clause.
fn extends_target(unit: &SourceUnit, class_node: Node<'_>) -> Option<String> {
    let heritage = children(class_node)
        .into_iter()
        .find(|c| c.kind() == "class_heritage")?;
    let clause = named_children(heritage)
        .into_iter()
        .find(|c| c.kind() == "extends_clause")?;
    let value = clause.child_by_field_name("value")?;

    match value.kind() {
        "identifier" => Some(unit.text(value).to_string()),
        "member_expression" => value
            .child_by_field_name("property")
            .map(|p| unit.text(p).to_string()),
        _ => None,
    }
}

fn field_signature<'a>(unit: &'a SourceUnit, field: Node<'_>) -> Option<FieldSignature<'a>> {
    let name = field.child_by_field_name("name")?;
    if name.kind() != "property_identifier" {
        return None;
    }

    Some(FieldSignature {
        name: unit.text(name),
        optional_syntax: children(field).iter().any(|c| c.kind() == "?"),
        declared_type: annotated_type(unit, field, "type"),
    })
}

/// Text of the type inside a `type_annotation` field, without the colon.
fn annotated_type<'a>(unit: &'a SourceUnit, node: Node<'_>, field: &str) -> Option<&'a str> {
    let annotation = node.child_by_field_name(field)?;
    let inner = named_children(annotation).into_iter().next()?;
    Some(unit.text(inner))
}

/// Apply field rules 1 through 8 to one field.
fn classify_field(
    entity: &str,
    field: &FieldSignature<'_>,
    decorators: &DecoratorSet,
    catalog: &TypeCatalog,
) -> Option<MemberRecord> {
    if decorators.has(&Tag::Exclude) {
        return None;
    }

    let decorator = FIELD_TAGS.iter().find_map(|tag| decorators.find(tag))?;

    let member = match &decorator.tag {
        Tag::PrimaryGeneratedColumn => {
            MemberRecord::new(field.name, "number", MemberKind::Identifier)
        }
        Tag::PrimaryColumn => {
            let mapped = map_column_type(field.declared_type, decorator.storage_kind(), catalog);
            MemberRecord::new(field.name, mapped.type_name, MemberKind::PrimaryKey)
                .array(mapped.is_array)
        }
        Tag::Column => {
            let mapped = map_column_type(field.declared_type, decorator.storage_kind(), catalog);
            let optional = field.optional_syntax || mapped.nullable || decorator.is_nullable();
            MemberRecord::new(field.name, mapped.type_name, MemberKind::Column)
                .optional(optional)
                .array(mapped.is_array)
        }
        Tag::CreateDateColumn | Tag::UpdateDateColumn => {
            MemberRecord::new(field.name, "string", MemberKind::Timestamp)
        }
        Tag::DeleteDateColumn => {
            MemberRecord::new(
                field.name,
                "string",
                MemberKind::SoftDeleteTimestamp,
            )
            .optional(true)
        }
        Tag::TreeParent | Tag::TreeChildren => {
            let target = relation_target(field.declared_type)
                .or_else(|| decorator.thunk_target().map(str::to_string))
                .unwrap_or_else(|| entity.to_string());
            let (kind, is_array) = if decorator.tag == Tag::TreeChildren {
                (MemberKind::TreeChildren, true)
            } else {
                (MemberKind::TreeParent, false)
            };
            MemberRecord::new(field.name, target, kind)
                .optional(true)
                .array(is_array)
                .relation()
        }
        Tag::ManyToOne | Tag::OneToOne | Tag::OneToMany | Tag::ManyToMany => {
            let target = relation_target(field.declared_type)
                .or_else(|| decorator.thunk_target().map(str::to_string))
                .unwrap_or_else(|| ANY_TYPE.to_string());
            let (kind, is_array) = match decorator.tag {
                Tag::OneToMany | Tag::ManyToMany => (MemberKind::ToMany, true),
                _ => (MemberKind::ToOne, false),
            };
            MemberRecord::new(field.name, target, kind)
                .optional(true)
                .array(is_array)
                .relation()
        }
        _ => return None,
    };

    Some(member)
}

/// Exposed, non-excluded `get` accessors become computed members.
fn classify_getter(
    unit: &SourceUnit,
    method: Node<'_>,
    decorators: &DecoratorSet,
) -> Option<MemberRecord> {
    let is_getter = children(method).iter().any(|c| c.kind() == "get");
    if !is_getter || !decorators.has(&Tag::Expose) || decorators.has(&Tag::Exclude) {
        return None;
    }

    let name = method.child_by_field_name("name")?;
    if name.kind() != "property_identifier" {
        return None;
    }

    let type_name = map_computed_type(annotated_type(unit, method, "return_type"));
    Some(MemberRecord::new(unit.text(name), type_name, MemberKind::Computed))
}

//! Normalized records produced by the classifier and consumed by the synthesizer.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// All entity records of one run, keyed by name in discovery order.
pub type EntityArena = IndexMap<String, EntityRecord>;

/// Scalar type names that never need an import.
pub const PRIMITIVE_TYPES: &[&str] = &["string", "number", "boolean"];

/// Fallback type name used when nothing narrower can be derived.
pub const ANY_TYPE: &str = "any";

/// Returns true for `string`, `number`, `boolean` and `any`.
pub fn is_builtin_type(name: &str) -> bool {
    name == ANY_TYPE || PRIMITIVE_TYPES.contains(&name)
}

/// One discovered entity class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    /// Class name (e.g., "Order")
    pub name: String,

    /// Whether the class is marked as a single-table-inheritance child
    pub is_child: bool,

    /// Immediate supertype of a child entity, resolved later by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    /// Classified field members, in declaration order
    pub own_members: Vec<MemberRecord>,

    /// Exposed getters, in declaration order
    pub computed_members: Vec<MemberRecord>,

    /// Source file (relative to the entity directory)
    pub source_file: String,

    /// 1-indexed line of the class declaration
    pub source_line: usize,
}

impl EntityRecord {
    pub fn new(
        name: impl Into<String>,
        source_file: impl Into<String>,
        source_line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            is_child: false,
            parent_name: None,
            own_members: Vec::new(),
            computed_members: Vec::new(),
            source_file: source_file.into(),
            source_line,
        }
    }

    /// Own members followed by computed members.
    pub fn members(&self) -> impl Iterator<Item = &MemberRecord> {
        self.own_members.iter().chain(self.computed_members.iter())
    }
}

/// One classified field or getter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub name: String,

    #[serde(rename = "type")]
    pub type_name: String,

    pub optional: bool,

    pub is_array: bool,

    pub is_relation: bool,

    /// Rule that produced this member
    pub kind: MemberKind,
}

impl MemberRecord {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            optional: false,
            is_array: false,
            is_relation: false,
            kind,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    pub fn relation(mut self) -> Self {
        self.is_relation = true;
        self
    }

    /// TypeScript property line body, e.g. `items?: OrderItem[]`.
    pub fn declaration(&self) -> String {
        let optional = if self.optional { "?" } else { "" };
        let array = if self.is_array { "[]" } else { "" };
        format!("{}{optional}: {}{array}", self.name, self.type_name)
    }
}

/// Classification rule that produced a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Identifier,
    PrimaryKey,
    Column,
    Timestamp,
    SoftDeleteTimestamp,
    TreeParent,
    TreeChildren,
    ToOne,
    ToMany,
    Computed,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MemberKind::Identifier => "identifier",
            MemberKind::PrimaryKey => "primary key",
            MemberKind::Column => "column",
            MemberKind::Timestamp => "timestamp",
            MemberKind::SoftDeleteTimestamp => "soft-delete",
            MemberKind::TreeParent => "tree parent",
            MemberKind::TreeChildren => "tree children",
            MemberKind::ToOne => "to-one",
            MemberKind::ToMany => "to-many",
            MemberKind::Computed => "computed",
        };
        f.write_str(label)
    }
}

/// An exported declaration copied verbatim into an output group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedDeclaration {
    pub name: String,
    pub text: String,

    /// Type names the declaration refers to, first-encountered order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

/// Known enumeration and auxiliary value-type names, built once per run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeCatalog {
    /// Exported enum declarations by name
    pub enums: IndexMap<String, NamedDeclaration>,

    /// Names usable as auxiliary value types
    pub auxiliary: IndexSet<String>,

    /// Interface and type-alias declarations forming the API group
    pub api_declarations: Vec<NamedDeclaration>,
}

impl TypeCatalog {
    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn is_auxiliary(&self, name: &str) -> bool {
        self.auxiliary.contains(name)
    }

    /// Build a catalog from bare names, mainly for tests and embedding.
    pub fn from_names<E, A>(enums: E, auxiliary: A) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let enums = enums
            .into_iter()
            .map(|name| {
                let name = name.into();
                let text = format!("export enum {name} {{}}");
                (
                    name.clone(),
                    NamedDeclaration {
                        name,
                        text,
                        references: Vec::new(),
                    },
                )
            })
            .collect();
        Self {
            enums,
            auxiliary: auxiliary.into_iter().map(Into::into).collect(),
            api_declarations: Vec::new(),
        }
    }
}

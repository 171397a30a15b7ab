//! Decorator extraction and the closed set of recognized decorator tags.

use tree_sitter::Node;

use crate::parser::{SourceUnit, children, named_children};

/// Decorators the classifier understands. Anything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Entity,
    ChildEntity,
    Exclude,
    Expose,
    PrimaryGeneratedColumn,
    PrimaryColumn,
    Column,
    CreateDateColumn,
    UpdateDateColumn,
    DeleteDateColumn,
    TreeParent,
    TreeChildren,
    OneToOne,
    ManyToOne,
    OneToMany,
    ManyToMany,
    Other(String),
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Entity" => Tag::Entity,
            "ChildEntity" => Tag::ChildEntity,
            "Exclude" => Tag::Exclude,
            "Expose" => Tag::Expose,
            "PrimaryGeneratedColumn" => Tag::PrimaryGeneratedColumn,
            "PrimaryColumn" => Tag::PrimaryColumn,
            "Column" => Tag::Column,
            "CreateDateColumn" => Tag::CreateDateColumn,
            "UpdateDateColumn" => Tag::UpdateDateColumn,
            "DeleteDateColumn" => Tag::DeleteDateColumn,
            "TreeParent" => Tag::TreeParent,
            "TreeChildren" => Tag::TreeChildren,
            "OneToOne" => Tag::OneToOne,
            "ManyToOne" => Tag::ManyToOne,
            "OneToMany" => Tag::OneToMany,
            "ManyToMany" => Tag::ManyToMany,
            other => Tag::Other(other.to_string()),
        }
    }
}

/// A decorator application with its arguments as parsed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub tag: Tag,
    pub args: Vec<DecoratorArg>,
}

/// The argument shapes the classifier cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum DecoratorArg {
    /// String literal, quotes removed
    Str(String),
    /// Object literal, in source order
    Object(Vec<(String, DecoratorArg)>),
    /// Arrow function returning a bare identifier, e.g. `() => Post`
    TypeThunk(String),
    Bool(bool),
    /// Any other expression, kept as source text
    Raw(String),
}

impl Decorator {
    /// Value of `key` in the first object-literal argument.
    pub fn option(&self, key: &str) -> Option<&DecoratorArg> {
        self.args.iter().find_map(|arg| match arg {
            DecoratorArg::Object(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        })
    }

    /// Column storage kind: first string argument, else the `type:` option.
    pub fn storage_kind(&self) -> Option<&str> {
        let positional = self.args.iter().find_map(|arg| match arg {
            DecoratorArg::Str(s) => Some(s.as_str()),
            _ => None,
        });
        positional.or_else(|| match self.option("type") {
            Some(DecoratorArg::Str(s)) => Some(s.as_str()),
            _ => None,
        })
    }

    /// True when the options carry `nullable: true`.
    pub fn is_nullable(&self) -> bool {
        matches!(self.option("nullable"), Some(DecoratorArg::Bool(true)))
    }

    /// Target named by a leading `() => Target` argument.
    pub fn thunk_target(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            DecoratorArg::TypeThunk(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Set of decorators attached to one declaration or member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecoratorSet(pub Vec<Decorator>);

impl DecoratorSet {
    pub fn has(&self, tag: &Tag) -> bool {
        self.0.iter().any(|d| &d.tag == tag)
    }

    pub fn find(&self, tag: &Tag) -> Option<&Decorator> {
        self.0.iter().find(|d| &d.tag == tag)
    }

    /// Decorator names for log output.
    pub fn names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|d| match &d.tag {
                Tag::Other(name) => name.clone(),
                tag => format!("{tag:?}"),
            })
            .collect()
    }
}

/// Decorators that are direct children of `node` (field `decorator`).
pub fn decorators_of(unit: &SourceUnit, node: Node<'_>) -> DecoratorSet {
    DecoratorSet(
        children(node)
            .into_iter()
            .filter(|c| c.kind() == "decorator")
            .filter_map(|c| parse_decorator(unit, c))
            .collect(),
    )
}

/// Decorators of a class declaration, including those written before `export`.
pub fn class_decorators(unit: &SourceUnit, class_node: Node<'_>) -> DecoratorSet {
    let mut set = decorators_of(unit, class_node);
    if let Some(parent) = class_node.parent()
        && parent.kind() == "export_statement"
    {
        let mut outer = decorators_of(unit, parent);
        outer.0.append(&mut set.0);
        set = outer;
    }
    set
}

/// Parse a single `decorator` node.
pub fn parse_decorator(unit: &SourceUnit, node: Node<'_>) -> Option<Decorator> {
    let expr = named_children(node).into_iter().next()?;

    match expr.kind() {
        "identifier" => Some(Decorator {
            tag: Tag::from_name(unit.text(expr)),
            args: Vec::new(),
        }),
        "call_expression" => {
            let function = expr.child_by_field_name("function")?;
            if function.kind() != "identifier" {
                return None;
            }
            let args = expr
                .child_by_field_name("arguments")
                .map(|a| named_children(a).into_iter().map(|n| parse_arg(unit, n)).collect())
                .unwrap_or_default();
            Some(Decorator {
                tag: Tag::from_name(unit.text(function)),
                args,
            })
        }
        _ => None,
    }
}

fn parse_arg(unit: &SourceUnit, node: Node<'_>) -> DecoratorArg {
    match node.kind() {
        "string" => DecoratorArg::Str(unquote(unit.text(node))),
        "true" => DecoratorArg::Bool(true),
        "false" => DecoratorArg::Bool(false),
        "object" => {
            let pairs = named_children(node)
                .into_iter()
                .filter(|n| n.kind() == "pair")
                .filter_map(|pair| {
                    let key = pair.child_by_field_name("key")?;
                    let value = pair.child_by_field_name("value")?;
                    let key = match key.kind() {
                        "string" => unquote(unit.text(key)),
                        _ => unit.text(key).to_string(),
                    };
                    Some((key, parse_arg(unit, value)))
                })
                .collect();
            DecoratorArg::Object(pairs)
        }
        "arrow_function" => match node.child_by_field_name("body") {
            Some(body) if body.kind() == "identifier" => {
                DecoratorArg::TypeThunk(unit.text(body).to_string())
            }
            _ => DecoratorArg::Raw(unit.text(node).to_string()),
        },
        _ => DecoratorArg::Raw(unit.text(node).to_string()),
    }
}

fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '\'' || c == '"' || c == '`').to_string()
}

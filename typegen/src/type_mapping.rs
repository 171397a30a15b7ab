//! Maps declared TypeScript type text onto the normalized member type.

use crate::model::{ANY_TYPE, PRIMITIVE_TYPES, TypeCatalog};

/// Column storage kinds serialized as strings at the API boundary.
const DATE_STORAGE_KINDS: &[&str] = &["date", "datetime", "timestamp", "timestamptz", "time"];

/// Column storage kinds whose payload is opaque JSON.
const JSON_STORAGE_KINDS: &[&str] = &["json", "jsonb", "simple-json"];

/// Declared type text broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Element type text with null union and array marker removed. Union and
    /// function elements of an array keep their grouping parentheses.
    pub element: String,
    pub is_array: bool,
    /// The declared type had a `null` or `undefined` union member
    pub nullable: bool,
}

impl DeclaredType {
    /// Split declared type text. `None` (no annotation) becomes `any`.
    pub fn parse(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self {
                element: ANY_TYPE.to_string(),
                is_array: false,
                nullable: false,
            };
        };

        let members = split_top_level(text, '|');
        let mut nullable = false;
        let kept: Vec<&str> = members
            .into_iter()
            .filter(|m| {
                let is_null = *m == "null" || *m == "undefined";
                nullable |= is_null;
                !is_null
            })
            .collect();

        if kept.len() != 1 {
            let element = if kept.is_empty() {
                ANY_TYPE.to_string()
            } else {
                kept.join(" | ")
            };
            return Self {
                element,
                is_array: false,
                nullable,
            };
        }

        let (element, is_array) = strip_array(kept[0]);
        Self {
            element,
            is_array,
            nullable,
        }
    }
}

/// Resolved type of a column-like member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub type_name: String,
    pub is_array: bool,
    pub nullable: bool,
}

/// Apply the column type mapping rule.
pub fn map_column_type(
    declared: Option<&str>,
    storage_kind: Option<&str>,
    catalog: &TypeCatalog,
) -> MappedType {
    let parsed = DeclaredType::parse(declared);
    let type_name = map_element(&parsed.element, storage_kind, catalog);
    MappedType {
        type_name,
        is_array: parsed.is_array,
        nullable: parsed.nullable,
    }
}

fn map_element(element: &str, storage_kind: Option<&str>, catalog: &TypeCatalog) -> String {
    if let Some(kind) = storage_kind.map(str::to_ascii_lowercase) {
        if DATE_STORAGE_KINDS.contains(&kind.as_str()) {
            return "string".to_string();
        }
        if JSON_STORAGE_KINDS.contains(&kind.as_str()) {
            return if catalog.is_auxiliary(element) {
                element.to_string()
            } else {
                ANY_TYPE.to_string()
            };
        }
    }

    match element {
        "Date" => "string".to_string(),
        other => other.to_string(),
    }
}

/// Relation target name from the declared type of a relation member.
///
/// Strips null unions, array markers and a `Promise<...>` wrapper used by lazy
/// relations. Returns `None` when nothing usable is declared.
pub fn relation_target(declared: Option<&str>) -> Option<String> {
    let declared = declared?;
    let mut parsed = DeclaredType::parse(Some(declared));
    if let Some(inner) = unwrap_generic(&parsed.element, "Promise") {
        parsed = DeclaredType::parse(Some(inner));
    }
    let name = parsed.element;
    if name.is_empty() || name == ANY_TYPE || name.contains(' ') {
        None
    } else {
        Some(name)
    }
}

/// Getter return types are kept only when they are primitive scalars.
pub fn map_computed_type(return_type: Option<&str>) -> String {
    match return_type.map(str::trim) {
        Some(t) if PRIMITIVE_TYPES.contains(&t) => t.to_string(),
        _ => ANY_TYPE.to_string(),
    }
}

fn strip_array(text: &str) -> (String, bool) {
    let text = text.trim();
    if let Some(inner) = text.strip_suffix("[]") {
        return (array_element(inner), true);
    }
    if let Some(inner) = unwrap_generic(text, "Array") {
        return (array_element(inner), true);
    }
    (text.to_string(), false)
}

/// Element text that stays valid when `[]` is appended again.
fn array_element(inner: &str) -> String {
    let bare = strip_parens(inner);
    if needs_grouping(bare) {
        format!("({bare})")
    } else {
        bare.to_string()
    }
}

fn needs_grouping(text: &str) -> bool {
    split_top_level(text, '|').len() > 1
        || split_top_level(text, '&').len() > 1
        || text.contains("=>")
}

/// Remove one pair of parentheses enclosing the whole text.
fn strip_parens(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) else {
        return text;
    };
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return text;
        }
    }
    inner.trim()
}

fn unwrap_generic<'a>(text: &'a str, wrapper: &str) -> Option<&'a str> {
    text.trim()
        .strip_prefix(wrapper)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}

/// Split on `sep` outside of brackets, parentheses, braces and string literals.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut prev = None;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            prev = Some(ch);
            continue;
        }
        match ch {
            '\'' | '"' | '`' => quote = Some(ch),
            '<' | '(' | '[' | '{' => depth += 1,
            // `=>` of a function type is not a closing bracket
            '>' if prev == Some('=') => {}
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + ch.len_utf8();
            }
            _ => {}
        }
        prev = Some(ch);
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TypeCatalog {
        TypeCatalog::from_names(["UserType"], ["Attachment"])
    }

    #[test]
    fn test_null_union_is_optional() {
        let mapped = map_column_type(Some("string | null"), None, &catalog());
        assert_eq!(mapped.type_name, "string");
        assert!(mapped.nullable);
        assert!(!mapped.is_array);
    }

    #[test]
    fn test_array_with_null_union() {
        let mapped = map_column_type(Some("string[] | null"), None, &catalog());
        assert_eq!(mapped.type_name, "string");
        assert!(mapped.is_array);
        assert!(mapped.nullable);

        let generic = map_column_type(Some("Array<number>"), None, &catalog());
        assert_eq!(generic.type_name, "number");
        assert!(generic.is_array);
    }

    #[test]
    fn test_dates_become_strings() {
        assert_eq!(map_column_type(Some("Date"), None, &catalog()).type_name, "string");
        assert_eq!(
            map_column_type(Some("string"), Some("datetime"), &catalog()).type_name,
            "string"
        );
    }

    #[test]
    fn test_json_collapses_unless_auxiliary() {
        let preserved = map_column_type(Some("Attachment[]"), Some("json"), &catalog());
        assert_eq!(preserved.type_name, "Attachment");
        assert!(preserved.is_array);

        let collapsed = map_column_type(
            Some("Record<string, unknown>"),
            Some("simple-json"),
            &catalog(),
        );
        assert_eq!(collapsed.type_name, "any");
    }

    #[test]
    fn test_literal_unions_pass_through() {
        let mapped = map_column_type(Some("'image' | 'video' | null"), None, &catalog());
        assert_eq!(mapped.type_name, "'image' | 'video'");
        assert!(mapped.nullable);
        assert!(!mapped.is_array);
    }

    #[test]
    fn test_missing_annotation_is_any() {
        let mapped = map_column_type(None, None, &catalog());
        assert_eq!(mapped.type_name, "any");
        assert!(!mapped.nullable);
    }

    #[test]
    fn test_relation_target() {
        assert_eq!(relation_target(Some("Post[]")), Some("Post".to_string()));
        assert_eq!(relation_target(Some("User | null")), Some("User".to_string()));
        assert_eq!(relation_target(Some("Promise<Tag[]>")), Some("Tag".to_string()));
        assert_eq!(relation_target(None), None);
    }

    #[test]
    fn test_computed_type() {
        assert_eq!(map_computed_type(Some("boolean")), "boolean");
        assert_eq!(map_computed_type(Some("Date")), "any");
        assert_eq!(map_computed_type(Some("string[]")), "any");
        assert_eq!(map_computed_type(None), "any");
    }

    #[test]
    fn test_union_array_keeps_grouping() {
        let literal = map_column_type(
            Some("('image' | 'video')[]"),
            Some("simple-array"),
            &catalog(),
        );
        assert_eq!(literal.type_name, "('image' | 'video')");
        assert!(literal.is_array);

        let generic = map_column_type(Some("Array<number | string> | null"), None, &catalog());
        assert_eq!(generic.type_name, "(number | string)");
        assert!(generic.is_array);
        assert!(generic.nullable);

        let callbacks = map_column_type(Some("(() => void)[]"), None, &catalog());
        assert_eq!(callbacks.type_name, "(() => void)");

        let plain = map_column_type(Some("(string)[]"), None, &catalog());
        assert_eq!(plain.type_name, "string");

        let nested = map_column_type(Some("string[][]"), None, &catalog());
        assert_eq!(nested.type_name, "string[]");
        assert!(nested.is_array);
    }

    #[test]
    fn test_strip_parens_needs_enclosing_pair() {
        assert_eq!(strip_parens("(A | B)"), "A | B");
        assert_eq!(strip_parens("(a: A) => (B)"), "(a: A) => (B)");
    }

    #[test]
    fn test_split_respects_nesting() {
        assert_eq!(
            split_top_level("Map<string, A | B> | null", '|'),
            vec!["Map<string, A | B>", "null"]
        );
        assert_eq!(split_top_level("'a|b' | null", '|'), vec!["'a|b'", "null"]);
    }
}

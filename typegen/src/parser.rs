//! TypeScript parsing on top of tree-sitter.
//!
//! tree-sitter always produces a tree, even for malformed input; syntax errors
//! show up as `ERROR` / missing nodes that callers may inspect via
//! [`SourceUnit::first_syntax_error`].

use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Parser, Tree};

use crate::errors::{Result, TypegenError};

/// Parser for TypeScript source units.
pub struct TsParser {
    parser: Parser,
}

impl TsParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?;
        Ok(Self { parser })
    }

    /// Read and parse a file.
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceUnit> {
        let source = fs::read_to_string(path).map_err(|e| TypegenError::read(path, e))?;
        self.parse_source(path, source)
    }

    /// Parse already loaded source text.
    pub fn parse_source(&mut self, path: &Path, source: String) -> Result<SourceUnit> {
        let tree = self.parser.parse(&source, None).ok_or_else(|| TypegenError::Parse {
            path: path.to_path_buf(),
            message: "parser produced no syntax tree".to_string(),
        })?;

        Ok(SourceUnit {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }
}

/// A parsed source file: text plus its syntax tree.
pub struct SourceUnit {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

impl SourceUnit {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by a node.
    pub fn text<'a>(&'a self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// File name without directories, used for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Position (1-indexed line, column) of the first syntax error, if any.
    pub fn first_syntax_error(&self) -> Option<(usize, usize)> {
        let root = self.root();
        if !root.has_error() {
            return None;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let pos = node.start_position();
                return Some((pos.row + 1, pos.column + 1));
            }
            let mut kids = children(node);
            kids.retain(|k| k.has_error());
            stack.extend(kids.into_iter().rev());
        }

        let pos = root.start_position();
        Some((pos.row + 1, pos.column + 1))
    }
}

/// All children of a node, including anonymous tokens.
pub fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named children of a node, skipping comments.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

/// Every descendant (including `node`) whose kind is in `kinds`, in source order.
pub fn descendants_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if kinds.contains(&current.kind()) {
            found.push(current);
        }
        stack.extend(children(current).into_iter().rev());
    }
    found
}

/// 1-indexed start line of a node.
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

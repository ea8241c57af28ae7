//! AST dump types
//!
//! Wire node for `textDocument/ast` plus an arena form for clients that
//! need parent navigation ("jump to source" style traversal). The tree is
//! read-only after construction, so nodes hold parent and child indices
//! instead of references.

use serde::{Deserialize, Serialize};

use super::lsp::Range;

/// Wire format of a single AST node as clangd reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    /// e.g. "expression"
    pub role: String,
    /// e.g. "BinaryOperator"
    pub kind: String,
    /// e.g. "||"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// e.g. "BinaryOperator <0x12345> <col:12, col:1> 'bool' '||'"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arcana: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<AstNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// Primary label for a node.
///
/// For common roles where the kind is fairly self-explanatory the role is
/// dropped, e.g. "Call" rather than "Call expression".
pub fn describe(role: &str, kind: &str) -> String {
    match role {
        "expression" | "statement" | "declaration" | "template name" => kind.to_string(),
        _ => format!("{kind} {role}"),
    }
}

/// One node in the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstTreeNode {
    pub role: String,
    pub kind: String,
    pub detail: Option<String>,
    pub arcana: Option<String>,
    pub range: Option<Range>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl AstTreeNode {
    pub fn label(&self) -> String {
        describe(&self.role, &self.kind)
    }
}

/// Arena-backed AST. Index 0 is the root; child order matches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstTree {
    nodes: Vec<AstTreeNode>,
}

impl AstTree {
    /// Flatten a wire tree into the arena, pre-order.
    pub fn from_wire(root: AstNode) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.insert(root, None);
        tree
    }

    fn insert(&mut self, node: AstNode, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        self.nodes.push(AstTreeNode {
            role: node.role,
            kind: node.kind,
            detail: node.detail,
            arcana: node.arcana,
            range: node.range,
            parent,
            children: Vec::new(),
        });
        for child in node.children.unwrap_or_default() {
            let child_index = self.insert(child, Some(index));
            self.nodes[index].children.push(child_index);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &AstTreeNode {
        &self.nodes[0]
    }

    pub fn get(&self, index: usize) -> Option<&AstTreeNode> {
        self.nodes.get(index)
    }

    pub fn parent(&self, index: usize) -> Option<&AstTreeNode> {
        self.nodes.get(index)?.parent.and_then(|p| self.nodes.get(p))
    }

    /// Pre-order traversal of (index, node) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &AstTreeNode)> {
        self.nodes.iter().enumerate()
    }
}

//! Data models for clangd-ext
//!
//! Contains core type definitions used throughout the crate.

pub mod ast;
pub mod highlight;
pub mod lsp;
pub mod memory;

// Re-export commonly used types
pub use ast::{AstTree, AstTreeNode};
pub use highlight::{DecodedToken, HighlightKind, HighlightLine, ScopeTable};
pub use lsp::{
    Position, Range, TextDocumentIdentifier, TextDocumentPositionParams,
    VersionedTextDocumentIdentifier,
};
pub use memory::MemoryTreeNode;

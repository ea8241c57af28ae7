//! LSP Common Types
//!
//! Single source of truth for the small set of standard LSP types the
//! extension methods share. The host client already has its own copies;
//! these exist so the wire schemas in `infra::protocol` are self-contained.

use serde::{Deserialize, Serialize};

/// Position within a document (0-indexed, LSP standard)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Range within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Convert a single position to an empty range
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

impl TextDocumentIdentifier {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Document identifier plus the version the server rendered against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentPositionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_range() {
        let pos = Position::new(3, 14);
        let range = Range::point(pos);
        assert_eq!(range.start, range.end);
        assert_eq!(range.start.line, 3);
    }

    #[test]
    fn test_position_params_wire_shape() {
        let params = TextDocumentPositionParams {
            text_document: TextDocumentIdentifier::new("file:///a.cpp"),
            position: Position::new(1, 2),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["textDocument"]["uri"], "file:///a.cpp");
        assert_eq!(json["position"]["line"], 1);
    }
}

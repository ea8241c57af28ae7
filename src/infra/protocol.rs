//! clangd protocol extension schemas
//!
//! Typed definitions of the vendor-specific requests and notifications
//! this crate layers on top of a standard LSP client: method name, params
//! shape and result shape for each. JSON-RPC framing itself belongs to the
//! host client; only the ids and error payloads it hands back are modeled
//! here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::models::ast::AstNode;
pub use crate::models::lsp::{
    Position, Range, TextDocumentIdentifier, TextDocumentPositionParams,
    VersionedTextDocumentIdentifier,
};
use crate::models::highlight::ScopeTable;

// ============================================================================
// JSON-RPC surface shared with the host client
// ============================================================================

/// Request ID - can be number or string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        RequestId::Number(id)
    }
}

/// JSON-RPC 2.0 error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ResponseError {}

/// Standard JSON-RPC / LSP error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    pub const REQUEST_CANCELLED: i32 = -32800;
    pub const CONTENT_MODIFIED: i32 = -32801;
}

// ============================================================================
// Server capabilities snapshot
// ============================================================================

/// Read-only snapshot of the server-advertised capabilities, taken once
/// per session during initialization. Feature activation is a pure
/// function of this value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities(Value);

impl ServerCapabilities {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Look up a capability by key. Dotted keys descend into nested
    /// objects, e.g. `compilationDatabase.automaticReload`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.0;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// True when the key is present and truthy. Structured advertisements
    /// (objects, arrays, strings) count as truthy; `false` and `null`
    /// do not.
    pub fn advertises(&self, key: &str) -> bool {
        match self.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    }

    /// The legacy semantic-highlighting scope table, when advertised.
    pub fn scope_table(&self) -> Option<ScopeTable> {
        let scopes = self.get("semanticHighlighting.scopes")?;
        serde_json::from_value(scopes.clone()).ok()
    }
}

// ============================================================================
// Extension requests
// ============================================================================

/// A typed clangd extension request: method name, params shape and result
/// shape. Marker types below implement it; the pipeline and session issue
/// them generically.
pub trait ExtensionRequest {
    const METHOD: &'static str;
    type Params: Serialize + Send;
    type Result: DeserializeOwned + Send;
}

/// `textDocument/switchSourceHeader` - jump between a source file and its
/// header. Resolves to the destination URI, or nothing if the server did
/// not find a counterpart.
pub enum SwitchSourceHeaderRequest {}

impl ExtensionRequest for SwitchSourceHeaderRequest {
    const METHOD: &'static str = "textDocument/switchSourceHeader";
    type Params = SwitchSourceHeaderParams;
    type Result = Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSourceHeaderParams {
    pub text_document: TextDocumentIdentifier,
}

/// `textDocument/symbolInfo` - detailed info about the symbol under a
/// position.
pub enum SymbolInfoRequest {}

impl ExtensionRequest for SymbolInfoRequest {
    const METHOD: &'static str = "textDocument/symbolInfo";
    type Params = TextDocumentPositionParams;
    type Result = Vec<SymbolDetails>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetails {
    pub name: String,
    pub container_name: String,
    pub usr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// `textDocument/ast` - dump the AST covering a range. `None` when no
/// node covers the selection.
pub enum AstRequest {}

impl ExtensionRequest for AstRequest {
    const METHOD: &'static str = "textDocument/ast";
    type Params = AstParams;
    type Result = Option<AstNode>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstParams {
    pub text_document: TextDocumentIdentifier,
    pub range: Range,
}

/// `clangd/inlayHints` - the pre-LSP-3.17 vendor inlay hints request.
pub enum InlayHintsRequest {}

impl ExtensionRequest for InlayHintsRequest {
    const METHOD: &'static str = "clangd/inlayHints";
    type Params = InlayHintsParams;
    type Result = Vec<WireInlayHint>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlayHintsParams {
    pub text_document: TextDocumentIdentifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// Inlay hint as old clangd servers send it. `position` is omitted by
/// the oldest servers; consumers fall back to `range.start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireInlayHint {
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// "type", "parameter", or something newer.
    pub kind: String,
    pub label: String,
}

/// `$/memoryUsage` - server memory snapshot. The result is the recursive
/// wire tree; see `features::memory_usage` for normalization.
pub enum MemoryUsageRequest {}

impl ExtensionRequest for MemoryUsageRequest {
    const METHOD: &'static str = "$/memoryUsage";
    type Params = MemoryUsageParams;
    type Result = Value;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryUsageParams {}

// ============================================================================
// Server-to-client notifications
// ============================================================================

/// Method name of the legacy semantic-highlighting push notification.
pub const SEMANTIC_HIGHLIGHTING_METHOD: &str = "textDocument/semanticHighlighting";

/// Highlighting information for one line: the zero-based line number and a
/// base64 string packing every highlighted span on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticHighlightingInformation {
    pub line: u32,
    pub tokens: String,
}

/// Params of the semantic-highlighting notification. Mirrors the structure
/// in the (withdrawn) semantic highlighting proposal for LSP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticHighlightingParams {
    pub text_document: VersionedTextDocumentIdentifier,
    pub lines: Vec<SemanticHighlightingInformation>,
}

/// Method name of the file-status push notification.
pub const FILE_STATUS_METHOD: &str = "textDocument/clangd.fileStatus";

/// Per-file progress state pushed by the server ("idle", "parsing", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub uri: String,
    pub state: String,
}

//! clangd-ext - clangd protocol extensions for LSP clients
//!
//! An editor-side extension layer sitting atop a standard LSP client,
//! adding the clangd family of vendor-specific protocol extensions:
//! AST inspection, inlay hints, memory-usage reporting and the legacy
//! semantic-highlighting token stream.
//!
//! The host client owns transport and UI; this crate owns the
//! capability-gated feature lifecycle, the custom request/notification
//! schemas, the binary semantic-token codec, and the single-flight
//! request discipline for per-document requests.

pub mod config;
pub mod error;
pub mod features;
pub mod infra;
pub mod models;
pub mod session;

pub use error::{DecodeError, ExtensionError, ExtensionResult, LspError, TeardownError};

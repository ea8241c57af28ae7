//! Capability-gated clangd features
//!
//! Each vendor extension is a closed tagged variant with its own
//! activation predicate, dispatched from a single table keyed by
//! capability name. The gate runs the table once per session against the
//! capability snapshot and owns the resulting lifecycles.

pub mod ast;
pub mod file_status;
pub mod gate;
pub mod inlay_hints;
pub mod memory_usage;
pub mod reload;
pub mod semantic_highlighting;

pub use ast::AstFeature;
pub use file_status::FileStatusTracker;
pub use gate::{ActiveFeature, CapabilityGate};
pub use inlay_hints::{InlayHint, InlayHintKind, InlayHintsFeature};
pub use memory_usage::MemoryUsageFeature;
pub use reload::{ConfigReloadFeature, ReloadCoordinator, ReloadReason, SessionHost, SessionState};
pub use semantic_highlighting::SemanticHighlightingFeature;

use crate::infra::protocol::ServerCapabilities;

/// The closed set of capability-gated features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Ast,
    InlayHints,
    MemoryUsage,
    SemanticHighlighting,
    ConfigReload,
}

impl FeatureKind {
    /// Activation order. Disposal runs in reverse.
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::Ast,
        FeatureKind::InlayHints,
        FeatureKind::MemoryUsage,
        FeatureKind::SemanticHighlighting,
        FeatureKind::ConfigReload,
    ];

    /// The capability key this feature is gated on.
    pub fn capability_key(self) -> &'static str {
        match self {
            Self::Ast => "astProvider",
            Self::InlayHints => "clangdInlayHintsProvider",
            Self::MemoryUsage => "memoryUsageProvider",
            Self::SemanticHighlighting => "semanticHighlighting",
            Self::ConfigReload => "compilationDatabase.automaticReload",
        }
    }

    /// Pure activation predicate over the capability snapshot.
    ///
    /// Two non-obvious cases: the vendor inlay-hints path is suppressed
    /// whenever the server also advertises standard LSP 3.17 inlay hints
    /// (the generic client handles those; the standard path wins), and
    /// client-side config watching is suppressed when the server reloads
    /// its own configuration.
    pub fn should_activate(self, caps: &ServerCapabilities) -> bool {
        match self {
            Self::InlayHints => {
                caps.advertises(self.capability_key()) && !caps.advertises("inlayHintProvider")
            }
            Self::ConfigReload => !caps.advertises(self.capability_key()),
            _ => caps.advertises(self.capability_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_standard_inlay_hints_win() {
        let both = ServerCapabilities::new(json!({
            "inlayHintProvider": true,
            "clangdInlayHintsProvider": true,
        }));
        assert!(!FeatureKind::InlayHints.should_activate(&both));

        let vendor_only = ServerCapabilities::new(json!({
            "clangdInlayHintsProvider": true,
        }));
        assert!(FeatureKind::InlayHints.should_activate(&vendor_only));
    }

    #[test]
    fn test_config_reload_suppressed_by_automatic_reload() {
        let server_side = ServerCapabilities::new(json!({
            "compilationDatabase": { "automaticReload": true }
        }));
        assert!(!FeatureKind::ConfigReload.should_activate(&server_side));

        let legacy = ServerCapabilities::new(json!({}));
        assert!(FeatureKind::ConfigReload.should_activate(&legacy));
    }

    #[test]
    fn test_unadvertised_features_skip() {
        let caps = ServerCapabilities::new(json!({ "astProvider": true }));
        assert!(FeatureKind::Ast.should_activate(&caps));
        assert!(!FeatureKind::MemoryUsage.should_activate(&caps));
        assert!(!FeatureKind::SemanticHighlighting.should_activate(&caps));
    }
}

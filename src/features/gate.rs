//! Capability gate
//!
//! Runs the feature table once against the capability snapshot taken at
//! session start, activating each advertised feature exactly once, and
//! owns the resulting lifecycles. Disposal runs in reverse activation
//! order; a failing disposer is logged and isolated so it cannot block
//! the teardown of its siblings.

use std::sync::Arc;

use super::FeatureKind;
use super::ast::AstFeature;
use super::inlay_hints::InlayHintsFeature;
use super::memory_usage::MemoryUsageFeature;
use super::reload::ConfigReloadFeature;
use super::semantic_highlighting::SemanticHighlightingFeature;
use crate::config::ExtensionOptions;
use crate::error::TeardownError;
use crate::infra::pipeline::RequestPipeline;
use crate::infra::protocol::ServerCapabilities;
use crate::infra::transport::LspTransport;

/// An activated feature and its runtime state. Closed set: dispatch is by
/// variant, not by trait object.
pub enum ActiveFeature<T: ?Sized> {
    Ast(AstFeature<T>),
    InlayHints(InlayHintsFeature<T>),
    MemoryUsage(MemoryUsageFeature<T>),
    SemanticHighlighting(SemanticHighlightingFeature),
    ConfigReload(ConfigReloadFeature),
}

impl<T: LspTransport + ?Sized> ActiveFeature<T> {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Ast(_) => FeatureKind::Ast,
            Self::InlayHints(_) => FeatureKind::InlayHints,
            Self::MemoryUsage(_) => FeatureKind::MemoryUsage,
            Self::SemanticHighlighting(_) => FeatureKind::SemanticHighlighting,
            Self::ConfigReload(_) => FeatureKind::ConfigReload,
        }
    }

    fn dispose(&mut self) -> Result<(), TeardownError> {
        match self {
            Self::Ast(f) => f.dispose(),
            Self::InlayHints(f) => f.dispose(),
            Self::MemoryUsage(f) => f.dispose(),
            Self::SemanticHighlighting(f) => f.dispose(),
            Self::ConfigReload(f) => f.dispose(),
        }
    }
}

/// Session-scoped owner of the activated features.
pub struct CapabilityGate<T: ?Sized> {
    active: Vec<ActiveFeature<T>>,
    disposed: bool,
}

impl<T: LspTransport + ?Sized> CapabilityGate<T> {
    /// Run the activation table against the snapshot. Features the server
    /// does not advertise are skipped silently; each advertised feature is
    /// activated at most once.
    pub fn negotiate(
        capabilities: &ServerCapabilities,
        pipeline: Arc<RequestPipeline<T>>,
        options: &ExtensionOptions,
    ) -> Self {
        let mut active = Vec::new();
        for kind in FeatureKind::ALL {
            if !kind.should_activate(capabilities) {
                tracing::debug!(?kind, key = kind.capability_key(), "feature not activated");
                continue;
            }
            let feature = match kind {
                FeatureKind::Ast => {
                    Some(ActiveFeature::Ast(AstFeature::new(Arc::clone(&pipeline))))
                }
                FeatureKind::InlayHints => Some(ActiveFeature::InlayHints(InlayHintsFeature::new(
                    Arc::clone(&pipeline),
                ))),
                FeatureKind::MemoryUsage => Some(ActiveFeature::MemoryUsage(
                    MemoryUsageFeature::new(Arc::clone(&pipeline), options.memory_report.clone()),
                )),
                FeatureKind::SemanticHighlighting => match capabilities.scope_table() {
                    Some(table) => Some(ActiveFeature::SemanticHighlighting(
                        SemanticHighlightingFeature::new(table),
                    )),
                    None => {
                        tracing::warn!("semanticHighlighting advertised without a scope table");
                        None
                    }
                },
                FeatureKind::ConfigReload => {
                    Some(ActiveFeature::ConfigReload(ConfigReloadFeature::new()))
                }
            };
            if let Some(feature) = feature {
                tracing::debug!(?kind, "feature activated");
                active.push(feature);
            }
        }
        Self {
            active,
            disposed: false,
        }
    }

    pub fn is_active(&self, kind: FeatureKind) -> bool {
        self.active.iter().any(|f| f.kind() == kind)
    }

    pub fn active_kinds(&self) -> Vec<FeatureKind> {
        self.active.iter().map(ActiveFeature::kind).collect()
    }

    pub fn ast(&self) -> Option<&AstFeature<T>> {
        self.active.iter().find_map(|f| match f {
            ActiveFeature::Ast(a) => Some(a),
            _ => None,
        })
    }

    pub fn inlay_hints(&self) -> Option<&InlayHintsFeature<T>> {
        self.active.iter().find_map(|f| match f {
            ActiveFeature::InlayHints(h) => Some(h),
            _ => None,
        })
    }

    pub fn memory_usage(&self) -> Option<&MemoryUsageFeature<T>> {
        self.active.iter().find_map(|f| match f {
            ActiveFeature::MemoryUsage(m) => Some(m),
            _ => None,
        })
    }

    pub fn semantic_highlighting(&self) -> Option<&SemanticHighlightingFeature> {
        self.active.iter().find_map(|f| match f {
            ActiveFeature::SemanticHighlighting(s) => Some(s),
            _ => None,
        })
    }

    pub fn config_reload(&self) -> Option<&ConfigReloadFeature> {
        self.active.iter().find_map(|f| match f {
            ActiveFeature::ConfigReload(r) => Some(r),
            _ => None,
        })
    }

    /// Dispose every active feature exactly once, in reverse activation
    /// order. Individual failures are logged and do not stop the rest.
    /// Returns the number of failed disposals.
    pub fn dispose(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        self.disposed = true;

        let mut failures = 0;
        for feature in self.active.iter_mut().rev() {
            if let Err(e) = feature.dispose() {
                failures += 1;
                tracing::warn!("{e}");
            }
        }
        self.active.clear();
        failures
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infra::transport::mock::MockTransport;

    fn gate_for(caps: serde_json::Value) -> CapabilityGate<MockTransport> {
        let pipeline = Arc::new(RequestPipeline::new(Arc::new(MockTransport::new())));
        CapabilityGate::negotiate(
            &ServerCapabilities::new(caps),
            pipeline,
            &ExtensionOptions::default(),
        )
    }

    #[test]
    fn test_activates_only_advertised_features() {
        let gate = gate_for(json!({
            "astProvider": true,
            "memoryUsageProvider": {},
        }));
        assert!(gate.ast().is_some());
        assert!(gate.memory_usage().is_some());
        assert!(gate.inlay_hints().is_none());
        assert!(gate.semantic_highlighting().is_none());
        // No automaticReload advertised, so client-side watching is on.
        assert!(gate.config_reload().is_some());
    }

    #[test]
    fn test_standard_inlay_hints_suppress_vendor_path() {
        let gate = gate_for(json!({
            "inlayHintProvider": true,
            "clangdInlayHintsProvider": true,
        }));
        assert!(gate.inlay_hints().is_none());

        let gate = gate_for(json!({ "clangdInlayHintsProvider": true }));
        assert!(gate.inlay_hints().is_some());
    }

    #[test]
    fn test_semantic_highlighting_needs_scope_table() {
        let gate = gate_for(json!({ "semanticHighlighting": true }));
        assert!(gate.semantic_highlighting().is_none());

        let gate = gate_for(json!({
            "semanticHighlighting": { "scopes": [["variable.other.cpp"]] }
        }));
        let feature = gate.semantic_highlighting().unwrap();
        assert_eq!(feature.scope_table().len(), 1);
    }

    #[test]
    fn test_dispose_runs_once_and_isolates_failures() {
        let mut gate = gate_for(json!({
            "astProvider": true,
            "memoryUsageProvider": true,
        }));
        // Force one feature to fail teardown by disposing it out of band.
        if let Some(ActiveFeature::Ast(ast)) = gate
            .active
            .iter_mut()
            .find(|f| f.kind() == FeatureKind::Ast)
        {
            ast.dispose().unwrap();
        }

        // The failing disposer is isolated; the others still ran.
        assert_eq!(gate.dispose(), 1);
        assert!(gate.active_kinds().is_empty());
        // Exactly once: a second dispose is a no-op.
        assert_eq!(gate.dispose(), 0);
    }
}

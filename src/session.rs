//! Session ownership
//!
//! One `ClangdSession` per capability negotiation: it owns the gate, the
//! request pipeline, the file-status tracker and an arena of host-side
//! disposables (commands, providers, watchers the host registered for
//! this session). Reload drains the arena instead of tracing object
//! graphs.

use std::sync::Arc;

use crate::config::ExtensionOptions;
use crate::error::{LspError, TeardownError};
use crate::features::ast::AstFeature;
use crate::features::file_status::FileStatusTracker;
use crate::features::gate::CapabilityGate;
use crate::features::inlay_hints::InlayHintsFeature;
use crate::features::memory_usage::MemoryUsageFeature;
use crate::features::reload::ConfigReloadFeature;
use crate::features::semantic_highlighting::SemanticHighlightingFeature;
use crate::infra::pipeline::RequestPipeline;
use crate::infra::protocol::{
    FileStatus, ServerCapabilities, SwitchSourceHeaderParams, SwitchSourceHeaderRequest,
    SymbolDetails, SymbolInfoRequest, TextDocumentIdentifier, TextDocumentPositionParams,
};
use crate::infra::transport::LspTransport;
use crate::models::lsp::Position;

/// Anything the host hands the session for releasing at reload time.
pub trait Disposable: Send {
    fn dispose(&mut self) -> Result<(), TeardownError>;
}

/// Handle into the session disposables arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisposableHandle(usize);

/// Arena of session-owned disposables. Appended to during negotiation,
/// drained during reload; a drain that triggers another drain (a disposer
/// calling back into the session) is ignored instead of recursing.
#[derive(Default)]
pub struct SessionResources {
    slots: Vec<Option<Box<dyn Disposable>>>,
    draining: bool,
}

impl SessionResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, disposable: Box<dyn Disposable>) -> DisposableHandle {
        let handle = DisposableHandle(self.slots.len());
        self.slots.push(Some(disposable));
        handle
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispose everything in reverse registration order. Failures are
    /// logged and isolated. Returns the number of failed disposals.
    pub fn drain(&mut self) -> usize {
        if self.draining {
            tracing::warn!("re-entrant resource drain ignored");
            return 0;
        }
        self.draining = true;

        let mut failures = 0;
        for slot in self.slots.iter_mut().rev() {
            if let Some(mut disposable) = slot.take()
                && let Err(e) = disposable.dispose()
            {
                failures += 1;
                tracing::warn!("{e}");
            }
        }
        self.slots.clear();
        self.draining = false;
        failures
    }
}

/// A negotiated session against one running server instance.
pub struct ClangdSession<T: ?Sized> {
    capabilities: ServerCapabilities,
    pipeline: Arc<RequestPipeline<T>>,
    gate: CapabilityGate<T>,
    resources: SessionResources,
    file_status: FileStatusTracker,
}

impl<T: LspTransport + ?Sized> ClangdSession<T> {
    /// Take the one-time capability snapshot and activate the supported
    /// features.
    pub fn negotiate(
        capabilities: ServerCapabilities,
        transport: Arc<T>,
        options: &ExtensionOptions,
    ) -> Self {
        let pipeline = Arc::new(RequestPipeline::new(transport));
        let gate = CapabilityGate::negotiate(&capabilities, Arc::clone(&pipeline), options);
        Self {
            capabilities,
            pipeline,
            gate,
            resources: SessionResources::new(),
            file_status: FileStatusTracker::new(),
        }
    }

    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    pub fn ast(&self) -> Option<&AstFeature<T>> {
        self.gate.ast()
    }

    pub fn inlay_hints(&self) -> Option<&InlayHintsFeature<T>> {
        self.gate.inlay_hints()
    }

    pub fn memory_usage(&self) -> Option<&MemoryUsageFeature<T>> {
        self.gate.memory_usage()
    }

    pub fn semantic_highlighting(&self) -> Option<&SemanticHighlightingFeature> {
        self.gate.semantic_highlighting()
    }

    pub fn config_reload(&self) -> Option<&ConfigReloadFeature> {
        self.gate.config_reload()
    }

    pub fn resources_mut(&mut self) -> &mut SessionResources {
        &mut self.resources
    }

    /// Entry point for the host's file-status notification handler.
    pub fn on_file_status(&mut self, status: FileStatus) {
        self.file_status.on_file_updated(status);
    }

    pub fn file_status(&self) -> &FileStatusTracker {
        &self.file_status
    }

    /// `textDocument/switchSourceHeader`: the corresponding header/source
    /// URI, or `None` when the server found no counterpart.
    pub async fn switch_source_header(&self, uri: &str) -> Result<Option<String>, LspError> {
        self.pipeline
            .request_once::<SwitchSourceHeaderRequest>(SwitchSourceHeaderParams {
                text_document: TextDocumentIdentifier::new(uri),
            })
            .await
    }

    /// `textDocument/symbolInfo`: details for the symbol under a position.
    pub async fn symbol_info(
        &self,
        uri: &str,
        position: Position,
    ) -> Result<Vec<SymbolDetails>, LspError> {
        self.pipeline
            .request_once::<SymbolInfoRequest>(TextDocumentPositionParams {
                text_document: TextDocumentIdentifier::new(uri),
                position,
            })
            .await
    }

    /// Tear the whole session down: features in reverse activation order,
    /// then host disposables, then the status map.
    pub fn dispose(&mut self) {
        self.gate.dispose();
        self.resources.drain();
        self.file_status.clear();
    }
}

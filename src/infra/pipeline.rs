//! Single-flight request pipeline
//!
//! Per-document, per-kind request issuance with supersession: at most one
//! outstanding request per `(document, kind)` key. Issuing a new request
//! cancels the previous one without awaiting it, and a response arriving
//! for a superseded request is discarded rather than delivered. This keeps
//! rendering in issue order during rapid typing.
//!
//! Cancellation tokens are replaced by per-key generation counters: each
//! issued request captures the generation it was given; on completion the
//! captured value is compared against the key's latest and stale results
//! are dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use super::protocol::{ExtensionRequest, RequestId};
use super::transport::LspTransport;
use crate::error::LspError;

/// The per-document request families that go through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Ast,
    InlayHints,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub uri: String,
    pub kind: RequestKind,
}

impl RequestKey {
    pub fn new(uri: impl Into<String>, kind: RequestKind) -> Self {
        Self {
            uri: uri.into(),
            kind,
        }
    }
}

/// Outcome of an issued request.
///
/// `Superseded` covers both a stale response (a newer request was issued
/// for the same key while this one was in flight) and a cancelled one;
/// neither is user-visible. Transport failures of the current request are
/// returned as errors instead.
#[derive(Debug)]
pub enum Delivery<R> {
    Completed(R),
    Superseded,
}

impl<R> Delivery<R> {
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Per-key issuance state. The generation is monotonic for the lifetime
/// of the pipeline: entries survive completion, otherwise a slow response
/// issued under an old generation could collide with a fresh request that
/// restarted the count.
#[derive(Debug, Default)]
struct KeyState {
    generation: u64,
    inflight: Option<RequestId>,
}

/// Single-flight issuer over the host transport.
pub struct RequestPipeline<T: ?Sized> {
    transport: Arc<T>,
    next_id: AtomicU64,
    keys: Mutex<HashMap<RequestKey, KeyState>>,
}

impl<T: LspTransport + ?Sized> RequestPipeline<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
            keys: Mutex::new(HashMap::new()),
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Issue `R` for a document, cancelling and superseding any request of
    /// the same kind still in flight for it. At most one `Completed`
    /// delivery per generation.
    pub async fn issue<R: ExtensionRequest>(
        &self,
        uri: &str,
        kind: RequestKind,
        params: R::Params,
    ) -> Result<Delivery<R::Result>, LspError> {
        let params = serde_json::to_value(params)?;
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        let key = RequestKey::new(uri, kind);

        let generation = {
            let mut keys = self.keys.lock().await;
            let state = keys.entry(key.clone()).or_default();
            state.generation += 1;
            if let Some(previous) = state.inflight.replace(id.clone()) {
                tracing::debug!(uri, ?kind, "superseding in-flight request {:?}", previous);
                // Signal only; never await the superseded request.
                self.transport.cancel(&previous);
            }
            state.generation
        };

        tracing::trace!(uri, ?kind, method = R::METHOD, "-> request {:?}", id);
        let result = self.transport.request(id, R::METHOD, params).await;

        let still_current = {
            let mut keys = self.keys.lock().await;
            match keys.get_mut(&key) {
                Some(state) if state.generation == generation => {
                    state.inflight = None;
                    true
                }
                _ => false,
            }
        };

        if !still_current {
            return Ok(Delivery::Superseded);
        }
        match result {
            Ok(value) => Ok(Delivery::Completed(serde_json::from_value(value)?)),
            Err(e) if e.is_cancelled() => Ok(Delivery::Superseded),
            Err(e) => Err(e),
        }
    }

    /// One-shot request outside the single-flight discipline, for calls
    /// that are not tied to a document (memory usage, switch source/header,
    /// symbol info).
    pub async fn request_once<R: ExtensionRequest>(
        &self,
        params: R::Params,
    ) -> Result<R::Result, LspError> {
        let params = serde_json::to_value(params)?;
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::trace!(method = R::METHOD, "-> request {:?}", id);
        let value = self.transport.request(id, R::METHOD, params).await?;
        Ok(serde_json::from_value(value)?)
    }
}

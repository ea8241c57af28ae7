//! Transport seam
//!
//! The host client owns JSON-RPC framing and dispatch; this trait is the
//! narrow surface the extension layer needs from it. Request ids are
//! allocated by the caller so that an in-flight request can be cancelled
//! by id without waiting for it.

use async_trait::async_trait;
use serde_json::Value;

use super::protocol::RequestId;
use crate::error::LspError;

#[async_trait]
pub trait LspTransport: Send + Sync {
    /// Send a request and resolve with the server's reply. A reply that
    /// arrives after `cancel(id)` was signalled may resolve with
    /// `LspError::RequestCancelled` instead.
    async fn request(
        &self,
        id: RequestId,
        method: &str,
        params: Value,
    ) -> Result<Value, LspError>;

    /// Signal cancellation of an in-flight request (`$/cancelRequest`).
    /// Cooperative: the server may still complete the work; callers must
    /// treat the eventual response as a no-op.
    fn cancel(&self, id: &RequestId);
}

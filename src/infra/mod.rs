//! Infrastructure layer for clangd-ext
//!
//! The protocol extension schemas, the transport seam the host client
//! plugs into, and the single-flight request pipeline built on top of it.

pub mod pipeline;
pub mod protocol;
pub mod transport;

pub use pipeline::{Delivery, RequestKey, RequestKind, RequestPipeline};
pub use protocol::{ExtensionRequest, RequestId, ResponseError, ServerCapabilities};
pub use transport::LspTransport;

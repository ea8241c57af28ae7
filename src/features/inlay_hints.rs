//! Vendor inlay hints feature (`clangd/inlayHints`)
//!
//! Pre-LSP-3.17 servers expose inlay hints through this custom request.
//! When the server also advertises the standard `inlayHintProvider`, the
//! generic client path handles hints and this feature stays inactive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{LspError, TeardownError};
use crate::features::FeatureKind;
use crate::infra::pipeline::{Delivery, RequestKind, RequestPipeline};
use crate::infra::protocol::{
    InlayHintsParams, InlayHintsRequest, TextDocumentIdentifier, WireInlayHint,
};
use crate::infra::transport::LspTransport;
use crate::models::lsp::{Position, Range};

/// Standard LSP inlay hint kind (numeric on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum InlayHintKind {
    Type = 1,
    Parameter = 2,
}

impl InlayHintKind {
    /// clangd sends kinds as strings; anything it invents later maps to
    /// no kind rather than a guess.
    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "type" => Some(Self::Type),
            "parameter" => Some(Self::Parameter),
            _ => None,
        }
    }
}

/// Display-ready inlay hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlayHint {
    pub position: Position,
    pub kind: Option<InlayHintKind>,
    pub label: String,
    pub padding_left: bool,
    pub padding_right: bool,
}

/// Old servers omit `position`; fall back to the range start. Padding is
/// carried by whitespace in the wire label, which is trimmed for display.
fn decode_hint(wire: WireInlayHint) -> InlayHint {
    InlayHint {
        position: wire.position.unwrap_or(wire.range.start),
        kind: InlayHintKind::from_wire(&wire.kind),
        label: wire.label.trim().to_string(),
        padding_left: wire.label.starts_with(' '),
        padding_right: wire.label.ends_with(' '),
    }
}

pub struct InlayHintsFeature<T: ?Sized> {
    pipeline: Arc<RequestPipeline<T>>,
    disposed: AtomicBool,
}

impl<T: LspTransport + ?Sized> InlayHintsFeature<T> {
    pub fn new(pipeline: Arc<RequestPipeline<T>>) -> Self {
        Self {
            pipeline,
            disposed: AtomicBool::new(false),
        }
    }

    /// Request hints for a document (optionally restricted to a range),
    /// superseding any hint request still in flight for it.
    pub async fn hints(
        &self,
        uri: &str,
        range: Option<Range>,
    ) -> Result<Delivery<Vec<InlayHint>>, LspError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(LspError::NotConnected);
        }
        let params = InlayHintsParams {
            text_document: TextDocumentIdentifier::new(uri),
            range,
        };
        let delivery = self
            .pipeline
            .issue::<InlayHintsRequest>(uri, RequestKind::InlayHints, params)
            .await?;
        Ok(match delivery {
            Delivery::Completed(wire) => {
                Delivery::Completed(wire.into_iter().map(decode_hint).collect())
            }
            Delivery::Superseded => Delivery::Superseded,
        })
    }

    pub(crate) fn dispose(&mut self) -> Result<(), TeardownError> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(TeardownError::new(FeatureKind::InlayHints, "already disposed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infra::transport::mock::MockTransport;

    #[test]
    fn test_decode_hint_padding_and_trim() {
        let wire = WireInlayHint {
            range: Range::point(Position::new(2, 8)),
            position: None,
            kind: "type".to_string(),
            label: " : int".to_string(),
        };
        let hint = decode_hint(wire);
        assert_eq!(hint.position, Position::new(2, 8));
        assert_eq!(hint.kind, Some(InlayHintKind::Type));
        assert_eq!(hint.label, ": int");
        assert!(hint.padding_left);
        assert!(!hint.padding_right);
    }

    #[test]
    fn test_unknown_kind_maps_to_none() {
        assert_eq!(InlayHintKind::from_wire("designator"), None);
        assert_eq!(InlayHintKind::from_wire("parameter"), Some(InlayHintKind::Parameter));
    }

    #[tokio::test]
    async fn test_hints_request() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            "clangd/inlayHints",
            json!([
                {
                    "range": { "start": {"line": 0, "character": 10}, "end": {"line": 0, "character": 10} },
                    "kind": "parameter",
                    "label": "count: "
                }
            ]),
        );
        let feature = InlayHintsFeature::new(Arc::new(RequestPipeline::new(transport)));

        let hints = feature
            .hints("file:///a.cpp", None)
            .await
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].label, "count:");
        assert!(hints[0].padding_right);
        assert_eq!(hints[0].kind, Some(InlayHintKind::Parameter));
    }
}

//! AST dump feature (`textDocument/ast`)
//!
//! Active when the server advertises `astProvider`. Dumps go through the
//! single-flight pipeline so that a rapid series of selections only ever
//! renders the newest tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{LspError, TeardownError};
use crate::features::FeatureKind;
use crate::infra::pipeline::{Delivery, RequestKind, RequestPipeline};
use crate::infra::protocol::{AstParams, AstRequest, TextDocumentIdentifier};
use crate::infra::transport::LspTransport;
use crate::models::ast::AstTree;
use crate::models::lsp::Range;

pub struct AstFeature<T: ?Sized> {
    pipeline: Arc<RequestPipeline<T>>,
    disposed: AtomicBool,
}

impl<T: LspTransport + ?Sized> AstFeature<T> {
    pub fn new(pipeline: Arc<RequestPipeline<T>>) -> Self {
        Self {
            pipeline,
            disposed: AtomicBool::new(false),
        }
    }

    /// Request the AST covering `range`, superseding any dump still in
    /// flight for the same document. `Completed(None)` means the server
    /// found no node at the selection.
    pub async fn dump(
        &self,
        uri: &str,
        range: Range,
    ) -> Result<Delivery<Option<AstTree>>, LspError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(LspError::NotConnected);
        }
        let params = AstParams {
            text_document: TextDocumentIdentifier::new(uri),
            range,
        };
        let delivery = self
            .pipeline
            .issue::<AstRequest>(uri, RequestKind::Ast, params)
            .await?;
        Ok(match delivery {
            Delivery::Completed(node) => Delivery::Completed(node.map(AstTree::from_wire)),
            Delivery::Superseded => Delivery::Superseded,
        })
    }

    pub(crate) fn dispose(&mut self) -> Result<(), TeardownError> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(TeardownError::new(FeatureKind::Ast, "already disposed"));
        }
        Ok(())
    }
}

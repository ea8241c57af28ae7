//! Memory usage feature (`$/memoryUsage`)
//!
//! Normalizes the recursive wire tree the server returns and renders the
//! flat report. The wire side is a JSON object where `_self`/`_total` are
//! reserved byte counts and every other key is a child subtree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use crate::config::MemoryReportOptions;
use crate::error::{LspError, TeardownError};
use crate::features::FeatureKind;
use crate::infra::pipeline::RequestPipeline;
use crate::infra::protocol::{MemoryUsageParams, MemoryUsageRequest};
use crate::infra::transport::LspTransport;
use crate::models::memory::MemoryTreeNode;

/// Title given to the wire root, which carries no name of its own.
const ROOT_TITLE: &str = "<root>";

/// Normalize a wire subtree. Reserved `_self`/`_total` become byte
/// counts; every other own key is a child, recursed with its key as the
/// title. Keys are sorted before recursion so that the descending-total
/// sort breaks ties alphabetically. Idempotent over the same wire value.
pub fn normalize(wire: &Value, title: &str) -> MemoryTreeNode {
    let total = wire.get("_total").and_then(Value::as_u64).unwrap_or(0);
    let self_bytes = wire.get("_self").and_then(Value::as_u64).unwrap_or(0);

    let mut keys: Vec<&String> = wire
        .as_object()
        .map(|object| object.keys().filter(|k| !k.starts_with('_')).collect())
        .unwrap_or_default();
    keys.sort();

    let mut children: Vec<MemoryTreeNode> = keys
        .into_iter()
        .map(|key| match &wire[key] {
            // A bare number is a leaf entry.
            Value::Number(n) => MemoryTreeNode {
                title: key.clone(),
                total: n.as_u64().unwrap_or(0),
                self_bytes: n.as_u64().unwrap_or(0),
                is_file: is_file_title(key),
                children: Vec::new(),
            },
            child => normalize(child, key),
        })
        .collect();
    // Stable sort: equal totals keep the alphabetical key order.
    children.sort_by(|a, b| b.total.cmp(&a.total));

    MemoryTreeNode {
        title: title.to_string(),
        total,
        self_bytes,
        is_file: is_file_title(title),
        children,
    }
}

fn is_file_title(title: &str) -> bool {
    title.contains('/') || title.contains('\\')
}

/// Render the flat report: depth-first pre-order, printing the configured
/// root label as a header line and the configured interesting subsystems
/// as ` └ ` entries. Everything else is traversed but not printed.
pub fn format_report(tree: &MemoryTreeNode, options: &MemoryReportOptions) -> Vec<String> {
    let mut lines = Vec::new();
    walk(tree, options, &mut lines);
    lines
}

fn walk(node: &MemoryTreeNode, options: &MemoryReportOptions, lines: &mut Vec<String>) {
    let msg = format!("{} {:.2} MB", node.title, node.total_mb());
    if node.title == options.root_label {
        lines.push(msg);
    } else if options.interesting.iter().any(|t| *t == node.title) {
        lines.push(format!(" └ {msg}"));
    }
    for child in &node.children {
        walk(child, options, lines);
    }
}

pub struct MemoryUsageFeature<T: ?Sized> {
    pipeline: Arc<RequestPipeline<T>>,
    report: MemoryReportOptions,
    disposed: AtomicBool,
}

impl<T: LspTransport + ?Sized> MemoryUsageFeature<T> {
    pub fn new(pipeline: Arc<RequestPipeline<T>>, report: MemoryReportOptions) -> Self {
        Self {
            pipeline,
            report,
            disposed: AtomicBool::new(false),
        }
    }

    /// Fetch and normalize the current snapshot.
    pub async fn usage(&self) -> Result<MemoryTreeNode, LspError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(LspError::NotConnected);
        }
        let wire = self
            .pipeline
            .request_once::<MemoryUsageRequest>(MemoryUsageParams {})
            .await?;
        Ok(normalize(&wire, ROOT_TITLE))
    }

    /// Fetch a snapshot and render the flat report.
    pub async fn report(&self) -> Result<Vec<String>, LspError> {
        Ok(format_report(&self.usage().await?, &self.report))
    }

    pub(crate) fn dispose(&mut self) -> Result<(), TeardownError> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(TeardownError::new(FeatureKind::MemoryUsage, "already disposed"));
        }
        Ok(())
    }
}

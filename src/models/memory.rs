//! Memory usage tree
//!
//! Normalized form of the `$/memoryUsage` wire tree. The wire side is a
//! plain JSON object where `_self`/`_total` are reserved byte counts and
//! every other key is a child subtree.

/// A normalized node of the server's memory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTreeNode {
    pub title: String,
    /// Bytes attributed to this node and all its children.
    pub total: u64,
    /// Bytes attributed to this node alone.
    pub self_bytes: u64,
    /// Titles containing a path separator denote per-file entries.
    pub is_file: bool,
    /// Sorted descending by `total`; ties keep alphabetical key order.
    pub children: Vec<MemoryTreeNode>,
}

impl MemoryTreeNode {
    /// Total rendered in megabytes.
    pub fn total_mb(&self) -> f64 {
        self.total as f64 / 1024.0 / 1024.0
    }
}

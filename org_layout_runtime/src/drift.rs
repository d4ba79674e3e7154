//! Drift detection: determinism verification and layout comparison.

use std::collections::BTreeSet;

use serde::Serialize;

use org_layout_engine::hashing::canonical_hash;
use org_layout_engine::{compute_layout, DensityMode, LayoutConfig, LayoutResult, OrgNode};

use crate::error::{Result, RuntimeError};

/// Movements smaller than this are reported as unchanged.
pub const POSITION_TOLERANCE: f64 = 1e-6;

/// Lay out the same input twice and compare canonical hashes.
/// Returns the hash on success.
pub fn verify_determinism(
    root: Option<&OrgNode>,
    zoom_level: f64,
    config: &LayoutConfig,
) -> Result<String> {
    let first = canonical_hash(&compute_layout(root, zoom_level, config)?);
    let second = canonical_hash(&compute_layout(root, zoom_level, config)?);
    if first != second {
        return Err(RuntimeError::Nondeterministic { first, second });
    }
    Ok(first)
}

/// A node present in both layouts whose box moved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeShift {
    pub id: String,
    pub dx: f64,
    pub dy: f64,
}

/// Structured difference between two layouts.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutDrift {
    pub node_count_a: usize,
    pub node_count_b: usize,
    pub mode_a: DensityMode,
    pub mode_b: DensityMode,
    pub hash_a: String,
    pub hash_b: String,
    pub added_nodes: Vec<String>,
    pub removed_nodes: Vec<String>,
    pub moved_nodes: Vec<NodeShift>,
    pub resized_nodes: Vec<String>,
}

impl LayoutDrift {
    pub fn is_identical(&self) -> bool {
        self.hash_a == self.hash_b
    }
}

/// Compare layout `a` (before) with `b` (after).
pub fn compare_layouts(a: &LayoutResult, b: &LayoutResult) -> LayoutDrift {
    let ids_a: BTreeSet<&str> = a.boxes.keys().map(String::as_str).collect();
    let ids_b: BTreeSet<&str> = b.boxes.keys().map(String::as_str).collect();

    let mut moved = Vec::new();
    let mut resized = Vec::new();
    for id in ids_a.intersection(&ids_b) {
        let (ba, bb) = (&a.boxes[*id], &b.boxes[*id]);
        let (dx, dy) = (bb.x - ba.x, bb.y - ba.y);
        if dx.abs() > POSITION_TOLERANCE || dy.abs() > POSITION_TOLERANCE {
            moved.push(NodeShift {
                id: id.to_string(),
                dx,
                dy,
            });
        }
        if (bb.width - ba.width).abs() > POSITION_TOLERANCE
            || (bb.height - ba.height).abs() > POSITION_TOLERANCE
        {
            resized.push(id.to_string());
        }
    }

    LayoutDrift {
        node_count_a: a.len(),
        node_count_b: b.len(),
        mode_a: a.mode,
        mode_b: b.mode,
        hash_a: canonical_hash(a),
        hash_b: canonical_hash(b),
        added_nodes: ids_b.difference(&ids_a).map(|s| s.to_string()).collect(),
        removed_nodes: ids_a.difference(&ids_b).map(|s| s.to_string()).collect(),
        moved_nodes: moved,
        resized_nodes: resized,
    }
}

/// OrgChart Layout v1 - Layout Invariant Checks
///
/// Geometric guarantees every computed layout must satisfy.
/// `try_validate_layout` reports the first failure; `validate_layout`
/// panics on it and is meant for tests and debug builds.

use crate::config::LayoutConfig;
use crate::density::DensityMode;
use crate::domain::{LayoutResult, NodeBox, OrgNode};
use crate::error::{LayoutError, Result};
use crate::layout::level_spacing_for;
use crate::tree::{flatten, FlatTree};

/// Float tolerance for spacing and centering comparisons.
pub const EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every check. Panics on the first failure.
pub fn validate_layout(root: Option<&OrgNode>, layout: &LayoutResult, config: &LayoutConfig) {
    if let Err(e) = try_validate_layout(root, layout, config) {
        panic!("Invariant violation: {}", e);
    }
}

/// Non-panicking variant of `validate_layout`.
pub fn try_validate_layout(
    root: Option<&OrgNode>,
    layout: &LayoutResult,
    config: &LayoutConfig,
) -> Result<()> {
    let root = match root {
        Some(r) => r,
        None => {
            return if layout.is_empty() {
                Ok(())
            } else {
                Err(violation(
                    "node_coverage",
                    format!("empty tree produced {} boxes", layout.len()),
                ))
            };
        }
    };

    let tree = flatten(root)?;
    let boxes = check_node_coverage(&tree, layout)?;
    check_levels(&tree, &boxes, layout.mode, config)?;
    check_parent_child_clearance(&tree, &boxes)?;
    check_sibling_spacing(&tree, &boxes, layout.mode, config)?;
    check_group_spacing(&tree, &boxes, layout.mode, config)?;
    check_parent_centering(&tree, &boxes)?;
    check_dense_width(&boxes, layout.mode, config)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn violation(check: &'static str, detail: String) -> LayoutError {
    LayoutError::InvariantViolation { check, detail }
}

/// Every tree node has exactly one box and there are no extras.
/// Returns the boxes in arena order.
fn check_node_coverage(tree: &FlatTree<'_>, layout: &LayoutResult) -> Result<Vec<NodeBox>> {
    if tree.len() != layout.len() {
        return Err(violation(
            "node_coverage",
            format!("tree has {} nodes, layout has {} boxes", tree.len(), layout.len()),
        ));
    }
    tree.nodes
        .iter()
        .map(|n| {
            layout.get(&n.node.id).copied().ok_or_else(|| {
                violation("node_coverage", format!("node {:?} has no box", n.node.id))
            })
        })
        .collect()
}

/// `y == depth * level` for every node, with the per-pass level.
fn check_levels(
    tree: &FlatTree<'_>,
    boxes: &[NodeBox],
    mode: DensityMode,
    config: &LayoutConfig,
) -> Result<()> {
    let tallest = boxes.iter().map(|b| b.height).fold(0.0, f64::max);
    let level = level_spacing_for(mode, tallest, config);
    for (flat, b) in tree.nodes.iter().zip(boxes) {
        let expected = flat.depth as f64 * level;
        if (b.y - expected).abs() > EPSILON {
            return Err(violation(
                "level_spacing",
                format!("node {:?} at y={} expected {}", flat.node.id, b.y, expected),
            ));
        }
    }
    Ok(())
}

/// No child starts above its parent's bottom edge.
fn check_parent_child_clearance(tree: &FlatTree<'_>, boxes: &[NodeBox]) -> Result<()> {
    for (idx, flat) in tree.nodes.iter().enumerate() {
        if let Some(p) = flat.parent {
            let (parent, child) = (&boxes[p], &boxes[idx]);
            if child.y < parent.bottom() - EPSILON {
                return Err(violation(
                    "parent_child_overlap",
                    format!(
                        "node {:?} starts at y={} inside parent {:?} ending at {}",
                        flat.node.id,
                        child.y,
                        tree.nodes[p].node.id,
                        parent.bottom()
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Adjacent children of one parent are ordered and at least
/// `sibling_spacing` apart.
fn check_sibling_spacing(
    tree: &FlatTree<'_>,
    boxes: &[NodeBox],
    mode: DensityMode,
    config: &LayoutConfig,
) -> Result<()> {
    let gap = config.sibling_spacing(mode);
    for flat in &tree.nodes {
        for pair in flat.children.windows(2) {
            let (a, b) = (&boxes[pair[0]], &boxes[pair[1]]);
            if b.x - a.right() < gap - EPSILON {
                return Err(violation(
                    "sibling_overlap",
                    format!(
                        "siblings {:?} and {:?} under {:?} are {} apart, minimum {}",
                        tree.nodes[pair[0]].node.id,
                        tree.nodes[pair[1]].node.id,
                        flat.node.id,
                        b.x - a.right(),
                        gap
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Adjacent row nodes with different parents are at least
/// `group_spacing` apart.
fn check_group_spacing(
    tree: &FlatTree<'_>,
    boxes: &[NodeBox],
    mode: DensityMode,
    config: &LayoutConfig,
) -> Result<()> {
    let gap = config.group_spacing(mode);
    for row in tree.rows() {
        for pair in row.windows(2) {
            let (l, r) = (&tree.nodes[pair[0]], &tree.nodes[pair[1]]);
            if l.parent == r.parent {
                continue;
            }
            let (a, b) = (&boxes[pair[0]], &boxes[pair[1]]);
            if b.x - a.right() < gap - EPSILON {
                return Err(violation(
                    "group_spacing",
                    format!(
                        "group boundary between {:?} and {:?} is {} wide, minimum {}",
                        l.node.id,
                        r.node.id,
                        b.x - a.right(),
                        gap
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// A parent's center x is the mean of its children's center x.
fn check_parent_centering(tree: &FlatTree<'_>, boxes: &[NodeBox]) -> Result<()> {
    for (idx, flat) in tree.nodes.iter().enumerate() {
        if flat.children.is_empty() {
            continue;
        }
        let mean = flat
            .children
            .iter()
            .map(|&c| boxes[c].center_x())
            .sum::<f64>()
            / flat.children.len() as f64;
        let center = boxes[idx].center_x();
        if (center - mean).abs() > EPSILON {
            return Err(violation(
                "parent_centering",
                format!(
                    "node {:?} centered at {} but children mean is {}",
                    flat.node.id, center, mean
                ),
            ));
        }
    }
    Ok(())
}

/// Dense boxes all share `node_width_dense`.
fn check_dense_width(boxes: &[NodeBox], mode: DensityMode, config: &LayoutConfig) -> Result<()> {
    if mode != DensityMode::Dense {
        return Ok(());
    }
    if let Some(b) = boxes.iter().find(|b| b.width != config.node_width_dense) {
        return Err(violation(
            "dense_width",
            format!("dense box width {} != {}", b.width, config.node_width_dense),
        ));
    }
    Ok(())
}

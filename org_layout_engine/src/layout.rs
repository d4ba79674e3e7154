/// OrgChart Layout v1 - Hierarchical Chart Layout
///
/// Two passes over the flattened arena:
///   1. Bottom-up (reverse pre-order): size every box, then pack each
///      parent's child subtrees left to right against a per-row contour.
///      Same-parent neighbours get sibling spacing; every deeper row
///      gets group spacing, since those neighbours have different parents.
///      The parent is centered on the mean of its children's centers.
///   2. Top-down (pre-order): accumulate relative offsets into absolute
///      centers, emit boxes, shift so the leftmost edge sits at x = 0.
///
/// Rows sit at `y = depth * level`, with one `level` per pass. In dense
/// mode `level` grows to clear the tallest box, so a parent never reaches
/// into its children's row.
///
/// Box sizes depend only on the density mode, never on zoom.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::density::{clamp_zoom, select_density_mode, DensityMode};
use crate::domain::{LayoutResult, NodeBox, OrgNode};
use crate::error::Result;
use crate::sizing::box_size;
use crate::tree::{flatten, FlatTree};

/// Horizontal extent of a subtree per relative depth, measured from the
/// subtree root's center.
#[derive(Debug, Clone, Default)]
struct Contour {
    left: Vec<f64>,
    right: Vec<f64>,
}

impl Contour {
    fn depth(&self) -> usize {
        self.left.len()
    }

    /// Add `other`, whose root center sits at `offset` in this contour's frame.
    fn merge(&mut self, other: &Contour, offset: f64) {
        for d in 0..other.depth() {
            let l = offset + other.left[d];
            let r = offset + other.right[d];
            if d < self.depth() {
                self.left[d] = self.left[d].min(l);
                self.right[d] = self.right[d].max(r);
            } else {
                self.left.push(l);
                self.right.push(r);
            }
        }
    }

    /// Append `forest` one row below this contour, shifted by `offset`.
    ///
    /// Copies the whole forest, so a single deep chain costs O(n * depth).
    /// Org charts are shallow enough that threaded contours aren't worth it.
    fn merge_below(&mut self, forest: &Contour, offset: f64) {
        for d in 0..forest.depth() {
            self.left.push(forest.left[d] + offset);
            self.right.push(forest.right[d] + offset);
        }
    }
}

/// Layout engine bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct HierarchicalChartLayout {
    config: LayoutConfig,
}

impl HierarchicalChartLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `root` for the density mode implied by `zoom_level`.
    pub fn layout(&self, root: Option<&OrgNode>, zoom_level: f64) -> Result<LayoutResult> {
        compute_layout(root, zoom_level, &self.config)
    }

    pub fn layout_for_mode(&self, root: Option<&OrgNode>, mode: DensityMode) -> Result<LayoutResult> {
        compute_layout_for_mode(root, mode, &self.config)
    }
}

/// Compute a layout; density mode is derived once from `zoom_level`.
///
/// The zoom level selects the mode only. Display scaling is applied
/// afterwards by `transform::DisplayTransform`.
pub fn compute_layout(
    root: Option<&OrgNode>,
    zoom_level: f64,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    let zoom = clamp_zoom(zoom_level, config);
    let mode = select_density_mode(zoom, config.zoom_dense_threshold);
    compute_layout_for_mode(root, mode, config)
}

/// Compute a layout for an explicit density mode.
pub fn compute_layout_for_mode(
    root: Option<&OrgNode>,
    mode: DensityMode,
    config: &LayoutConfig,
) -> Result<LayoutResult> {
    config.validate()?;

    let root = match root {
        Some(r) => r,
        None => return Ok(LayoutResult::empty(mode)),
    };

    let tree = flatten(root)?;
    let sizes: Vec<(f64, f64)> = tree
        .nodes
        .iter()
        .map(|n| box_size(&n.node.name, mode, config))
        .collect();

    let offsets = pack_subtrees(&tree, &sizes, mode, config);
    let result = place_boxes(&tree, &sizes, &offsets, mode, config);

    debug!(
        nodes = result.len(),
        mode = mode.as_str(),
        depth = tree.max_depth(),
        "layout computed"
    );
    Ok(result)
}

/// Bottom-up pass. Returns each node's center offset from its parent's
/// center (0.0 for the root).
fn pack_subtrees(
    tree: &FlatTree<'_>,
    sizes: &[(f64, f64)],
    mode: DensityMode,
    config: &LayoutConfig,
) -> Vec<f64> {
    let sibling_gap = config.sibling_spacing(mode);
    let group_gap = config.group_spacing(mode);

    let n = tree.len();
    let mut offsets = vec![0.0; n];
    let mut contours: Vec<Option<Contour>> = vec![None; n];

    // Reverse pre-order: every child is finished before its parent.
    for idx in (0..n).rev() {
        let (width, _) = sizes[idx];
        let half = width / 2.0;
        let children = &tree.nodes[idx].children;

        let mut own = Contour {
            left: vec![-half],
            right: vec![half],
        };

        if children.is_empty() {
            contours[idx] = Some(own);
            continue;
        }

        let mut forest = Contour::default();
        let mut positions: Vec<f64> = Vec::with_capacity(children.len());

        for &child in children {
            let contour = contours[child].take().unwrap_or_default();
            let position = if positions.is_empty() {
                0.0
            } else {
                let shared = forest.depth().min(contour.depth());
                (0..shared)
                    .map(|d| {
                        let gap = if d == 0 { sibling_gap } else { group_gap };
                        forest.right[d] + gap - contour.left[d]
                    })
                    .fold(f64::NEG_INFINITY, f64::max)
            };
            forest.merge(&contour, position);
            positions.push(position);
        }

        let center = positions.iter().sum::<f64>() / positions.len() as f64;
        for (&child, &position) in children.iter().zip(&positions) {
            offsets[child] = position - center;
        }

        own.merge_below(&forest, -center);
        contours[idx] = Some(own);
    }

    offsets
}

/// Vertical distance between rows for one pass.
///
/// Normal boxes have a fixed height, checked against the level spacing by
/// `LayoutConfig::validate`. Dense heights follow the labels, so the level
/// becomes `max(level_spacing_dense, tallest + sibling_spacing_dense)`.
pub fn level_spacing_for(mode: DensityMode, tallest: f64, config: &LayoutConfig) -> f64 {
    match mode {
        DensityMode::Normal => config.level_spacing(mode),
        DensityMode::Dense => config
            .level_spacing(mode)
            .max(tallest + config.sibling_spacing(mode)),
    }
}

/// Top-down pass: absolute centers, then boxes normalised to x >= 0.
fn place_boxes(
    tree: &FlatTree<'_>,
    sizes: &[(f64, f64)],
    offsets: &[f64],
    mode: DensityMode,
    config: &LayoutConfig,
) -> LayoutResult {
    let tallest = sizes.iter().map(|&(_, h)| h).fold(0.0, f64::max);
    let level = level_spacing_for(mode, tallest, config);
    let n = tree.len();

    let mut centers = vec![0.0; n];
    for idx in 0..n {
        if let Some(p) = tree.nodes[idx].parent {
            centers[idx] = centers[p] + offsets[idx];
        }
    }

    let min_left = (0..n)
        .map(|idx| centers[idx] - sizes[idx].0 / 2.0)
        .fold(f64::INFINITY, f64::min);
    let shift = if min_left.is_finite() { -min_left } else { 0.0 };

    let mut boxes = BTreeMap::new();
    for (idx, flat) in tree.nodes.iter().enumerate() {
        let (width, height) = sizes[idx];
        boxes.insert(
            flat.node.id.clone(),
            NodeBox {
                x: centers[idx] - width / 2.0 + shift,
                y: flat.depth as f64 * level,
                width,
                height,
            },
        );
    }

    LayoutResult { mode, boxes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeType;
    use crate::error::LayoutError;

    fn node(id: &str) -> OrgNode {
        OrgNode::new(id, id, NodeType::Department)
    }

    #[test]
    fn test_empty_tree_is_empty_layout() {
        let cfg = LayoutConfig::default();
        let result = compute_layout(None, 100.0, &cfg).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.mode, DensityMode::Normal);
    }

    #[test]
    fn test_single_node_at_origin() {
        let cfg = LayoutConfig::default();
        let result = compute_layout(Some(&node("a")), 100.0, &cfg).unwrap();
        let a = result.get("a").unwrap();
        assert_eq!((a.x, a.y, a.width, a.height), (0.0, 0.0, 180.0, 80.0));
    }

    #[test]
    fn test_two_children_sibling_gap_and_centering() {
        let cfg = LayoutConfig::default();
        let root = node("A").with_child(node("B")).with_child(node("C"));
        let result = compute_layout(Some(&root), 100.0, &cfg).unwrap();
        let (a, b, c) = (
            result.get("A").unwrap(),
            result.get("B").unwrap(),
            result.get("C").unwrap(),
        );
        assert_eq!(b.x, 0.0);
        assert_eq!(c.x - b.right(), 40.0);
        assert_eq!(a.center_x(), (b.center_x() + c.center_x()) / 2.0);
        assert_eq!(b.y, 120.0);
    }

    #[test]
    fn test_cousins_get_group_spacing() {
        let cfg = LayoutConfig::default();
        let root = node("r")
            .with_child(node("p1").with_child(node("a")).with_child(node("b")))
            .with_child(node("p2").with_child(node("c")));
        let result = compute_layout(Some(&root), 100.0, &cfg).unwrap();
        let b = result.get("b").unwrap();
        let c = result.get("c").unwrap();
        assert!(c.x - b.right() >= 80.0 - 1e-9);
        let a = result.get("a").unwrap();
        assert!((b.x - a.right() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_dense_mode_below_threshold() {
        let cfg = LayoutConfig::default();
        let root = node("A").with_child(OrgNode::new("B", "Engineering", NodeType::Team));
        let result = compute_layout(Some(&root), 40.0, &cfg).unwrap();
        assert_eq!(result.mode, DensityMode::Dense);
        let b = result.get("B").unwrap();
        assert_eq!(b.width, cfg.node_width_dense);
        assert_eq!(b.height, 11.0 * 14.0 + 16.0);
        // 170 tall, so rows are 170 + 10 apart instead of 80.
        assert_eq!(b.y, 180.0);
        let a = result.get("A").unwrap();
        assert!(a.bottom() <= b.y);
    }

    #[test]
    fn test_short_dense_labels_keep_configured_level() {
        let cfg = LayoutConfig::default();
        let root = OrgNode::new("A", "HR", NodeType::Department)
            .with_child(OrgNode::new("B", "QA", NodeType::Team));
        let result = compute_layout(Some(&root), 40.0, &cfg).unwrap();
        // Both 60 tall: 60 + 10 < 80.
        assert_eq!(result.get("B").unwrap().y, cfg.level_spacing_dense);
    }

    #[test]
    fn test_long_parent_label_clears_child_row() {
        let cfg = LayoutConfig::default();
        let root = OrgNode::new("A", "Engineering", NodeType::Division)
            .with_child(OrgNode::new("B", "Platform", NodeType::Team));
        let result = compute_layout(Some(&root), 40.0, &cfg).unwrap();
        let (a, b) = (result.get("A").unwrap(), result.get("B").unwrap());
        assert_eq!(a.x, b.x);
        assert!(b.y - a.bottom() >= cfg.sibling_spacing_dense);
    }

    #[test]
    fn test_structural_error_aborts() {
        let cfg = LayoutConfig::default();
        let root = node("a").with_child(node("b").with_child(node("a")));
        assert!(matches!(
            compute_layout(Some(&root), 100.0, &cfg),
            Err(LayoutError::Cycle { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = LayoutConfig {
            node_width_normal: -1.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            compute_layout(Some(&node("a")), 100.0, &cfg),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_struct_and_free_function_agree() {
        let root = node("a").with_child(node("b"));
        let engine = HierarchicalChartLayout::default();
        assert_eq!(
            engine.layout(Some(&root), 100.0).unwrap(),
            compute_layout(Some(&root), 100.0, &LayoutConfig::default()).unwrap()
        );
    }
}

/// OrgChart Layout v1 - Core Domain Types
///
/// Pure data. No layout logic.
/// Coordinates are layout pixels at 100% zoom, origin top-left.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::density::DensityMode;

// ── Tree input ─────────────────────────────────────────────────────

/// Kind of organizational unit a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Company,
    Division,
    Department,
    Team,
    Person,
    JobRole,
}

/// Presentation hints carried through to the renderer. Ignored by layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// One unit of the organization tree. Children are ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children: Vec<OrgNode>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl OrgNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            parent_id: None,
            children: Vec::new(),
            metadata: NodeMetadata::default(),
        }
    }

    /// Append a child, stamping its `parent_id`.
    pub fn with_child(mut self, mut child: OrgNode) -> Self {
        child.parent_id = Some(self.id.clone());
        self.children.push(child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// ── Geometry ───────────────────────────────────────────────────────

/// Bounding box assigned to one node. `x`, `y` are the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Axis-aligned rectangle for viewports and projected output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    pub fn contains_point(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

// ── Layout output ──────────────────────────────────────────────────

/// Complete result of one layout pass.
///
/// Replaced wholesale on every recompute; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub mode: DensityMode,
    pub boxes: BTreeMap<String, NodeBox>,
}

impl LayoutResult {
    pub fn empty(mode: DensityMode) -> Self {
        Self {
            mode,
            boxes: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&NodeBox> {
        self.boxes.get(id)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Bounding rectangle of every box, `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.boxes
            .values()
            .map(NodeBox::to_rect)
            .reduce(|acc, r| acc.union(&r))
    }
}

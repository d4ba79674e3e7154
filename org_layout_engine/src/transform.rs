/// OrgChart Layout v1 - Display Transform
///
/// Zoom is a uniform scale applied to a finished layout at render time.
/// The layout's own boxes are never modified.

use serde::{Deserialize, Serialize};

use crate::domain::{LayoutResult, NodeBox, Rect};

/// `screen = layout * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl DisplayTransform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Pure scale from a zoom percentage (100 -> 1.0).
    pub fn from_zoom(zoom_level: f64) -> Self {
        Self {
            scale: zoom_level / 100.0,
            ..Self::identity()
        }
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub fn apply_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    /// Inverse of `apply_point`. A zero scale has no inverse; every point
    /// maps to the layout origin `(0, 0)`.
    pub fn invert_point(&self, x: f64, y: f64) -> (f64, f64) {
        if self.scale == 0.0 {
            return (0.0, 0.0);
        }
        ((x - self.offset_x) / self.scale, (y - self.offset_y) / self.scale)
    }

    pub fn apply_rect(&self, r: &Rect) -> Rect {
        let (x, y) = self.apply_point(r.x, r.y);
        Rect::new(x, y, r.width * self.scale, r.height * self.scale)
    }

    pub fn apply_box(&self, b: &NodeBox) -> Rect {
        self.apply_rect(&b.to_rect())
    }

    /// Scaled copies of every box, ordered by node id.
    pub fn project(&self, layout: &LayoutResult) -> Vec<(String, Rect)> {
        layout
            .boxes
            .iter()
            .map(|(id, b)| (id.clone(), self.apply_box(b)))
            .collect()
    }
}

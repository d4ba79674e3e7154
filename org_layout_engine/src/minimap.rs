/// OrgChart Layout v1 - Minimap Projection
///
/// Fits the whole layout into a small canvas:
/// `scale = min(canvas_w / bounds_w, canvas_h / bounds_h) * margin_factor`,
/// then centers the scaled bounds inside the canvas.

use serde::{Deserialize, Serialize};

use crate::config::MINIMAP_MARGIN_FACTOR;
use crate::domain::{LayoutResult, Rect};
use crate::error::{LayoutError, Result};
use crate::transform::DisplayTransform;

/// Fixed-size overview canvas. Dimensions are positive and finite; the
/// margin factor is within (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinimapProjector {
    canvas_width: f64,
    canvas_height: f64,
    margin_factor: f64,
}

/// Output of one projection. Node rects are ordered by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimapProjection {
    pub scale: f64,
    pub transform: DisplayTransform,
    pub nodes: Vec<(String, Rect)>,
    pub viewport: Rect,
}

impl MinimapProjector {
    /// Fails on a zero, negative or non-finite canvas size.
    pub fn new(canvas_width: f64, canvas_height: f64) -> Result<Self> {
        for (name, value) in [("width", canvas_width), ("height", canvas_height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::InvalidConfig(format!(
                    "minimap canvas {name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(Self {
            canvas_width,
            canvas_height,
            margin_factor: MINIMAP_MARGIN_FACTOR,
        })
    }

    pub fn with_margin_factor(mut self, margin_factor: f64) -> Result<Self> {
        if !(margin_factor > 0.0 && margin_factor <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "minimap margin factor must be within (0, 1], got {margin_factor}"
            )));
        }
        self.margin_factor = margin_factor;
        Ok(self)
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    pub fn margin_factor(&self) -> f64 {
        self.margin_factor
    }

    /// Layout-space -> canvas transform for `layout`.
    /// An empty or zero-area layout gets scale 1.0 and no offset.
    pub fn transform_for(&self, layout: &LayoutResult) -> DisplayTransform {
        let bounds = match layout.bounds() {
            Some(b) if b.width > 0.0 && b.height > 0.0 => b,
            _ => return DisplayTransform::identity(),
        };

        let scale = (self.canvas_width / bounds.width).min(self.canvas_height / bounds.height)
            * self.margin_factor;

        let offset_x = (self.canvas_width - bounds.width * scale) / 2.0 - bounds.x * scale;
        let offset_y = (self.canvas_height - bounds.height * scale) / 2.0 - bounds.y * scale;

        DisplayTransform {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Project every node and the visible viewport onto the canvas.
    pub fn project(&self, layout: &LayoutResult, viewport: &Rect) -> MinimapProjection {
        let transform = self.transform_for(layout);
        MinimapProjection {
            scale: transform.scale,
            transform,
            nodes: transform.project(layout),
            viewport: transform.apply_rect(viewport),
        }
    }
}

impl MinimapProjection {
    /// Map a canvas click back to layout space, e.g. to recenter the view.
    pub fn to_layout_point(&self, canvas_x: f64, canvas_y: f64) -> (f64, f64) {
        self.transform.invert_point(canvas_x, canvas_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::DensityMode;
    use crate::domain::NodeBox;

    fn layout_of(boxes: &[(&str, NodeBox)]) -> LayoutResult {
        let mut layout = LayoutResult::empty(DensityMode::Normal);
        for (id, b) in boxes {
            layout.boxes.insert(id.to_string(), *b);
        }
        layout
    }

    #[test]
    fn test_scale_uses_tighter_axis_and_margin() {
        let layout = layout_of(&[
            ("a", NodeBox { x: 0.0, y: 0.0, width: 100.0, height: 50.0 }),
            ("b", NodeBox { x: 900.0, y: 150.0, width: 100.0, height: 50.0 }),
        ]);
        // bounds 1000 x 200 into 200 x 100: min(0.2, 0.5) * 0.9
        let proj = MinimapProjector::new(200.0, 100.0).unwrap().project(&layout, &Rect::new(0.0, 0.0, 500.0, 200.0));
        assert!((proj.scale - 0.18).abs() < 1e-12);
        assert_eq!(proj.nodes.len(), 2);
        assert!((proj.viewport.width - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_is_centered() {
        let layout = layout_of(&[("a", NodeBox { x: 0.0, y: 0.0, width: 100.0, height: 100.0 })]);
        let proj = MinimapProjector::new(200.0, 100.0)
            .unwrap()
            .with_margin_factor(1.0)
            .unwrap()
            .project(&layout, &Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(proj.scale, 1.0);
        assert_eq!(proj.nodes[0].1, Rect::new(50.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_empty_layout_identity() {
        let layout = LayoutResult::empty(DensityMode::Normal);
        let vp = Rect::new(10.0, 10.0, 50.0, 50.0);
        let proj = MinimapProjector::new(200.0, 100.0).unwrap().project(&layout, &vp);
        assert_eq!(proj.scale, 1.0);
        assert!(proj.nodes.is_empty());
        assert_eq!(proj.viewport, vp);
    }

    #[test]
    fn test_click_maps_back_to_layout() {
        let layout = layout_of(&[("a", NodeBox { x: 0.0, y: 0.0, width: 400.0, height: 200.0 })]);
        let proj = MinimapProjector::new(200.0, 100.0).unwrap().project(&layout, &Rect::new(0.0, 0.0, 1.0, 1.0));
        let (cx, cy) = (proj.nodes[0].1.x, proj.nodes[0].1.y);
        let (x, y) = proj.to_layout_point(cx, cy);
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(matches!(
            MinimapProjector::new(0.0, 0.0),
            Err(LayoutError::InvalidConfig(_))
        ));
        assert!(MinimapProjector::new(200.0, 0.0).is_err());
    }

    #[test]
    fn test_negative_canvas_rejected() {
        assert!(matches!(
            MinimapProjector::new(-200.0, 150.0),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_canvas_rejected() {
        assert!(MinimapProjector::new(f64::NAN, 150.0).is_err());
        assert!(MinimapProjector::new(200.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_margin_factor_out_of_range_rejected() {
        let projector = MinimapProjector::new(200.0, 150.0).unwrap();
        assert!(projector.with_margin_factor(0.0).is_err());
        assert!(projector.with_margin_factor(1.5).is_err());
        assert_eq!(projector.with_margin_factor(0.5).unwrap().margin_factor(), 0.5);
    }
}

/// OrgChart Layout v1 - Chart Controller
///
/// Explicit view state owned by a single UI caller: config, zoom, the
/// current tree and the last layout. Replaces any process-wide chart state.
///
/// Recompute rules:
///   1. A new tree always recomputes.
///   2. A zoom change recomputes only when the density mode flips.
///   3. Any other zoom change only changes the display transform.

use tracing::{debug, info};

use crate::config::{LayoutConfig, ZOOM_DEFAULT};
use crate::density::{DensityMode, ZoomState};
use crate::domain::{LayoutResult, OrgNode, Rect};
use crate::error::Result;
use crate::layout::compute_layout_for_mode;
use crate::minimap::{MinimapProjection, MinimapProjector};
use crate::transform::DisplayTransform;

/// Stateful controller wrapping the pure layout function.
#[derive(Debug, Clone)]
pub struct ChartController {
    config: LayoutConfig,
    zoom: ZoomState,
    tree: Option<OrgNode>,
    layout: LayoutResult,
    generation: u64,
}

impl ChartController {
    /// Create a controller with no tree at 100% zoom.
    /// Fails if the config is invalid.
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let zoom = ZoomState::new(ZOOM_DEFAULT, &config);
        let mode = zoom.density_mode(&config);
        Ok(Self {
            config,
            zoom,
            tree: None,
            layout: LayoutResult::empty(mode),
            generation: 0,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn tree(&self) -> Option<&OrgNode> {
        self.tree.as_ref()
    }

    /// Last computed layout. Always matches the current tree and mode.
    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn density_mode(&self) -> DensityMode {
        self.layout.mode
    }

    /// Number of completed layout passes. Unchanged by display-only zooms.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the tree (or clear it with `None`) and recompute.
    ///
    /// On a structural error the previous tree and layout stay in place.
    pub fn load_tree(&mut self, tree: Option<OrgNode>) -> Result<&LayoutResult> {
        let mode = self.zoom.density_mode(&self.config);
        let layout = compute_layout_for_mode(tree.as_ref(), mode, &self.config)?;
        info!(nodes = layout.len(), mode = mode.as_str(), "tree loaded");
        self.tree = tree;
        self.commit(layout);
        Ok(&self.layout)
    }

    /// Set an absolute zoom level (clamped). Returns true if the layout
    /// was recomputed.
    pub fn set_zoom(&mut self, level: f64) -> Result<bool> {
        self.zoom.set(level, &self.config);
        self.refresh_mode()
    }

    pub fn zoom_in(&mut self) -> Result<bool> {
        self.zoom.zoom_in(&self.config);
        self.refresh_mode()
    }

    pub fn zoom_out(&mut self) -> Result<bool> {
        self.zoom.zoom_out(&self.config);
        self.refresh_mode()
    }

    pub fn reset_zoom(&mut self) -> Result<bool> {
        self.zoom.reset(&self.config);
        self.refresh_mode()
    }

    /// Transform the renderer applies to every box.
    pub fn display_transform(&self) -> DisplayTransform {
        DisplayTransform::from_zoom(self.zoom.level())
    }

    /// Boxes as the renderer draws them: layout boxes under the display scale.
    pub fn visible_boxes(&self) -> Vec<(String, Rect)> {
        self.display_transform().project(&self.layout)
    }

    /// Minimap projection for a viewport given in screen space.
    pub fn minimap(&self, projector: &MinimapProjector, screen_viewport: &Rect) -> MinimapProjection {
        let display = self.display_transform();
        let (x, y) = display.invert_point(screen_viewport.x, screen_viewport.y);
        let scale = display.scale;
        let viewport = Rect::new(
            x,
            y,
            screen_viewport.width / scale,
            screen_viewport.height / scale,
        );
        projector.project(&self.layout, &viewport)
    }

    fn refresh_mode(&mut self) -> Result<bool> {
        let mode = self.zoom.density_mode(&self.config);
        if mode == self.layout.mode {
            debug!(zoom = self.zoom.level(), "display-only zoom change");
            return Ok(false);
        }
        let layout = compute_layout_for_mode(self.tree.as_ref(), mode, &self.config)?;
        info!(
            zoom = self.zoom.level(),
            mode = mode.as_str(),
            "density mode changed, layout recomputed"
        );
        self.commit(layout);
        Ok(true)
    }

    fn commit(&mut self, layout: LayoutResult) {
        self.layout = layout;
        self.generation += 1;
    }
}

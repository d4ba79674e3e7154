/// OrgChart Layout v1 - Density Mode & Zoom State
///
/// Density mode is a pure function of the zoom level.
/// Zoom itself is a display scale; it never resizes a box.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LayoutConfig, ZOOM_DEFAULT};

/// Global rendering density for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityMode {
    Normal,
    Dense,
}

impl DensityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityMode::Normal => "normal",
            DensityMode::Dense => "dense",
        }
    }
}

/// `Dense` iff `zoom_level < threshold`.
pub fn select_density_mode(zoom_level: f64, threshold: f64) -> DensityMode {
    if zoom_level < threshold {
        DensityMode::Dense
    } else {
        DensityMode::Normal
    }
}

/// Clamp a requested zoom percentage into `[zoom_min, zoom_max]`.
/// Non-finite input falls back to the default zoom before clamping.
/// Never panics, even on an unvalidated config.
pub fn clamp_zoom(zoom_level: f64, config: &LayoutConfig) -> f64 {
    let requested = if zoom_level.is_finite() {
        zoom_level
    } else {
        ZOOM_DEFAULT
    };
    let clamped = requested.max(config.zoom_min).min(config.zoom_max);
    if clamped != zoom_level {
        debug!(requested = zoom_level, clamped, "zoom level out of range, clamped");
    }
    clamped
}

/// Current zoom percentage, always within the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    level: f64,
}

impl ZoomState {
    pub fn new(level: f64, config: &LayoutConfig) -> Self {
        Self {
            level: clamp_zoom(level, config),
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Uniform display scale, 1.0 at 100%.
    pub fn scale(&self) -> f64 {
        self.level / 100.0
    }

    pub fn density_mode(&self, config: &LayoutConfig) -> DensityMode {
        select_density_mode(self.level, config.zoom_dense_threshold)
    }

    pub fn set(&mut self, level: f64, config: &LayoutConfig) {
        self.level = clamp_zoom(level, config);
    }

    pub fn zoom_in(&mut self, config: &LayoutConfig) {
        self.set(self.level + config.zoom_step, config);
    }

    pub fn zoom_out(&mut self, config: &LayoutConfig) {
        self.set(self.level - config.zoom_step, config);
    }

    pub fn reset(&mut self, config: &LayoutConfig) {
        self.set(ZOOM_DEFAULT, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(select_density_mode(49.9, 50.0), DensityMode::Dense);
        assert_eq!(select_density_mode(50.0, 50.0), DensityMode::Normal);
        assert_eq!(select_density_mode(100.0, 50.0), DensityMode::Normal);
    }

    #[test]
    fn test_zoom_is_clamped_silently() {
        let cfg = LayoutConfig::default();
        assert_eq!(ZoomState::new(5.0, &cfg).level(), 30.0);
        assert_eq!(ZoomState::new(500.0, &cfg).level(), 200.0);
        assert_eq!(ZoomState::new(f64::NAN, &cfg).level(), 100.0);
    }

    #[test]
    fn test_zoom_steps_stop_at_bounds() {
        let cfg = LayoutConfig::default();
        let mut zoom = ZoomState::new(190.0, &cfg);
        zoom.zoom_in(&cfg);
        zoom.zoom_in(&cfg);
        assert_eq!(zoom.level(), 200.0);

        let mut zoom = ZoomState::new(35.0, &cfg);
        zoom.zoom_out(&cfg);
        assert_eq!(zoom.level(), 30.0);
        assert_eq!(zoom.density_mode(&cfg), DensityMode::Dense);

        zoom.reset(&cfg);
        assert_eq!(zoom.level(), 100.0);
        assert_eq!(zoom.scale(), 1.0);
    }
}

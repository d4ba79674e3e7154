/// OrgChart Layout v1 - Layout Constants
///
/// Every size is in layout pixels at 100% zoom.
/// Zoom never changes these values; it only scales the finished layout.

use serde::{Deserialize, Serialize};

use crate::density::DensityMode;
use crate::error::{LayoutError, Result};

// ── Defaults ───────────────────────────────────────────────────────

/// Zoom levels strictly below this switch the chart to dense mode.
pub const ZOOM_DENSE_THRESHOLD: f64 = 50.0;

pub const NODE_WIDTH_NORMAL: f64 = 180.0;
pub const NODE_HEIGHT_NORMAL: f64 = 80.0;

/// Dense boxes are narrow vertical strips; the accepted range is 35..=60.
pub const NODE_WIDTH_DENSE: f64 = 48.0;
pub const NODE_WIDTH_DENSE_MIN: f64 = 35.0;
pub const NODE_WIDTH_DENSE_MAX: f64 = 60.0;

pub const DENSE_MIN_HEIGHT: f64 = 60.0;
pub const DENSE_PER_CHAR_HEIGHT: f64 = 14.0;
pub const DENSE_PADDING: f64 = 16.0;

pub const SIBLING_SPACING_NORMAL: f64 = 40.0;
pub const SIBLING_SPACING_DENSE: f64 = 10.0;
pub const GROUP_SPACING_MULTIPLIER: f64 = 2.0;

pub const LEVEL_SPACING_NORMAL: f64 = 120.0;
pub const LEVEL_SPACING_DENSE: f64 = 80.0;

pub const ZOOM_MIN: f64 = 30.0;
pub const ZOOM_MAX: f64 = 200.0;
pub const ZOOM_STEP: f64 = 10.0;
pub const ZOOM_DEFAULT: f64 = 100.0;

pub const MINIMAP_MARGIN_FACTOR: f64 = 0.9;

/// All tunable layout constants, injected into every layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub zoom_dense_threshold: f64,
    pub node_width_normal: f64,
    pub node_height_normal: f64,
    pub node_width_dense: f64,
    pub dense_min_height: f64,
    pub dense_per_char_height: f64,
    pub dense_padding: f64,
    pub sibling_spacing_normal: f64,
    pub sibling_spacing_dense: f64,
    pub group_spacing_multiplier: f64,
    pub level_spacing_normal: f64,
    pub level_spacing_dense: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    pub minimap_margin_factor: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            zoom_dense_threshold: ZOOM_DENSE_THRESHOLD,
            node_width_normal: NODE_WIDTH_NORMAL,
            node_height_normal: NODE_HEIGHT_NORMAL,
            node_width_dense: NODE_WIDTH_DENSE,
            dense_min_height: DENSE_MIN_HEIGHT,
            dense_per_char_height: DENSE_PER_CHAR_HEIGHT,
            dense_padding: DENSE_PADDING,
            sibling_spacing_normal: SIBLING_SPACING_NORMAL,
            sibling_spacing_dense: SIBLING_SPACING_DENSE,
            group_spacing_multiplier: GROUP_SPACING_MULTIPLIER,
            level_spacing_normal: LEVEL_SPACING_NORMAL,
            level_spacing_dense: LEVEL_SPACING_DENSE,
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,
            zoom_step: ZOOM_STEP,
            minimap_margin_factor: MINIMAP_MARGIN_FACTOR,
        }
    }
}

impl LayoutConfig {
    /// Reject configurations that would make layouts degenerate.
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("node_width_normal", self.node_width_normal),
            ("node_height_normal", self.node_height_normal),
            ("node_width_dense", self.node_width_dense),
            ("dense_min_height", self.dense_min_height),
            ("level_spacing_normal", self.level_spacing_normal),
            ("level_spacing_dense", self.level_spacing_dense),
            ("zoom_min", self.zoom_min),
            ("zoom_step", self.zoom_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("dense_per_char_height", self.dense_per_char_height),
            ("dense_padding", self.dense_padding),
            ("sibling_spacing_normal", self.sibling_spacing_normal),
            ("sibling_spacing_dense", self.sibling_spacing_dense),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }

        if !(NODE_WIDTH_DENSE_MIN..=NODE_WIDTH_DENSE_MAX).contains(&self.node_width_dense) {
            return Err(LayoutError::InvalidConfig(format!(
                "node_width_dense must be within {NODE_WIDTH_DENSE_MIN}..={NODE_WIDTH_DENSE_MAX}, got {}",
                self.node_width_dense
            )));
        }
        if !(self.group_spacing_multiplier.is_finite() && self.group_spacing_multiplier >= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "group_spacing_multiplier must be >= 1.0, got {}",
                self.group_spacing_multiplier
            )));
        }
        if !(self.zoom_max.is_finite() && self.zoom_max >= self.zoom_min) {
            return Err(LayoutError::InvalidConfig(format!(
                "zoom range is empty: {}..={}",
                self.zoom_min, self.zoom_max
            )));
        }
        if self.level_spacing_normal < self.node_height_normal {
            return Err(LayoutError::InvalidConfig(format!(
                "level_spacing_normal {} is less than node_height_normal {}; rows would overlap",
                self.level_spacing_normal, self.node_height_normal
            )));
        }
        if !self.zoom_dense_threshold.is_finite() {
            return Err(LayoutError::InvalidConfig(
                "zoom_dense_threshold must be finite".to_string(),
            ));
        }
        if !(self.minimap_margin_factor > 0.0 && self.minimap_margin_factor <= 1.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "minimap_margin_factor must be within (0, 1], got {}",
                self.minimap_margin_factor
            )));
        }
        Ok(())
    }

    /// Horizontal gap between adjacent siblings of one parent.
    pub fn sibling_spacing(&self, mode: DensityMode) -> f64 {
        match mode {
            DensityMode::Normal => self.sibling_spacing_normal,
            DensityMode::Dense => self.sibling_spacing_dense,
        }
    }

    /// Horizontal gap between adjacent row nodes that belong to different parents.
    pub fn group_spacing(&self, mode: DensityMode) -> f64 {
        self.sibling_spacing(mode) * self.group_spacing_multiplier
    }

    pub fn level_spacing(&self, mode: DensityMode) -> f64 {
        match mode {
            DensityMode::Normal => self.level_spacing_normal,
            DensityMode::Dense => self.level_spacing_dense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        LayoutConfig::default().validate().unwrap();
    }

    #[test]
    fn test_group_spacing_is_double_sibling_spacing() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.group_spacing(DensityMode::Normal), 80.0);
        assert_eq!(cfg.group_spacing(DensityMode::Dense), 20.0);
    }

    #[test]
    fn test_dense_width_out_of_range_rejected() {
        let cfg = LayoutConfig {
            node_width_dense: 90.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let cfg = LayoutConfig {
            zoom_min: 150.0,
            zoom_max: 100.0,
            ..LayoutConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_normal_rows_must_clear_box_height() {
        let cfg = LayoutConfig {
            level_spacing_normal: 60.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(LayoutError::InvalidConfig(_))));
    }

    #[test]
    fn test_multiplier_below_one_rejected() {
        let cfg = LayoutConfig {
            group_spacing_multiplier: 0.5,
            ..LayoutConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{"sibling_spacing_normal": 24.0}"#).unwrap();
        assert_eq!(cfg.sibling_spacing_normal, 24.0);
        assert_eq!(cfg.node_width_normal, NODE_WIDTH_NORMAL);
    }
}

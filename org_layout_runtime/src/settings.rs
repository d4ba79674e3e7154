//! Layout settings: TOML file + environment overrides.
//!
//! Every key is optional; missing keys keep their defaults. Unknown keys
//! are rejected so a typo never silently falls back to a default.
//!
//! ```toml
//! zoom_dense_threshold = 50.0
//! sibling_spacing_normal = 40.0
//! group_spacing_multiplier = 2.0
//! ```

use std::env;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use org_layout_engine::LayoutConfig;

use crate::error::{Result, RuntimeError};

/// Prefix for environment overrides, e.g. `ORG_CHART_ZOOM_DENSE_THRESHOLD`.
pub const ENV_PREFIX: &str = "ORG_CHART_";

/// Parse and validate a TOML document.
pub fn parse_settings(content: &str) -> Result<LayoutConfig> {
    let config: LayoutConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load settings from `path`, or defaults when `None`, then apply
/// `ORG_CHART_*` environment overrides and validate.
pub fn load_settings(path: Option<&Path>) -> Result<LayoutConfig> {
    let mut config = match path {
        Some(p) => {
            let content = fs::read_to_string(p)?;
            let config: LayoutConfig = toml::from_str(&content)?;
            info!(path = %p.display(), "layout settings loaded");
            config
        }
        None => LayoutConfig::default(),
    };
    apply_overrides(&mut config, |key| env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Apply overrides from `lookup`, keyed by `ORG_CHART_<FIELD>` in upper case.
pub fn apply_overrides<F>(config: &mut LayoutConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let fields: [(&str, &mut f64); 16] = [
        ("zoom_dense_threshold", &mut config.zoom_dense_threshold),
        ("node_width_normal", &mut config.node_width_normal),
        ("node_height_normal", &mut config.node_height_normal),
        ("node_width_dense", &mut config.node_width_dense),
        ("dense_min_height", &mut config.dense_min_height),
        ("dense_per_char_height", &mut config.dense_per_char_height),
        ("dense_padding", &mut config.dense_padding),
        ("sibling_spacing_normal", &mut config.sibling_spacing_normal),
        ("sibling_spacing_dense", &mut config.sibling_spacing_dense),
        ("group_spacing_multiplier", &mut config.group_spacing_multiplier),
        ("level_spacing_normal", &mut config.level_spacing_normal),
        ("level_spacing_dense", &mut config.level_spacing_dense),
        ("zoom_min", &mut config.zoom_min),
        ("zoom_max", &mut config.zoom_max),
        ("zoom_step", &mut config.zoom_step),
        ("minimap_margin_factor", &mut config.minimap_margin_factor),
    ];

    for (field, slot) in fields {
        let key = format!("{}{}", ENV_PREFIX, field.to_ascii_uppercase());
        if let Some(raw) = lookup(&key) {
            let value: f64 = raw.trim().parse().map_err(|e| RuntimeError::InvalidOverride {
                key: key.clone(),
                value: raw.clone(),
                reason: format!("{e}"),
            })?;
            debug!(%key, value, "setting overridden from environment");
            *slot = value;
        }
    }
    Ok(())
}

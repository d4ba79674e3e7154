/// OrgChart Layout v1 - Node Box Sizing
///
/// Sizes are computed once per density mode at 100% zoom.

use crate::config::LayoutConfig;
use crate::density::DensityMode;

/// Label length in Unicode scalar values. Hangul and Latin count alike.
pub fn label_length(name: &str) -> usize {
    name.trim().chars().count()
}

/// Height of a dense box:
/// `max(dense_min_height, len * dense_per_char_height + dense_padding)`.
/// An empty label yields `dense_min_height`.
pub fn dense_height(name: &str, config: &LayoutConfig) -> f64 {
    let len = label_length(name);
    if len == 0 {
        return config.dense_min_height;
    }
    let computed = len as f64 * config.dense_per_char_height + config.dense_padding;
    computed.max(config.dense_min_height)
}

/// `(width, height)` of a node box for the given mode.
pub fn box_size(name: &str, mode: DensityMode, config: &LayoutConfig) -> (f64, f64) {
    match mode {
        DensityMode::Normal => (config.node_width_normal, config.node_height_normal),
        DensityMode::Dense => (config.node_width_dense, dense_height(name, config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_size_ignores_label() {
        let cfg = LayoutConfig::default();
        assert_eq!(box_size("", DensityMode::Normal, &cfg), (180.0, 80.0));
        assert_eq!(
            box_size("A very long department name", DensityMode::Normal, &cfg),
            (180.0, 80.0)
        );
    }

    #[test]
    fn test_dense_height_follows_label_length() {
        let cfg = LayoutConfig::default();
        // 3 chars: 3 * 14 + 16 = 58 < 60
        assert_eq!(dense_height("HR팀", &cfg), 60.0);
        // 10 chars: 10 * 14 + 16 = 156
        assert_eq!(dense_height("Operations", &cfg), 156.0);
    }

    #[test]
    fn test_empty_or_blank_label_uses_min_height() {
        let cfg = LayoutConfig::default();
        assert_eq!(dense_height("", &cfg), cfg.dense_min_height);
        assert_eq!(dense_height("   ", &cfg), cfg.dense_min_height);
    }

    #[test]
    fn test_dense_width_is_constant() {
        let cfg = LayoutConfig::default();
        let (w1, _) = box_size("a", DensityMode::Dense, &cfg);
        let (w2, _) = box_size("a much longer label here", DensityMode::Dense, &cfg);
        assert_eq!(w1, w2);
        assert_eq!(w1, cfg.node_width_dense);
    }
}

#![forbid(unsafe_code)]

//! Org chart layout kernel.
//!
//! Pure, deterministic placement of organization trees: density modes
//! driven by zoom, tiered sibling/group spacing, parent centering, and
//! minimap projection. No I/O lives here.

/// Layout engine v1. Bumping this changes every canonical hash.
pub const ENGINE_VERSION: u32 = 1;

pub mod error;
pub mod config;
pub mod density;
pub mod domain;
pub mod sizing;
pub mod tree;
pub mod layout;
pub mod invariants;
pub mod transform;
pub mod minimap;
pub mod hashing;
pub mod controller;

pub use config::LayoutConfig;
pub use controller::ChartController;
pub use density::{select_density_mode, DensityMode, ZoomState};
pub use domain::{LayoutResult, NodeBox, NodeMetadata, NodeType, OrgNode, Rect};
pub use error::{LayoutError, Result};
pub use layout::{compute_layout, compute_layout_for_mode, HierarchicalChartLayout};
pub use minimap::{MinimapProjection, MinimapProjector};
pub use transform::DisplayTransform;

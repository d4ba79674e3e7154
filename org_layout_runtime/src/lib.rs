#![forbid(unsafe_code)]

//! Runtime around the org chart layout kernel.
//!
//! Turns REST payloads into validated trees, loads layout settings,
//! persists and verifies layout snapshots, and reports drift between
//! layouts. All geometry is delegated to `org_layout_engine`.

pub mod error;
pub mod source;
pub mod settings;
pub mod snapshot;
pub mod drift;

pub use error::{Result, RuntimeError};

/// OrgChart Layout v1 - Error Types
///
/// Structural errors are fatal to a single layout call.
/// Label and zoom problems are recovered locally and never surface here.

use thiserror::Error;

/// Result alias used across the kernel.
pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LayoutError {
    /// A node appears as its own descendant.
    #[error("cycle detected: node {id:?} appears below itself (path: {path})")]
    Cycle { id: String, path: String },

    /// The same id appears twice in unrelated branches.
    #[error("duplicate node id {id:?}")]
    DuplicateId { id: String },

    /// A node's declared `parentId` disagrees with the node that contains it.
    #[error("node {id:?} declares parent {declared:?} but is nested under {actual:?}")]
    ParentMismatch {
        id: String,
        declared: String,
        actual: String,
    },

    /// A node id is empty.
    #[error("node at depth {depth} has an empty id")]
    EmptyId { depth: usize },

    /// A configuration constant is out of its allowed range.
    #[error("invalid layout config: {0}")]
    InvalidConfig(String),

    /// A computed layout broke one of its geometric guarantees.
    #[error("[INVARIANT:{check}] {detail}")]
    InvariantViolation { check: &'static str, detail: String },
}

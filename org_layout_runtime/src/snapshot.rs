//! Snapshot layer: deterministic layout snapshots.
//!
//! A snapshot stores the canonical JSON of a layout plus its hash.
//! No timestamps in snapshot content (determinism).
//!
//! A snapshot whose hash doesn't match its content is never restored;
//! the caller recomputes the layout from the tree instead.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use org_layout_engine::hashing::{canonical_hash, canonical_serialize, sha256_hex};
use org_layout_engine::{DensityMode, LayoutResult, NodeBox};

use crate::error::{Result, RuntimeError};

/// Snapshot on-disk format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Controller generation at which this snapshot was taken.
    pub generation: u64,
    /// Zoom level in effect; display-only, not part of the hash.
    pub zoom_level: f64,
    /// Canonical JSON of the layout (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of the canonical JSON.
    pub hash: String,
    /// Layout engine version at snapshot time.
    pub engine_version: u32,
}

/// Mirror of the canonical JSON produced by `hashing::canonical_serialize`.
#[derive(Deserialize)]
struct CanonicalLayout {
    engine_version: u32,
    mode: DensityMode,
    nodes: Vec<CanonicalNode>,
}

#[derive(Deserialize)]
struct CanonicalNode {
    id: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn snapshot_path(dir: &Path, generation: u64) -> PathBuf {
    dir.join(format!("layout_{:06}.json", generation))
}

/// Save a deterministic snapshot of `layout`.
pub fn save_snapshot(
    dir: &Path,
    generation: u64,
    zoom_level: f64,
    layout: &LayoutResult,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let canonical_json = String::from_utf8_lossy(&canonical_serialize(layout)).into_owned();
    let snap = Snapshot {
        generation,
        zoom_level,
        canonical_json,
        hash: canonical_hash(layout),
        engine_version: org_layout_engine::ENGINE_VERSION,
    };

    let path = snapshot_path(dir, generation);
    let content = serde_json::to_string(&snap)?;

    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    info!(path = %path.display(), hash = %snap.hash, nodes = layout.len(), "layout snapshot saved");
    Ok(path)
}

/// Load the snapshot for `generation`. `None` if absent.
pub fn load_snapshot(dir: &Path, generation: u64) -> Result<Option<Snapshot>> {
    let path = snapshot_path(dir, generation);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let snap: Snapshot =
        serde_json::from_str(&content).map_err(|e| RuntimeError::SnapshotCorrupt {
            path: path.clone(),
            reason: format!("bad snapshot JSON: {e}"),
        })?;
    Ok(Some(snap))
}

/// Load the snapshot with the highest generation in `dir`.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut best: Option<u64> = None;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let generation = name
            .to_string_lossy()
            .strip_prefix("layout_")
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(g) = generation {
            best = Some(best.map_or(g, |b| b.max(g)));
        }
    }

    match best {
        Some(g) => load_snapshot(dir, g),
        None => Ok(None),
    }
}

/// True if the stored hash matches the canonical JSON content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    sha256_hex(snap.canonical_json.as_bytes()) == snap.hash
}

/// Rebuild the `LayoutResult` a snapshot was taken from.
///
/// Fails if the hash doesn't verify or the engine version differs.
pub fn restore_layout(snap: &Snapshot) -> Result<LayoutResult> {
    let corrupt = |reason: String| RuntimeError::SnapshotCorrupt {
        path: PathBuf::from(format!("generation {}", snap.generation)),
        reason,
    };

    if !verify_snapshot_hash(snap) {
        warn!(generation = snap.generation, "snapshot hash mismatch");
        return Err(corrupt("hash does not match canonical JSON".to_string()));
    }

    let canonical: CanonicalLayout = serde_json::from_str(&snap.canonical_json)
        .map_err(|e| corrupt(format!("unreadable canonical JSON: {e}")))?;
    if canonical.engine_version != org_layout_engine::ENGINE_VERSION {
        return Err(corrupt(format!(
            "engine version {} != {}",
            canonical.engine_version,
            org_layout_engine::ENGINE_VERSION
        )));
    }

    let mut layout = LayoutResult::empty(canonical.mode);
    for n in canonical.nodes {
        layout.boxes.insert(
            n.id,
            NodeBox {
                x: n.x,
                y: n.y,
                width: n.width,
                height: n.height,
            },
        );
    }
    Ok(layout)
}

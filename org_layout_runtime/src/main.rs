//! `org-chart`: command-line front end for the layout runtime.
//!
//! Prints JSON on stdout; logs go to stderr (`RUST_LOG`, default `info`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use org_layout_engine::hashing::canonical_hash;
use org_layout_engine::{ChartController, LayoutConfig, MinimapProjector, Rect};
use org_layout_runtime::drift::{compare_layouts, verify_determinism};
use org_layout_runtime::error::{Result, RuntimeError};
use org_layout_runtime::settings::load_settings;
use org_layout_runtime::snapshot::{load_latest_snapshot, restore_layout, save_snapshot};
use org_layout_runtime::source::load_tree_file;

/// Org chart layout tool
#[derive(Parser, Debug)]
#[command(name = "org-chart", version, long_about = None)]
struct Cli {
    /// Layout settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Zoom level in percent
    #[arg(short, long, global = true, default_value_t = 100.0)]
    zoom: f64,

    /// Pretty-print JSON output
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute and print the layout of a tree document
    Layout {
        /// Tree JSON: nested object, flat record array, or results page
        tree: PathBuf,
    },
    /// Project the layout onto a minimap canvas
    Minimap {
        tree: PathBuf,
        /// Visible area in screen pixels: x,y,width,height
        #[arg(long, value_parser = parse_rect)]
        viewport: Rect,
        /// Canvas size: WIDTHxHEIGHT
        #[arg(long, default_value = "200x150", value_parser = parse_size)]
        canvas: (f64, f64),
    },
    /// Save a layout snapshot to a directory
    Snapshot {
        tree: PathBuf,
        #[arg(long)]
        dir: PathBuf,
    },
    /// Verify the latest snapshot in a directory
    Verify {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Compare the layouts of two tree documents
    Diff { before: PathBuf, after: PathBuf },
}

fn parse_rect(raw: &str) -> std::result::Result<Rect, String> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<std::result::Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(Rect::new(*x, *y, *w, *h)),
        _ => Err(format!("expected x,y,width,height, got {raw:?}")),
    }
}

fn parse_size(raw: &str) -> std::result::Result<(f64, f64), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if !(w.is_finite() && w > 0.0 && h.is_finite() && h > 0.0) {
        return Err(format!("canvas must be positive and finite, got {raw:?}"));
    }
    Ok((w, h))
}

fn controller_for(tree_path: &Path, config: &LayoutConfig, zoom: f64) -> Result<ChartController> {
    let tree = load_tree_file(tree_path)?;
    let mut ctl = ChartController::new(config.clone())?;
    ctl.set_zoom(zoom)?;
    ctl.load_tree(tree)?;
    Ok(ctl)
}

fn emit(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn run(cli: Cli) -> Result<bool> {
    let config = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Layout { tree } => {
            let ctl = controller_for(&tree, &config, cli.zoom)?;
            verify_determinism(ctl.tree(), ctl.zoom().level(), &config)?;
            emit(
                &json!({
                    "hash": canonical_hash(ctl.layout()),
                    "zoom": ctl.zoom().level(),
                    "transform": ctl.display_transform(),
                    "layout": ctl.layout(),
                }),
                cli.pretty,
            )?;
        }
        Command::Minimap {
            tree,
            viewport,
            canvas,
        } => {
            let ctl = controller_for(&tree, &config, cli.zoom)?;
            let projector = MinimapProjector::new(canvas.0, canvas.1)?
                .with_margin_factor(config.minimap_margin_factor)?;
            let projection = ctl.minimap(&projector, &viewport);
            emit(&serde_json::to_value(&projection)?, cli.pretty)?;
        }
        Command::Snapshot { tree, dir } => {
            let ctl = controller_for(&tree, &config, cli.zoom)?;
            let path = save_snapshot(&dir, ctl.generation(), ctl.zoom().level(), ctl.layout())?;
            emit(
                &json!({ "path": path, "hash": canonical_hash(ctl.layout()) }),
                cli.pretty,
            )?;
        }
        Command::Verify { dir } => {
            let snap = match load_latest_snapshot(&dir)? {
                Some(s) => s,
                None => {
                    error!(dir = %dir.display(), "no snapshot found");
                    return Ok(false);
                }
            };
            let verified = restore_layout(&snap);
            emit(
                &json!({
                    "generation": snap.generation,
                    "hash": snap.hash,
                    "valid": verified.is_ok(),
                    "nodes": verified.as_ref().map(|l| l.len()).unwrap_or(0),
                }),
                cli.pretty,
            )?;
            if let Err(e) = verified {
                error!("{e}");
                return Ok(false);
            }
        }
        Command::Diff { before, after } => {
            let a = controller_for(&before, &config, cli.zoom)?;
            let b = controller_for(&after, &config, cli.zoom)?;
            let drift = compare_layouts(a.layout(), b.layout());
            info!(identical = drift.is_identical(), "layouts compared");
            emit(&serde_json::to_value(&drift)?, cli.pretty)?;
        }
    }
    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &RuntimeError) {
    error!("{e}");
    eprintln!("org-chart: {e}");
}

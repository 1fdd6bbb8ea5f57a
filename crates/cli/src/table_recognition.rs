//! table_recognition - Recognize table structure on page images
//!
//! Locates tables on each page, recognizes their rows, columns and cells,
//! and writes the assembled grids to `results.json`. Detector outputs are
//! read from a recording made by the external models.

mod load;
mod replay;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tablegrid_core::pipeline::{PageTablePipeline, PipelineConfig, PipelineOutput};
use tablegrid_core::render::{OverlayStyle, cell_overlay, row_col_overlay};
use tracing::info;

use crate::replay::ReplayDetector;

/// Recognize table structure in an image file or a folder of images.
#[derive(Parser, Debug)]
#[command(name = "table_recognition")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image file or folder of images
    input_path: PathBuf,

    /// JSON recording of text, layout and table structure detections
    #[arg(long, required = true)]
    detections: PathBuf,

    /// Folder to write results into
    #[arg(long = "results-dir", default_value = "results/tablegrid")]
    results_dir: PathBuf,

    /// Maximum number of pages to process
    #[arg(long)]
    max: Option<usize>,

    /// Save cell and row/column overlay images for every table
    #[arg(long, action = ArgAction::SetTrue)]
    images: bool,

    /// Detect text boxes inside each table even when page text lines exist
    #[arg(long = "detect-boxes", action = ArgAction::SetTrue)]
    detect_boxes: bool,

    /// Inputs are already cropped tables
    #[arg(long = "skip-table-detection", action = ArgAction::SetTrue)]
    skip_table_detection: bool,

    /// Font used for overlay labels
    #[arg(long)]
    font: Option<PathBuf>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn overlay_style(font: Option<&Path>) -> Result<OverlayStyle> {
    match font {
        Some(path) => OverlayStyle::with_font_path(path)
            .with_context(|| format!("failed to load font {}", path.display())),
        None => Ok(OverlayStyle::with_system_font()),
    }
}

fn save_overlays(output: &PipelineOutput, folder: &Path, style: &OverlayStyle) -> Result<()> {
    for table in &output.tables {
        let stem = table.debug_stem();
        let cells_path = folder.join(format!("{stem}_cells.png"));
        cell_overlay(&table.image, &table.result, style)
            .save(&cells_path)
            .with_context(|| format!("failed to write {}", cells_path.display()))?;
        let rc_path = folder.join(format!("{stem}_rc.png"));
        row_col_overlay(&table.image, &table.result, style)
            .save(&rc_path)
            .with_context(|| format!("failed to write {}", rc_path.display()))?;
    }
    Ok(())
}

fn write_results(output: &PipelineOutput, folder: &Path) -> Result<PathBuf> {
    let path = folder.join("results.json");
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &output.predictions())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn run(args: &Args) -> Result<PathBuf> {
    let config = PipelineConfig {
        detect_boxes: args.detect_boxes,
        skip_table_detection: args.skip_table_detection,
        num_threads: args.threads,
        ..PipelineConfig::default()
    };

    let pages = load::load_pages(&args.input_path, args.max)?;
    info!(pages = pages.len(), "loaded pages");

    let replay = Arc::new(ReplayDetector::from_path(&args.detections)?);
    let pipeline = PageTablePipeline::new(replay.clone(), replay.clone(), replay, config)?;
    let output = pipeline.run(&pages)?;

    let folder = args.results_dir.join(load::result_name(&args.input_path));
    fs::create_dir_all(&folder)
        .with_context(|| format!("failed to create {}", folder.display()))?;

    if args.images {
        let style = overlay_style(args.font.as_deref())?;
        save_overlays(&output, &folder, &style)?;
    }
    write_results(&output, &folder)?;
    Ok(folder)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let folder = run(&args)?;
    println!("Wrote results to {}", folder.display());
    Ok(())
}

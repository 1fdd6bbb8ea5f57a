//! Input discovery: page images and their optional text-line sidecars.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tablegrid_core::pipeline::PageInput;
use tablegrid_core::results::OcrResult;
use tracing::debug;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];
const LINES_SUFFIX: &str = ".lines.json";

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Output folder name for an input: the folder's name, or the file name up to its first dot.
pub fn result_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if input.is_dir() {
        name
    } else {
        name.split('.').next().unwrap_or_default().to_string()
    }
}

fn sidecar_path(image: &Path) -> PathBuf {
    image.with_file_name(format!("{}{}", file_stem(image), LINES_SUFFIX))
}

fn load_page(path: &Path) -> Result<PageInput> {
    let image = image::open(path)
        .with_context(|| format!("failed to read image {}", path.display()))?
        .to_rgb8();
    let mut page = PageInput::new(file_stem(path), image);

    let sidecar = sidecar_path(path);
    if sidecar.is_file() {
        let data = fs::read_to_string(&sidecar)
            .with_context(|| format!("failed to read {}", sidecar.display()))?;
        let lines: OcrResult = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse text lines {}", sidecar.display()))?;
        debug!(path = %sidecar.display(), lines = lines.text_lines.len(), "loaded text lines");
        page = page.with_text_lines(lines);
    }
    Ok(page)
}

/// Load one image, or every image in a folder in file-name order, up to `max` pages.
pub fn load_pages(input: &Path, max: Option<usize>) -> Result<Vec<PageInput>> {
    let mut paths = if input.is_dir() {
        let mut paths = Vec::new();
        for entry in fs::read_dir(input)
            .with_context(|| format!("failed to list {}", input.display()))?
        {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        paths
    } else if input.is_file() {
        vec![input.to_path_buf()]
    } else {
        bail!("input not found: {}", input.display());
    };

    if let Some(max) = max {
        paths.truncate(max);
    }
    paths.iter().map(|path| load_page(path)).collect()
}

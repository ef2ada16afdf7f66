//! File I/O helpers and synthetic fixtures shared by the CLI, benches and tests.
use crate::config::ScanConfig;
use crate::error::ToolError;
use crate::models::BitMatrix;
use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Synthetic frames and masks containing finder patterns
pub mod synthetic;

fn max_dim_from_env() -> Option<u32> {
    match env::var("QRG_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image as RGB bytes along with its dimensions.
///
/// `QRG_MAX_DIM` caps the longer side (aspect preserved) for oversized photos.
pub fn load_rgb<P: AsRef<Path>>(path: P) -> Result<(Vec<u8>, usize, usize), ToolError> {
    let img = image::open(path)?;
    let rgb = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_rgb8(),
        _ => img.to_rgb8(),
    };
    let (width, height) = rgb.dimensions();
    Ok((rgb.into_raw(), width as usize, height as usize))
}

/// Write RGB bytes as an image; the format follows the file extension
pub fn save_rgb<P: AsRef<Path>>(path: P, rgb: &[u8], width: usize, height: usize) -> Result<(), ToolError> {
    let img = image::RgbImage::from_raw(width as u32, height as u32, rgb.to_vec()).ok_or(
        crate::error::FrameError::BufferSize {
            width,
            height,
            expected: width * height * 3,
            actual: rgb.len(),
        },
    )?;
    img.save(path)?;
    Ok(())
}

/// Write RGBA bytes (e.g. from [`crate::bridge::to_rgba`]) as an image
pub fn save_rgba<P: AsRef<Path>>(path: P, rgba: &[u8], width: usize, height: usize) -> Result<(), ToolError> {
    let img = image::RgbaImage::from_raw(width as u32, height as u32, rgba.to_vec()).ok_or(
        crate::error::FrameError::BufferSize {
            width,
            height,
            expected: width * height * 4,
            actual: rgba.len(),
        },
    )?;
    img.save(path)?;
    Ok(())
}

/// Write a binary mask as a black-on-white grayscale image (foreground is black)
pub fn save_mask<P: AsRef<Path>>(path: P, mask: &BitMatrix) -> Result<(), ToolError> {
    let (w, h) = (mask.width(), mask.height());
    let img = image::GrayImage::from_fn(w as u32, h as u32, |x, y| {
        image::Luma([if mask.get(x as usize, y as usize) { 0 } else { 255 }])
    });
    img.save(path)?;
    Ok(())
}

/// Defaults, optionally replaced by a JSON file, then `QRG_*` environment overrides
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig, ToolError> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<ScanConfig>(&text)?
        }
        None => ScanConfig::default(),
    };
    Ok(config.with_env_overrides())
}

/// Image files under `root` (recursive), sorted, optionally truncated to `limit`
pub fn image_files<P: AsRef<Path>>(root: P, limit: Option<usize>) -> Vec<PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if ext == "png" || ext == "jpg" || ext == "jpeg" || ext == "gif" || ext == "bmp" {
                    images.push(path);
                }
            }
        }
    }

    images
}

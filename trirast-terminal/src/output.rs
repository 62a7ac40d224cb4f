/// PNG output for single-frame mode
use std::path::Path;

use anyhow::{anyhow, Context};
use image::RgbImage;
use tracing::info;
use trirast_core::FrameBuffer;

/// Convert the color buffer to an 8-bit RGB image, row 0 at the top.
pub fn to_image(frame: &FrameBuffer) -> anyhow::Result<RgbImage> {
    RgbImage::from_raw(frame.width(), frame.height(), frame.to_rgb8())
        .ok_or_else(|| anyhow!("color buffer does not match {}x{}", frame.width(), frame.height()))
}

pub fn save_png(frame: &FrameBuffer, path: &Path) -> anyhow::Result<()> {
    let image = to_image(frame)?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), width = frame.width(), height = frame.height(), "image saved");
    Ok(())
}

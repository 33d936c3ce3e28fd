//! Still-frame export through the CPU evaluator.
//!
//! Pixel centres map to UV with `v` pointing up, so row 0 of the image is the
//! top of the screen (`v` near 1). Colours are written as they come out of
//! the graph, clamped to [0, 1] with no transfer curve applied.
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use nodegraph::{EvalContext, Evaluator, Node};
use sketchconfig::RenderSize;

pub fn pixel_uv(x: u32, y: u32, size: RenderSize) -> [f32; 2] {
    let u = (x as f32 + 0.5) / size.width as f32;
    let v = 1.0 - (y as f32 + 0.5) / size.height as f32;
    [u, v]
}

fn to_byte(channel: f32) -> u8 {
    // NaN saturates to 0
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn render_still(graph: &Node, size: RenderSize, time: Duration) -> Result<RgbaImage> {
    let started = Instant::now();
    let resolution = [size.width as f32, size.height as f32];
    let seconds = time.as_secs_f32();
    let mut evaluator = Evaluator::default();
    let mut image = RgbaImage::new(size.width, size.height);

    for y in 0..size.height {
        for x in 0..size.width {
            let ctx = EvalContext::new(pixel_uv(x, y, size), seconds, resolution);
            let value = evaluator
                .eval(graph, &ctx)
                .with_context(|| format!("failed to evaluate pixel ({x}, {y})"))?;
            image.put_pixel(x, y, Rgba(value.to_rgba().map(to_byte)));
        }
    }

    tracing::info!(
        %size,
        time = seconds,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered still frame"
    );
    Ok(image)
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))
}

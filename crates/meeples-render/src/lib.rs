//! Offscreen compositing layer for Meeples worlds.
//!
//! Rebuilds the presented frame from scratch on every call: the board
//! raster is pasted first, then every meeple is drawn on top. Hosts own
//! presentation and timing; this crate only produces pixels.

use image::{ImageFormat, Rgba, RgbaImage};
use meeples_core::{GameBoard, MeepleData};
use thiserror::Error;
use tracing::debug;

/// Errors raised while encoding composited frames.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("png encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Composite one ephemeral frame: board raster plus every live meeple
/// drawn as a filled circle of its color and size.
#[must_use]
pub fn render_frame(world: &GameBoard) -> RgbaImage {
    let board = world.board();
    let fill = board.fill();
    let mut frame = RgbaImage::from_fn(board.width(), board.height(), |x, y| {
        let [r, g, b] = board.get(x, y).unwrap_or(fill);
        Rgba([r, g, b, 255])
    });
    for meeple in world.meeples().values() {
        draw_meeple(&mut frame, meeple);
    }
    debug!(
        width = frame.width(),
        height = frame.height(),
        meeples = world.meeple_count(),
        "composited frame"
    );
    frame
}

/// Encode a composited frame as PNG bytes.
pub fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    frame.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Composite and PNG-encode one frame, for hosts that present raw bytes.
pub fn render_png_offscreen(world: &GameBoard) -> Result<Vec<u8>, RenderError> {
    encode_png(&render_frame(world))
}

fn draw_meeple(frame: &mut RgbaImage, meeple: &MeepleData) {
    let width = frame.width() as f32;
    let height = frame.height() as f32;
    if width == 0.0 || height == 0.0 {
        return;
    }
    let radius = (meeple.size / 2.0).max(0.5);
    let [r, g, b] = meeple.color;
    let pixel = Rgba([r, g, b, 255]);
    let cx = meeple.position.x;
    let cy = meeple.position.y;
    let min_x = (cx - radius).floor().clamp(0.0, width - 1.0) as u32;
    let max_x = (cx + radius).ceil().clamp(0.0, width - 1.0) as u32;
    let min_y = (cy - radius).floor().clamp(0.0, height - 1.0) as u32;
    let max_y = (cy + radius).ceil().clamp(0.0, height - 1.0) as u32;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                frame.put_pixel(x, y, pixel);
            }
        }
    }
}

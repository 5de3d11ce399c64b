use crate::foundation::error::{CodeReelError, CodeReelResult};
use crate::render::backend::FrameRGBA;
use std::path::Path;

/// Convert premultiplied RGBA8 to straight alpha, as PNG expects.
pub fn unpremultiply(frame: &FrameRGBA) -> Vec<u8> {
    if !frame.premultiplied {
        return frame.data.clone();
    }
    let mut out = frame.data.clone();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Write one frame as a PNG file, creating the parent directory if needed.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> CodeReelResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(path)?;
    let data = unpremultiply(frame);
    image::save_buffer_with_format(
        path,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| CodeReelError::render(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/render/png.rs"]
mod tests;

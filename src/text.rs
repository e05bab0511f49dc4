use fontdue::{Font, FontSettings};
use std::path::Path;
use tiny_skia::{Color, PremultipliedColorU8, Pixmap};

use crate::error::{Error, Result};

pub struct TextRenderer {
    font: Font,
}

impl TextRenderer {
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, &'static str> {
        let font = Font::from_bytes(bytes, FontSettings::default())?;
        Ok(TextRenderer { font })
    }

    /// Reads a font file and checks that it parses. The raw bytes are
    /// returned so each rendering thread can build its own renderer.
    pub fn read_font(path: &Path) -> Result<Vec<u8>> {
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Self::from_bytes(&bytes).map_err(|reason| Error::Font {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })?;
        Ok(bytes)
    }

    /// Draws `text` with its baseline at `y`, starting at `x`.
    pub fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: Color,
    ) {
        let mut cursor_x = x;
        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, size);
            let left = (cursor_x + metrics.xmin as f32).round() as i32;
            let top = (y - metrics.height as f32 - metrics.ymin as f32).round() as i32;

            for (i, &value) in bitmap.iter().enumerate() {
                let coverage = f32::from(value) / 255.0;
                if coverage < 0.01 {
                    continue;
                }
                let gx = (i % metrics.width) as i32;
                let gy = (i / metrics.width) as i32;
                blend(pixmap, left + gx, top + gy, color, coverage);
            }

            cursor_x += metrics.advance_width;
        }
    }

    /// Draws `text` centered horizontally on `cx`.
    pub fn draw_centered(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        cx: f32,
        y: f32,
        size: f32,
        color: Color,
    ) {
        let width = self.measure_text(text, size);
        self.draw_text(pixmap, text, cx - width / 2.0, y, size, color);
    }

    pub fn measure_text(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|ch| self.font.metrics(ch, size).advance_width)
            .sum()
    }

    /// Largest size not above `max` at which `text` fits in `width` pixels.
    pub fn fit_size(&self, text: &str, width: f32, max: f32) -> f32 {
        scaled_size(self.measure_text(text, max), width, max)
    }
}

/// Shrinks `max` in proportion so a run measuring `natural` at `max` fits in
/// `width`. Never below one pixel.
fn scaled_size(natural: f32, width: f32, max: f32) -> f32 {
    if natural <= width || natural <= 0.0 {
        max
    } else {
        (max * width / natural).max(1.0)
    }
}

/// Source-over blend of one glyph pixel into the premultiplied pixmap.
fn blend(pixmap: &mut Pixmap, x: i32, y: i32, color: Color, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= pixmap.width() || y >= pixmap.height() {
        return;
    }
    let idx = (y * pixmap.width() + x) as usize;
    let Some(dst) = pixmap.pixels_mut().get_mut(idx) else {
        return;
    };

    let alpha = coverage * color.alpha();
    let inv = 1.0 - alpha;
    let mix = |src: f32, dst: u8| (src * alpha * 255.0 + f32::from(dst) * inv).round().min(255.0) as u8;
    let a = mix(1.0, dst.alpha());
    let r = mix(color.red(), dst.red()).min(a);
    let g = mix(color.green(), dst.green()).min(a);
    let b = mix(color.blue(), dst.blue()).min(a);
    if let Some(c) = PremultipliedColorU8::from_rgba(r, g, b, a) {
        *dst = c;
    }
}

/// Resolution assumed when the caller passes a DPI of zero.
pub const DEFAULT_DPI: u16 = 72;

/// Converts a point size to pixels at the given DPI.
pub fn pixel_size(size: u32, dpi: u16) -> f32 {
    let dpi = if dpi == 0 { DEFAULT_DPI } else { dpi };
    size as f32 * dpi as f32 / DEFAULT_DPI as f32
}

/// Layout metrics for a single glyph, in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    /// Horizontal pen advance.
    pub advance: i32,
    /// Offset from the pen position to the left edge of the bitmap.
    pub bearing_x: i32,
    /// Offset from the baseline up to the top edge of the bitmap.
    pub bearing_y: i32,
    pub width: u32,
    pub height: u32,
}

/// Rasterizer output: 8-bit coverage rows, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedGlyph {
    pub metrics: GlyphMetrics,
    pub bitmap: Vec<u8>,
}

impl RasterizedGlyph {
    pub fn width(&self) -> u32 {
        self.metrics.width
    }

    pub fn height(&self) -> u32 {
        self.metrics.height
    }

    /// True for glyphs with nothing to upload (spaces, control characters).
    pub fn is_empty(&self) -> bool {
        self.metrics.width == 0 || self.metrics.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size_default_dpi() {
        assert_eq!(pixel_size(32, 0), 32.0);
        assert_eq!(pixel_size(32, 72), 32.0);
    }

    #[test]
    fn test_pixel_size_scaled() {
        assert_eq!(pixel_size(12, 144), 24.0);
        assert_eq!(pixel_size(10, 96), 10.0 * 96.0 / 72.0);
    }

    #[test]
    fn test_rasterized_glyph_empty() {
        let glyph = RasterizedGlyph {
            metrics: GlyphMetrics {
                advance: 8,
                width: 0,
                height: 16,
                ..Default::default()
            },
            bitmap: Vec::new(),
        };
        assert!(glyph.is_empty());
    }
}

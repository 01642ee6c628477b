//! Deterministic stand-in for a real font library.
//!
//! Faces are declared up front by path, and every glyph is a solid block whose
//! dimensions follow the pixel size and whose fill byte follows the code point.
//! Individual code points can be overridden to exercise oversized, missing or
//! failing glyphs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ahash::RandomState;

use super::glyph::{pixel_size, GlyphMetrics, RasterizedGlyph};
use super::traits::GlyphRasterizer;
use crate::error::{FaceError, RasterizeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Override {
    Size { width: u32, height: u32 },
    Missing,
    Fail,
}

/// Handle returned by [`SyntheticRasterizer::load_face`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticFace {
    pub path: PathBuf,
    pub index: u32,
}

#[derive(Debug, Default)]
pub struct SyntheticRasterizer {
    faces: HashMap<PathBuf, u32, RandomState>,
    overrides: HashMap<char, Override, RandomState>,
    rasterize_calls: usize,
}

impl SyntheticRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a font file at `path` holding `face_count` faces.
    pub fn with_face(mut self, path: impl Into<PathBuf>, face_count: u32) -> Self {
        self.faces.insert(path.into(), face_count);
        self
    }

    /// Forces `ch` to rasterize to a `width`x`height` bitmap.
    pub fn with_glyph_size(mut self, ch: char, width: u32, height: u32) -> Self {
        self.overrides.insert(ch, Override::Size { width, height });
        self
    }

    /// Makes `ch` absent from every face.
    pub fn with_missing(mut self, ch: char) -> Self {
        self.overrides.insert(ch, Override::Missing);
        self
    }

    /// Makes rasterization of `ch` fail outright.
    pub fn with_failure(mut self, ch: char) -> Self {
        self.overrides.insert(ch, Override::Fail);
        self
    }

    /// Number of `rasterize` calls served so far.
    pub fn rasterize_calls(&self) -> usize {
        self.rasterize_calls
    }

    /// Byte every pixel of `ch`'s bitmap is filled with.
    pub fn fill_byte(ch: char) -> u8 {
        (ch as u32 % 255) as u8 + 1
    }

    fn metrics_for(&self, size: u32, dpi: u16, ch: char) -> GlyphMetrics {
        let px = pixel_size(size, dpi).round().max(1.0) as u32;

        let (width, height) = match self.overrides.get(&ch) {
            Some(Override::Size { width, height }) => (*width, *height),
            _ if ch.is_whitespace() => (0, 0),
            _ => ((px * 3 / 5).max(1), px),
        };

        let advance = if width == 0 { (px / 2) as i32 } else { width as i32 + 2 };
        GlyphMetrics {
            advance,
            bearing_x: 1,
            bearing_y: (height * 4 / 5) as i32,
            width,
            height,
        }
    }
}

impl GlyphRasterizer for SyntheticRasterizer {
    type Face = SyntheticFace;

    fn load_face(&mut self, path: &Path, face_index: u32) -> Result<SyntheticFace, FaceError> {
        let count = self.faces.get(path).copied().ok_or_else(|| FaceError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such font"),
        })?;

        if face_index >= count {
            return Err(FaceError::IndexOutOfRange {
                path: path.to_path_buf(),
                index: face_index,
            });
        }

        Ok(SyntheticFace {
            path: path.to_path_buf(),
            index: face_index,
        })
    }

    fn rasterize(
        &mut self,
        _face: &SyntheticFace,
        size: u32,
        dpi: u16,
        ch: char,
    ) -> Result<RasterizedGlyph, RasterizeError> {
        self.rasterize_calls += 1;

        match self.overrides.get(&ch) {
            Some(Override::Missing) => return Err(RasterizeError::MissingGlyph(ch)),
            Some(Override::Fail) => {
                return Err(RasterizeError::Failed {
                    ch,
                    reason: "synthetic failure".to_string(),
                })
            }
            _ => {}
        }

        let metrics = self.metrics_for(size, dpi, ch);
        let bitmap = vec![Self::fill_byte(ch); (metrics.width * metrics.height) as usize];
        Ok(RasterizedGlyph { metrics, bitmap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face() -> SyntheticFace {
        SyntheticFace {
            path: PathBuf::from("sans.ttf"),
            index: 0,
        }
    }

    #[test]
    fn test_load_declared_face() {
        let mut r = SyntheticRasterizer::new().with_face("sans.ttf", 2);
        assert!(r.load_face(Path::new("sans.ttf"), 1).is_ok());
        assert!(matches!(
            r.load_face(Path::new("sans.ttf"), 2),
            Err(FaceError::IndexOutOfRange { index: 2, .. })
        ));
        assert!(matches!(
            r.load_face(Path::new("serif.ttf"), 0),
            Err(FaceError::Io { .. })
        ));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let mut r = SyntheticRasterizer::new();
        let a = r.rasterize(&face(), 32, 0, 'A').unwrap();
        let b = r.rasterize(&face(), 32, 0, 'A').unwrap();
        assert_eq!(a, b);
        assert_eq!(a.metrics.height, 32);
        assert_eq!(a.metrics.width, 19);
        assert_eq!(a.metrics.advance, 21);
        assert!(a.bitmap.iter().all(|&p| p == SyntheticRasterizer::fill_byte('A')));
        assert_eq!(r.rasterize_calls(), 2);
    }

    #[test]
    fn test_whitespace_is_empty() {
        let mut r = SyntheticRasterizer::new();
        let space = r.rasterize(&face(), 32, 0, ' ').unwrap();
        assert!(space.is_empty());
        assert_eq!(space.metrics.advance, 16);
    }

    #[test]
    fn test_dpi_scales_size() {
        let mut r = SyntheticRasterizer::new();
        let glyph = r.rasterize(&face(), 16, 144, 'x').unwrap();
        assert_eq!(glyph.metrics.height, 32);
    }

    #[test]
    fn test_overrides() {
        let mut r = SyntheticRasterizer::new()
            .with_glyph_size('W', 600, 600)
            .with_missing('?')
            .with_failure('!');
        assert_eq!(r.rasterize(&face(), 32, 0, 'W').unwrap().width(), 600);
        assert_eq!(
            r.rasterize(&face(), 32, 0, '?'),
            Err(RasterizeError::MissingGlyph('?'))
        );
        assert!(matches!(
            r.rasterize(&face(), 32, 0, '!'),
            Err(RasterizeError::Failed { ch: '!', .. })
        ));
    }
}

use std::path::Path;

use super::glyph::RasterizedGlyph;
use crate::error::{FaceError, RasterizeError};

/// External font library seen by the cache.
///
/// `size` is in points and `dpi` is passed through untouched; `0` selects the
/// rasterizer's default resolution.
pub trait GlyphRasterizer {
    type Face;

    fn load_face(&mut self, path: &Path, face_index: u32) -> Result<Self::Face, FaceError>;

    fn rasterize(
        &mut self,
        face: &Self::Face,
        size: u32,
        dpi: u16,
        ch: char,
    ) -> Result<RasterizedGlyph, RasterizeError>;
}

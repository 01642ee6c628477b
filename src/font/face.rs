use std::fs;
use std::path::Path;

use fontdue::{Font, FontSettings, Metrics};

use super::glyph::{pixel_size, GlyphMetrics, RasterizedGlyph};
use super::traits::GlyphRasterizer;
use crate::error::{FaceError, RasterizeError};

const TTC_TAG: &[u8; 4] = b"ttcf";

/// Rasterizer backed by `fontdue`.
#[derive(Debug, Default)]
pub struct FontdueRasterizer;

impl FontdueRasterizer {
    pub fn new() -> Self {
        Self
    }
}

/// Number of faces stored in a font file: the TTC header count for
/// collections, one for a plain TrueType/OpenType file.
fn face_count(data: &[u8]) -> u32 {
    if data.len() >= 12 && &data[0..4] == TTC_TAG {
        u32::from_be_bytes([data[8], data[9], data[10], data[11]])
    } else {
        1
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    type Face = Font;

    fn load_face(&mut self, path: &Path, face_index: u32) -> Result<Font, FaceError> {
        let data = fs::read(path).map_err(|source| FaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if face_index >= face_count(&data) {
            return Err(FaceError::IndexOutOfRange {
                path: path.to_path_buf(),
                index: face_index,
            });
        }

        let settings = FontSettings {
            collection_index: face_index,
            ..FontSettings::default()
        };

        Font::from_bytes(data, settings).map_err(|reason| FaceError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })
    }

    fn rasterize(
        &mut self,
        face: &Font,
        size: u32,
        dpi: u16,
        ch: char,
    ) -> Result<RasterizedGlyph, RasterizeError> {
        require_glyph(ch, face.lookup_glyph_index(ch))?;
        let (metrics, bitmap) = face.rasterize(ch, pixel_size(size, dpi));
        to_glyph(ch, &metrics, bitmap)
    }
}

/// Glyph index 0 is `.notdef`, which fontdue returns for unmapped chars.
fn require_glyph(ch: char, glyph_index: u16) -> Result<(), RasterizeError> {
    if glyph_index == 0 {
        return Err(RasterizeError::MissingGlyph(ch));
    }
    Ok(())
}

fn to_glyph(ch: char, metrics: &Metrics, bitmap: Vec<u8>) -> Result<RasterizedGlyph, RasterizeError> {
    let width = metrics.width as u32;
    let height = metrics.height as u32;

    if bitmap.len() != (width * height) as usize {
        return Err(RasterizeError::Failed {
            ch,
            reason: format!(
                "bitmap holds {} bytes for a {}x{} glyph",
                bitmap.len(),
                width,
                height
            ),
        });
    }

    Ok(RasterizedGlyph {
        metrics: GlyphMetrics {
            advance: metrics.advance_width.round() as i32,
            bearing_x: metrics.xmin,
            // fontdue reports the bottom edge; convert to the top edge.
            bearing_y: metrics.ymin + height as i32,
            width,
            height,
        },
        bitmap,
    })
}

use std::path::PathBuf;

use compact_str::CompactString;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Page size must be greater than zero")]
    ZeroPageSize,
    #[error("Maximum page count must be greater than zero")]
    ZeroMaxPages,
    #[error("Padding {padding} leaves no room on a {page_size}px page")]
    PaddingTooLarge { padding: u32, page_size: u32 },
}

/// Failure to open or parse a font face.
#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    #[error("Failed to read font file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Face index {index} is out of range for {}", .path.display())]
    IndexOutOfRange { path: PathBuf, index: u32 },
    #[error("Failed to parse font {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("Font name already registered: {0}")]
    DuplicateName(CompactString),
    #[error(transparent)]
    Face(#[from] FaceError),
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RasterizeError {
    #[error("Face has no glyph for {0:?}")]
    MissingGlyph(char),
    #[error("Rasterizer failed for {ch:?}: {reason}")]
    Failed { ch: char, reason: String },
}

/// Per-glyph resolution failure.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GlyphError {
    #[error("Glyph {width}x{height} does not fit on a {page_size}px page")]
    OutOfSpace {
        width: u32,
        height: u32,
        page_size: u32,
    },
    #[error("Texture callback failed for page {page}")]
    TextureCallback { page: u32 },
    #[error("Unknown font id {0}")]
    UnknownFont(u32),
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("Invalid UTF-8 at byte {valid_up_to}")]
pub struct DecodeError {
    pub valid_up_to: usize,
}

impl From<std::str::Utf8Error> for DecodeError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self {
            valid_up_to: err.valid_up_to(),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum IterError {
    #[error("Font not registered: {0}")]
    UnknownFont(CompactString),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

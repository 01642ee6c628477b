mod face;
mod glyph;
mod registry;
pub mod synthetic;
mod traits;

pub use face::FontdueRasterizer;
pub use glyph::{pixel_size, GlyphMetrics, RasterizedGlyph, DEFAULT_DPI};
pub use registry::{Font, FontId, FontRegistry};
pub use synthetic::{SyntheticFace, SyntheticRasterizer};
pub use traits::GlyphRasterizer;

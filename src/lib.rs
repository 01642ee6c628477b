pub mod atlas;
pub mod cli;
pub mod config;
pub mod error;
pub mod font;
pub mod iter;
pub mod manager;
pub mod texture;

pub use atlas::{CacheStats, GlyphRecord};
pub use config::{AtlasConfig, Config};
pub use error::{ConfigError, DecodeError, FontLoadError, GlyphError, IterError};
pub use font::{FontId, FontdueRasterizer, GlyphRasterizer, SyntheticRasterizer};
pub use iter::{GlyphIterator, GlyphRenderInfo, GlyphRun, LayoutInfo, RenderInfo};
pub use manager::FontManager;
pub use texture::{MemoryTextures, TextureRegion, TextureSink};

use std::path::Path;

use crate::atlas::{CacheStats, GlyphCache, GlyphKey, GlyphRecord};
use crate::config::AtlasConfig;
use crate::error::{ConfigError, FontLoadError, GlyphError, IterError};
use crate::font::{FontId, FontRegistry, GlyphRasterizer};
use crate::iter::{GlyphIterator, GlyphRun};
use crate::texture::TextureSink;

/// Owns registered fonts, the glyph cache and every page texture.
///
/// Instances share nothing, so several managers can live side by side.
/// Teardown is explicit: call [`FontManager::deinit`] to release page
/// textures through the sink. Dropping a manager without it invokes no
/// callbacks.
pub struct FontManager<S: TextureSink, R: GlyphRasterizer> {
    config: AtlasConfig,
    sink: S,
    rasterizer: R,
    registry: FontRegistry<R::Face>,
    cache: GlyphCache,
}

impl<S: TextureSink, R: GlyphRasterizer> FontManager<S, R> {
    pub fn new(sink: S, rasterizer: R, config: AtlasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "Font manager with {}px pages, at most {} resident",
            config.page_size,
            config.max_pages
        );

        Ok(Self {
            config,
            sink,
            rasterizer,
            registry: FontRegistry::new(),
            cache: GlyphCache::new(config.page_size, config.max_pages, config.padding),
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn register_font(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        face_index: u32,
    ) -> Result<FontId, FontLoadError> {
        self.registry
            .register(&mut self.rasterizer, name, path.as_ref(), face_index)
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.registry.has(name)
    }

    pub fn font_id(&self, name: &str) -> Option<FontId> {
        self.registry.id(name)
    }

    /// Resolves one character through the glyph cache.
    pub fn resolve(
        &mut self,
        font: FontId,
        size: u32,
        dpi: u16,
        ch: char,
    ) -> Result<GlyphRecord, GlyphError> {
        let face = self
            .registry
            .get(font)
            .ok_or(GlyphError::UnknownFont(font.index()))?
            .face();
        let key = GlyphKey::new(font, size, dpi, ch);
        self.cache
            .resolve(&mut self.rasterizer, face, &mut self.sink, key)
    }

    /// Decodes `text` into a detached run over `face_name`.
    ///
    /// Fails without side effects on an unknown font or invalid UTF-8.
    pub fn glyph_run(
        &self,
        face_name: &str,
        size: u32,
        dpi: u16,
        text: impl AsRef<[u8]>,
    ) -> Result<GlyphRun, IterError> {
        let font = self
            .registry
            .id(face_name)
            .ok_or_else(|| IterError::UnknownFont(face_name.into()))?;
        Ok(GlyphRun::new(font, size, dpi, text.as_ref())?)
    }

    /// Begins iterating the glyphs of `text`. `dpi` may be 0 when unknown.
    pub fn glyph_iterator(
        &mut self,
        face_name: &str,
        size: u32,
        dpi: u16,
        text: impl AsRef<[u8]>,
    ) -> Result<GlyphIterator<'_, S, R>, IterError> {
        let run = self.glyph_run(face_name, size, dpi, text)?;
        Ok(GlyphIterator::new(self, run))
    }

    pub fn page_count(&self) -> usize {
        self.cache.pages().page_count()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Destroys every page texture and hands the sink back.
    pub fn deinit(mut self) -> S {
        let stats = self.cache.stats();
        let released = self.cache.destroy_all(&mut self.sink);
        log::info!(
            "Font manager shut down: {} fonts, {} pages released, {} hits / {} misses ({:.1}% hit rate), {} evictions",
            self.registry.len(),
            released,
            stats.hits,
            stats.misses,
            stats.hit_rate(),
            stats.evictions
        );
        self.sink
    }
}

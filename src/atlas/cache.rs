use std::collections::HashMap;

use ahash::RandomState;

use super::pages::{PageRef, PageTable};
use super::shelf::PixelRect;
use crate::error::{GlyphError, RasterizeError};
use crate::font::{FontId, GlyphMetrics, GlyphRasterizer};
use crate::texture::TextureSink;

/// Addresses one rasterization of one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub font: FontId,
    pub size: u32,
    pub dpi: u16,
    pub ch: char,
}

impl GlyphKey {
    pub fn new(font: FontId, size: u32, dpi: u16, ch: char) -> Self {
        Self { font, size, dpi, ch }
    }
}

/// A resolved glyph: where its bitmap lives and how to lay it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphRecord {
    /// `None` for glyphs without a bitmap.
    pub page: Option<PageRef>,
    /// Pixel rectangle inside the page; empty when `page` is `None`.
    pub rect: PixelRect,
    pub metrics: GlyphMetrics,
}

impl GlyphRecord {
    /// Zero-size stand-in for glyphs that could not be produced.
    pub fn missing() -> Self {
        Self::default()
    }

    fn empty(metrics: GlyphMetrics) -> Self {
        Self {
            page: None,
            rect: PixelRect::default(),
            metrics,
        }
    }

    pub fn is_resident(&self) -> bool {
        self.page.is_some()
    }

    /// Texture coordinates as `(top, left, bottom, right)`, normalized by `page_size`.
    pub fn uv(&self, page_size: u32) -> (f32, f32, f32, f32) {
        if self.page.is_none() || page_size == 0 {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let scale = page_size as f32;
        (
            self.rect.y as f32 / scale,
            self.rect.x as f32 / scale,
            self.rect.bottom() as f32 / scale,
            self.rect.right() as f32 / scale,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Glyph(GlyphRecord),
    /// Never fits on a page; remembered so it is not rasterized again.
    TooLarge { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries found pointing at an evicted page.
    pub stale: u64,
    pub uploads: u64,
    pub evictions: u64,
    pub resident_pages: usize,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Maps glyph keys to resident records, backed by a bounded page table.
///
/// Entries are unbounded in number. Evicting a page does not sweep the map;
/// records pointing at an old generation are dropped when next looked up.
pub struct GlyphCache {
    entries: HashMap<GlyphKey, Entry, RandomState>,
    pages: PageTable,
    hits: u64,
    misses: u64,
    stale: u64,
    uploads: u64,
}

impl GlyphCache {
    pub fn new(page_size: u32, max_pages: u32, padding: u32) -> Self {
        Self {
            entries: HashMap::default(),
            pages: PageTable::new(page_size, max_pages, padding),
            hits: 0,
            misses: 0,
            stale: 0,
            uploads: 0,
        }
    }

    pub fn pages(&self) -> &PageTable {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached record for `key`, rasterizing and uploading it on a miss.
    ///
    /// Every lookup completes before any page is evicted, and eviction only
    /// happens while placing a new bitmap.
    pub fn resolve<R, S>(
        &mut self,
        rasterizer: &mut R,
        face: &R::Face,
        sink: &mut S,
        key: GlyphKey,
    ) -> Result<GlyphRecord, GlyphError>
    where
        R: GlyphRasterizer,
        S: TextureSink,
    {
        if let Some(found) = self.lookup(key) {
            return found;
        }
        self.misses += 1;

        let glyph = match rasterizer.rasterize(face, key.size, key.dpi, key.ch) {
            Ok(glyph) => glyph,
            Err(err @ RasterizeError::MissingGlyph(_)) => {
                log::warn!("{}; substituting an empty glyph", err);
                let record = GlyphRecord::missing();
                self.entries.insert(key, Entry::Glyph(record));
                return Ok(record);
            }
            Err(err) => {
                log::warn!("{}; substituting an empty glyph", err);
                return Ok(GlyphRecord::missing());
            }
        };

        if glyph.is_empty() {
            let record = GlyphRecord::empty(glyph.metrics);
            self.entries.insert(key, Entry::Glyph(record));
            return Ok(record);
        }

        let (width, height) = (glyph.width(), glyph.height());
        let page_size = self.pages.page_size();
        if width > page_size || height > page_size {
            log::warn!(
                "{:?} at {}pt is {}x{}, larger than a {}px page",
                key.ch,
                key.size,
                width,
                height,
                page_size
            );
            self.entries.insert(key, Entry::TooLarge { width, height });
            return Err(GlyphError::OutOfSpace {
                width,
                height,
                page_size,
            });
        }

        let placement = self.pages.insert(sink, width, height, &glyph.bitmap)?;
        self.uploads += 1;

        let record = GlyphRecord {
            page: Some(placement.page),
            rect: placement.rect,
            metrics: glyph.metrics,
        };
        self.entries.insert(key, Entry::Glyph(record));
        Ok(record)
    }

    fn lookup(&mut self, key: GlyphKey) -> Option<Result<GlyphRecord, GlyphError>> {
        let entry = self.entries.get(&key).copied()?;

        match entry {
            Entry::TooLarge { width, height } => {
                self.hits += 1;
                Some(Err(GlyphError::OutOfSpace {
                    width,
                    height,
                    page_size: self.pages.page_size(),
                }))
            }
            Entry::Glyph(record) => match record.page {
                None => {
                    self.hits += 1;
                    Some(Ok(record))
                }
                Some(page) if self.pages.is_current(page) => {
                    self.hits += 1;
                    self.pages.touch(page.index);
                    Some(Ok(record))
                }
                Some(_) => {
                    self.stale += 1;
                    self.entries.remove(&key);
                    None
                }
            },
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            stale: self.stale,
            uploads: self.uploads,
            evictions: self.pages.evictions(),
            resident_pages: self.pages.page_count(),
            entries: self.entries.len(),
        }
    }

    /// Releases every page texture. The cache is empty afterwards.
    pub fn destroy_all<S: TextureSink>(&mut self, sink: &mut S) -> usize {
        self.entries.clear();
        self.pages.destroy_all(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{SyntheticFace, SyntheticRasterizer};
    use crate::texture::{MemoryTextures, TextureRegion};
    use std::path::PathBuf;

    fn face() -> SyntheticFace {
        SyntheticFace {
            path: PathBuf::from("sans.ttf"),
            index: 0,
        }
    }

    fn key(ch: char) -> GlyphKey {
        GlyphKey::new(FontId::from_index(0), 32, 0, ch)
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new();
        let mut sink = MemoryTextures::new();

        let first = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap();
        let second = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap();

        assert_eq!(first, second);
        assert_eq!(r.rasterize_calls(), 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.uploads), (1, 1, 1));
    }

    #[test]
    fn test_uploaded_pixels_match_bitmap() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new();
        let mut sink = MemoryTextures::new();

        let record = cache.resolve(&mut r, &face(), &mut sink, key('g')).unwrap();
        let page = sink.page(record.page.unwrap().index).unwrap();
        let fill = SyntheticRasterizer::fill_byte('g');
        assert_eq!(page.pixel(record.rect.x, record.rect.y), Some(fill));
        assert_eq!(
            page.pixel(record.rect.right() - 1, record.rect.bottom() - 1),
            Some(fill)
        );
        assert_eq!(page.pixel(record.rect.right(), record.rect.y), Some(0));
    }

    #[test]
    fn test_key_components_are_distinct() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new();
        let mut sink = MemoryTextures::new();

        let base = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap();
        let other_size = GlyphKey { size: 16, ..key('A') };
        let other_dpi = GlyphKey { dpi: 144, ..key('A') };
        let other_font = GlyphKey {
            font: FontId::from_index(1),
            ..key('A')
        };

        for k in [other_size, other_dpi, other_font] {
            let record = cache.resolve(&mut r, &face(), &mut sink, k).unwrap();
            assert_ne!(record.rect, base.rect);
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_space_takes_no_page() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new();
        let mut sink = MemoryTextures::new();

        let record = cache.resolve(&mut r, &face(), &mut sink, key(' ')).unwrap();
        assert!(!record.is_resident());
        assert!(record.rect.is_empty());
        assert_eq!(record.metrics.advance, 16);
        assert_eq!(sink.created(), 0);
        assert_eq!(record.uv(512), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_missing_glyph_substituted_and_cached() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new().with_missing('\u{E000}');
        let mut sink = MemoryTextures::new();

        let record = cache
            .resolve(&mut r, &face(), &mut sink, key('\u{E000}'))
            .unwrap();
        assert_eq!(record, GlyphRecord::missing());
        cache
            .resolve(&mut r, &face(), &mut sink, key('\u{E000}'))
            .unwrap();
        assert_eq!(r.rasterize_calls(), 1);
    }

    #[test]
    fn test_rasterizer_failure_not_cached() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new().with_failure('!');
        let mut sink = MemoryTextures::new();

        for _ in 0..2 {
            let record = cache.resolve(&mut r, &face(), &mut sink, key('!')).unwrap();
            assert_eq!(record, GlyphRecord::missing());
        }
        assert_eq!(r.rasterize_calls(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oversized_glyph_remembered() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new().with_glyph_size('W', 600, 600);
        let mut sink = MemoryTextures::new();

        for _ in 0..3 {
            let err = cache.resolve(&mut r, &face(), &mut sink, key('W')).unwrap_err();
            assert!(matches!(err, GlyphError::OutOfSpace { width: 600, .. }));
        }
        assert_eq!(r.rasterize_calls(), 1);
        assert_eq!(sink.created(), 0);
        assert_eq!(cache.pages().page_count(), 0);
    }

    struct RefusingSink;

    impl TextureSink for RefusingSink {
        fn create_texture(&mut self, _: u32, _: u32, _: u32, _: &[u8]) -> bool {
            false
        }

        fn destroy_texture(&mut self, _: u32) {}

        fn update_texture(&mut self, _: u32, _: TextureRegion, _: &[u8]) -> bool {
            true
        }
    }

    #[test]
    fn test_texture_failure_retried() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new();
        let mut sink = RefusingSink;

        for _ in 0..2 {
            let err = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap_err();
            assert_eq!(err, GlyphError::TextureCallback { page: 0 });
        }
        assert_eq!(r.rasterize_calls(), 2);
        assert!(cache.is_empty());
    }

    /// Creates pages but refuses every upload.
    #[derive(Default)]
    struct ReadOnlySink {
        inner: MemoryTextures,
    }

    impl TextureSink for ReadOnlySink {
        fn create_texture(&mut self, page: u32, w: u32, h: u32, initial: &[u8]) -> bool {
            self.inner.create_texture(page, w, h, initial)
        }

        fn destroy_texture(&mut self, page: u32) {
            self.inner.destroy_texture(page)
        }

        fn update_texture(&mut self, _: u32, _: TextureRegion, _: &[u8]) -> bool {
            false
        }
    }

    #[test]
    fn test_upload_failure_retried() {
        let mut cache = GlyphCache::new(512, 2, 1);
        let mut r = SyntheticRasterizer::new();
        let mut sink = ReadOnlySink::default();

        for attempt in 1..=3 {
            let err = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap_err();
            assert_eq!(err, GlyphError::TextureCallback { page: 0 });
            assert_eq!(r.rasterize_calls(), attempt);
        }
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.stats().uploads, 0);
        assert_eq!(cache.pages().page_count(), 0);
        assert_eq!(sink.inner.live_pages(), 0);
        assert_eq!(sink.inner.created(), 3);
    }

    #[test]
    fn test_stale_record_rerasterized_after_eviction() {
        // One page that holds exactly one 32px glyph.
        let mut cache = GlyphCache::new(32, 1, 0);
        let mut r = SyntheticRasterizer::new();
        let mut sink = MemoryTextures::new();

        let a1 = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap();
        let b = cache.resolve(&mut r, &face(), &mut sink, key('B')).unwrap();
        assert_eq!(b.page.unwrap().generation, 1);

        let a2 = cache.resolve(&mut r, &face(), &mut sink, key('A')).unwrap();
        assert_eq!(a2.page.unwrap().index, a1.page.unwrap().index);
        assert_ne!(a2.page.unwrap().generation, a1.page.unwrap().generation);
        assert_eq!(a2.metrics, a1.metrics);
        assert_eq!(r.rasterize_calls(), 3);

        let stats = cache.stats();
        assert_eq!(stats.stale, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(sink.destroyed(), 2);
    }

    #[test]
    fn test_uv_normalized() {
        let record = GlyphRecord {
            page: Some(PageRef {
                index: 0,
                generation: 0,
            }),
            rect: PixelRect {
                x: 128,
                y: 256,
                width: 64,
                height: 128,
            },
            metrics: GlyphMetrics::default(),
        };
        assert_eq!(record.uv(512), (0.5, 0.25, 0.75, 0.375));
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}

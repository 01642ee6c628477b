//! Forward-only glyph iteration over decoded text.
//!
//! A [`GlyphRun`] holds the decoded code points, a cursor and the pen
//! position. It does not borrow the manager, so a caller that serializes its
//! calls can interleave several runs. [`GlyphIterator`] pairs a run with a
//! borrowed manager for the common single-run case.
//!
//! Every code point yields exactly one glyph. Glyphs that cannot be produced
//! (oversized bitmaps, failed texture callbacks) are replaced by an empty
//! placeholder, so the yielded count always equals [`GlyphRun::num_glyphs`].

use crate::atlas::GlyphRecord;
use crate::error::DecodeError;
use crate::font::{FontId, GlyphRasterizer};
use crate::manager::FontManager;
use crate::texture::TextureSink;

/// Data needed to build the glyph's quad.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderInfo {
    /// Page holding the bitmap, `None` when there is nothing to draw.
    pub texture: Option<u32>,
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

/// Position and size of the glyph relative to the run origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutInfo {
    pub advance: i32,
    /// Pen position before this glyph plus its left bearing, saturating at
    /// the `i32` bounds.
    pub x_offset: i32,
    /// Baseline to the top edge of the bitmap, positive up.
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphRenderInfo {
    pub render: RenderInfo,
    pub layout: LayoutInfo,
}

impl GlyphRenderInfo {
    fn new(record: &GlyphRecord, pen_x: i32, page_size: u32) -> Self {
        let (top, left, bottom, right) = record.uv(page_size);
        Self {
            render: RenderInfo {
                texture: record.page.map(|page| page.index),
                top,
                left,
                bottom,
                right,
            },
            layout: LayoutInfo {
                advance: record.metrics.advance,
                x_offset: pen_x.saturating_add(record.metrics.bearing_x),
                y_offset: record.metrics.bearing_y,
                width: record.metrics.width,
                height: record.metrics.height,
            },
        }
    }
}

/// Iteration state for one string, detached from the manager.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    font: FontId,
    size: u32,
    dpi: u16,
    chars: Vec<char>,
    cursor: usize,
    pen_x: i32,
}

impl GlyphRun {
    pub(crate) fn new(font: FontId, size: u32, dpi: u16, text: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(text)?;
        Ok(Self {
            font,
            size,
            dpi,
            chars: text.chars().collect(),
            cursor: 0,
            pen_x: 0,
        })
    }

    pub fn font(&self) -> FontId {
        self.font
    }

    /// Total glyphs in the run, iterated or not.
    pub fn num_glyphs(&self) -> usize {
        self.chars.len()
    }

    pub fn remaining(&self) -> usize {
        self.chars.len() - self.cursor
    }

    /// Sum of the advances of every glyph yielded so far. The sum saturates
    /// instead of wrapping.
    pub fn pen_x(&self) -> i32 {
        self.pen_x
    }

    /// Resolves the next glyph into `out`. Returns `false` once exhausted.
    pub fn advance<S, R>(&mut self, manager: &mut FontManager<S, R>, out: &mut GlyphRenderInfo) -> bool
    where
        S: TextureSink,
        R: GlyphRasterizer,
    {
        let Some(&ch) = self.chars.get(self.cursor) else {
            return false;
        };
        self.cursor += 1;

        let record = match manager.resolve(self.font, self.size, self.dpi, ch) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("Skipping {:?} in glyph run: {}", ch, err);
                GlyphRecord::missing()
            }
        };

        *out = GlyphRenderInfo::new(&record, self.pen_x, manager.config().page_size);
        self.pen_x = self.pen_x.saturating_add(record.metrics.advance);
        true
    }
}

/// A [`GlyphRun`] bound to the manager it resolves through.
///
/// The borrow keeps the manager alive for as long as the iterator exists.
/// Release it with [`GlyphIterator::finish`].
pub struct GlyphIterator<'a, S: TextureSink, R: GlyphRasterizer> {
    manager: &'a mut FontManager<S, R>,
    run: GlyphRun,
}

impl<'a, S: TextureSink, R: GlyphRasterizer> GlyphIterator<'a, S, R> {
    pub(crate) fn new(manager: &'a mut FontManager<S, R>, run: GlyphRun) -> Self {
        Self { manager, run }
    }

    pub fn num_glyphs(&self) -> usize {
        self.run.num_glyphs()
    }

    pub fn remaining(&self) -> usize {
        self.run.remaining()
    }

    pub fn pen_x(&self) -> i32 {
        self.run.pen_x()
    }

    /// Writes the next glyph into `out`. Returns `false` once exhausted.
    pub fn next_into(&mut self, out: &mut GlyphRenderInfo) -> bool {
        self.run.advance(self.manager, out)
    }

    /// Ends iteration, returning the detached run state.
    pub fn finish(self) -> GlyphRun {
        self.run
    }
}

impl<S: TextureSink, R: GlyphRasterizer> Iterator for GlyphIterator<'_, S, R> {
    type Item = GlyphRenderInfo;

    fn next(&mut self) -> Option<GlyphRenderInfo> {
        let mut out = GlyphRenderInfo::default();
        self.next_into(&mut out).then_some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.run.remaining();
        (remaining, Some(remaining))
    }
}

impl<S: TextureSink, R: GlyphRasterizer> ExactSizeIterator for GlyphIterator<'_, S, R> {}

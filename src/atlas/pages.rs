use super::shelf::{PixelRect, ShelfAllocator};
use crate::error::GlyphError;
use crate::texture::{TextureRegion, TextureSink};

/// Lifecycle of a resident page. Pages that do not exist have no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Accepts placements.
    Active,
    /// A placement failed; no further placements until eviction.
    Full,
}

/// Identifies one incarnation of a page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRef {
    pub index: u32,
    pub generation: u32,
}

#[derive(Debug)]
pub struct Page {
    index: u32,
    generation: u32,
    state: PageState,
    allocator: ShelfAllocator,
    last_used: u64,
}

impl Page {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn glyph_count(&self) -> u32 {
        self.allocator.placements()
    }

    pub fn used_area(&self) -> u64 {
        self.allocator.used_area()
    }

    pub fn occupancy(&self) -> f32 {
        self.allocator.occupancy()
    }
}

#[derive(Debug, Default)]
struct Slot {
    /// Survives eviction so stale references can be told apart.
    generation: u32,
    page: Option<Page>,
}

/// Where an uploaded bitmap ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub page: PageRef,
    pub rect: PixelRect,
}

/// Owns the bounded set of pages and every texture callback.
#[derive(Debug)]
pub struct PageTable {
    page_size: u32,
    max_pages: u32,
    padding: u32,
    slots: Vec<Slot>,
    tick: u64,
    evictions: u64,
}

impl PageTable {
    pub fn new(page_size: u32, max_pages: u32, padding: u32) -> Self {
        Self {
            page_size,
            max_pages,
            padding,
            slots: Vec::new(),
            tick: 0,
            evictions: 0,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn page_count(&self) -> usize {
        self.pages().count()
    }

    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.slots.iter().filter_map(|slot| slot.page.as_ref())
    }

    pub fn page(&self, index: u32) -> Option<&Page> {
        self.slots.get(index as usize)?.page.as_ref()
    }

    /// True while `page` still names a resident incarnation.
    pub fn is_current(&self, page: PageRef) -> bool {
        self.page(page.index)
            .is_some_and(|p| p.generation == page.generation)
    }

    /// Marks a page as just used, for LRU ordering.
    pub fn touch(&mut self, index: u32) {
        self.tick += 1;
        let tick = self.tick;
        if let Some(page) = self.page_mut(index) {
            page.last_used = tick;
        }
    }

    /// Places and uploads a `width`x`height` bitmap, creating or evicting a
    /// page when no active page has room.
    ///
    /// Nothing is committed to a page unless its `update_texture` succeeds.
    /// A page created for this bitmap is destroyed again when its upload
    /// fails; an eviction made to free its slot stands.
    pub fn insert<S: TextureSink>(
        &mut self,
        sink: &mut S,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Placement, GlyphError> {
        if width > self.page_size || height > self.page_size {
            return Err(GlyphError::OutOfSpace {
                width,
                height,
                page_size: self.page_size,
            });
        }

        let (index, fresh) = match self.find_active(width, height) {
            Some(index) => (index, false),
            None => (self.acquire_page(sink)?, true),
        };

        let placed = self.upload(sink, index, width, height, pixels);
        if placed.is_err() && fresh {
            self.discard(sink, index);
        }
        placed
    }

    fn find_active(&mut self, width: u32, height: u32) -> Option<u32> {
        for slot in &mut self.slots {
            let Some(page) = slot.page.as_mut() else {
                continue;
            };
            if page.state != PageState::Active {
                continue;
            }
            if page.allocator.reserve(width, height).is_some() {
                return Some(page.index);
            }
            log::debug!(
                "Page {} full after {} glyphs ({:.0}% used)",
                page.index,
                page.glyph_count(),
                page.occupancy() * 100.0
            );
            page.state = PageState::Full;
        }
        None
    }

    /// Returns the index of a fresh, empty page.
    fn acquire_page<S: TextureSink>(&mut self, sink: &mut S) -> Result<u32, GlyphError> {
        let index = match self.free_index() {
            Some(index) => index,
            None => self.evict(sink),
        };
        self.create_page(sink, index)?;
        Ok(index)
    }

    fn free_index(&self) -> Option<u32> {
        if let Some(pos) = self.slots.iter().position(|slot| slot.page.is_none()) {
            return Some(pos as u32);
        }
        if (self.slots.len() as u64) < self.max_pages as u64 {
            return Some(self.slots.len() as u32);
        }
        None
    }

    /// Least recently used page, then least occupied, then lowest index.
    fn victim(&self) -> Option<u32> {
        self.pages()
            .min_by_key(|page| (page.last_used, page.used_area(), page.index))
            .map(Page::index)
    }

    fn evict<S: TextureSink>(&mut self, sink: &mut S) -> u32 {
        // The table is full, so there is always a resident page to pick.
        let index = self.victim().unwrap_or(0);
        let slot = &mut self.slots[index as usize];

        if let Some(page) = slot.page.take() {
            log::debug!(
                "Evicting page {} (generation {}, {} glyphs)",
                index,
                page.generation,
                page.glyph_count()
            );
            sink.destroy_texture(index);
            slot.generation = slot.generation.wrapping_add(1);
            self.evictions += 1;
        }
        index
    }

    fn create_page<S: TextureSink>(&mut self, sink: &mut S, index: u32) -> Result<(), GlyphError> {
        let size = self.page_size;
        let initial = vec![0u8; size as usize * size as usize];

        if !sink.create_texture(index, size, size, &initial) {
            log::warn!("create_texture failed for page {}", index);
            return Err(GlyphError::TextureCallback { page: index });
        }

        while self.slots.len() <= index as usize {
            self.slots.push(Slot::default());
        }
        let slot = &mut self.slots[index as usize];
        log::debug!("Created page {} (generation {})", index, slot.generation);
        slot.page = Some(Page {
            index,
            generation: slot.generation,
            state: PageState::Active,
            allocator: ShelfAllocator::new(size, self.padding),
            last_used: self.tick,
        });
        Ok(())
    }

    /// Releases a page that never received a glyph.
    fn discard<S: TextureSink>(&mut self, sink: &mut S, index: u32) {
        let Some(slot) = self.slots.get_mut(index as usize) else {
            return;
        };
        if slot.page.take().is_some() {
            log::debug!("Releasing empty page {} after a failed upload", index);
            sink.destroy_texture(index);
        }
    }

    fn upload<S: TextureSink>(
        &mut self,
        sink: &mut S,
        index: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Placement, GlyphError> {
        self.tick += 1;
        let tick = self.tick;
        let page_size = self.page_size;

        let page = self
            .page_mut(index)
            .ok_or(GlyphError::TextureCallback { page: index })?;
        let reservation = page
            .allocator
            .reserve(width, height)
            .ok_or(GlyphError::OutOfSpace {
                width,
                height,
                page_size,
            })?;

        let rect = reservation.rect;
        let region = TextureRegion {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        };
        if !sink.update_texture(index, region, pixels) {
            log::warn!("update_texture failed for page {} at {:?}", index, region);
            return Err(GlyphError::TextureCallback { page: index });
        }

        page.allocator.commit(reservation);
        page.last_used = tick;

        Ok(Placement {
            page: PageRef {
                index,
                generation: page.generation,
            },
            rect,
        })
    }

    /// Destroys every resident page texture, returning how many were released.
    pub fn destroy_all<S: TextureSink>(&mut self, sink: &mut S) -> usize {
        let mut released = 0;
        for slot in &mut self.slots {
            if let Some(page) = slot.page.take() {
                sink.destroy_texture(page.index);
                released += 1;
            }
        }
        released
    }

    fn page_mut(&mut self, index: u32) -> Option<&mut Page> {
        self.slots.get_mut(index as usize)?.page.as_mut()
    }
}

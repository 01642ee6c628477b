//! Texture storage seen through the caller's callbacks.
//!
//! The manager never touches GPU memory itself. It tells a [`TextureSink`]
//! when a page texture must exist, when a region of it was written, and when
//! it can be released. Every call happens synchronously on the thread that
//! triggered the glyph resolution.

use std::collections::HashMap;

use ahash::RandomState;

/// Region of a page written by one glyph upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub trait TextureSink {
    /// Allocates the backing texture for `page`. `initial` holds
    /// `width * height` zeroed coverage bytes.
    fn create_texture(&mut self, page: u32, width: u32, height: u32, initial: &[u8]) -> bool;

    /// Releases the texture of an evicted page.
    fn destroy_texture(&mut self, page: u32);

    /// Writes `pixels` (tightly packed 8-bit rows of `region.width`) into `page`.
    fn update_texture(&mut self, page: u32, region: TextureRegion, pixels: &[u8]) -> bool;
}

impl<T: TextureSink + ?Sized> TextureSink for &mut T {
    fn create_texture(&mut self, page: u32, width: u32, height: u32, initial: &[u8]) -> bool {
        (**self).create_texture(page, width, height, initial)
    }

    fn destroy_texture(&mut self, page: u32) {
        (**self).destroy_texture(page)
    }

    fn update_texture(&mut self, page: u32, region: TextureRegion, pixels: &[u8]) -> bool {
        (**self).update_texture(page, region, pixels)
    }
}

/// CPU-side page texture.
#[derive(Debug, Clone)]
pub struct TexturePage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TexturePage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }
}

/// Sink that keeps every page in memory.
#[derive(Debug, Default)]
pub struct MemoryTextures {
    pages: HashMap<u32, TexturePage, RandomState>,
    created: u64,
    destroyed: u64,
    updated: u64,
}

impl MemoryTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, page: u32) -> Option<&TexturePage> {
        self.pages.get(&page)
    }

    pub fn live_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    pub fn updated(&self) -> u64 {
        self.updated
    }
}

impl TextureSink for MemoryTextures {
    fn create_texture(&mut self, page: u32, width: u32, height: u32, initial: &[u8]) -> bool {
        if initial.len() != (width as usize) * (height as usize) {
            log::warn!("Initial data for page {} has wrong length {}", page, initial.len());
            return false;
        }
        if self.pages.contains_key(&page) {
            log::warn!("Page {} created twice without being destroyed", page);
            return false;
        }

        self.pages.insert(
            page,
            TexturePage {
                width,
                height,
                pixels: initial.to_vec(),
            },
        );
        self.created += 1;
        true
    }

    fn destroy_texture(&mut self, page: u32) {
        if self.pages.remove(&page).is_some() {
            self.destroyed += 1;
        }
    }

    fn update_texture(&mut self, page: u32, region: TextureRegion, pixels: &[u8]) -> bool {
        let Some(target) = self.pages.get_mut(&page) else {
            return false;
        };
        if region.x + region.width > target.width
            || region.y + region.height > target.height
            || pixels.len() != (region.width * region.height) as usize
        {
            return false;
        }

        let row_len = region.width as usize;
        for (row, src) in pixels.chunks_exact(row_len.max(1)).enumerate() {
            let start = ((region.y as usize + row) * target.width as usize) + region.x as usize;
            target.pixels[start..start + row_len].copy_from_slice(src);
        }
        self.updated += 1;
        true
    }
}

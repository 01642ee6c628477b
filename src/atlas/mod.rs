mod cache;
mod pages;
mod shelf;

pub use cache::{CacheStats, GlyphCache, GlyphKey, GlyphRecord};
pub use pages::{Page, PageRef, PageState, PageTable, Placement};
pub use shelf::{PixelRect, Reservation, ShelfAllocator};

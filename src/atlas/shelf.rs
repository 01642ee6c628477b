/// Rectangle in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shelf {
    y: u32,
    height: u32,
    cursor_x: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Existing shelf, with its height after the placement.
    Shelf { index: usize, height: u32 },
    NewShelf,
}

/// A placement found by [`ShelfAllocator::reserve`] but not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub rect: PixelRect,
    target: Target,
}

/// Row-based packer for one square page.
///
/// Only the last shelf may still grow in height; earlier shelves are closed
/// and accept glyphs no taller than themselves.
#[derive(Debug, Clone)]
pub struct ShelfAllocator {
    size: u32,
    padding: u32,
    shelves: Vec<Shelf>,
    used_area: u64,
    placements: u32,
}

impl ShelfAllocator {
    pub fn new(size: u32, padding: u32) -> Self {
        Self {
            size,
            padding,
            shelves: Vec::new(),
            used_area: 0,
            placements: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Finds room for a `width`x`height` bitmap without touching the page.
    pub fn reserve(&self, width: u32, height: u32) -> Option<Reservation> {
        if width == 0 || height == 0 || width > self.size || height > self.size {
            return None;
        }

        let open = self.shelves.len().checked_sub(1);

        for (index, shelf) in self.shelves.iter().enumerate() {
            if shelf.cursor_x + width > self.size {
                continue;
            }
            let grown = if Some(index) == open {
                shelf.height.max(height)
            } else if height <= shelf.height {
                shelf.height
            } else {
                continue;
            };
            if shelf.y + grown > self.size {
                continue;
            }
            return Some(Reservation {
                rect: PixelRect {
                    x: shelf.cursor_x,
                    y: shelf.y,
                    width,
                    height,
                },
                target: Target::Shelf {
                    index,
                    height: grown,
                },
            });
        }

        let y = match self.shelves.last() {
            Some(last) => last.y + last.height + self.padding,
            None => 0,
        };
        if y + height > self.size {
            return None;
        }

        Some(Reservation {
            rect: PixelRect {
                x: 0,
                y,
                width,
                height,
            },
            target: Target::NewShelf,
        })
    }

    /// Applies a reservation obtained from this allocator in its current state.
    pub fn commit(&mut self, reservation: Reservation) {
        let rect = reservation.rect;
        match reservation.target {
            Target::Shelf { index, height } => {
                let shelf = &mut self.shelves[index];
                shelf.cursor_x = rect.right() + self.padding;
                shelf.height = height;
            }
            Target::NewShelf => self.shelves.push(Shelf {
                y: rect.y,
                height: rect.height,
                cursor_x: rect.right() + self.padding,
            }),
        }
        self.used_area += rect.area();
        self.placements += 1;
    }

    /// Packs a bitmap, returning where it landed.
    pub fn try_place(&mut self, width: u32, height: u32) -> Option<PixelRect> {
        let reservation = self.reserve(width, height)?;
        self.commit(reservation);
        Some(reservation.rect)
    }

    /// Forgets every placement.
    pub fn reset(&mut self) {
        self.shelves.clear();
        self.used_area = 0;
        self.placements = 0;
    }

    /// Pixel area covered by placed bitmaps, padding excluded.
    pub fn used_area(&self) -> u64 {
        self.used_area
    }

    pub fn placements(&self) -> u32 {
        self.placements
    }

    pub fn occupancy(&self) -> f32 {
        self.used_area as f32 / (self.size as f32 * self.size as f32)
    }
}

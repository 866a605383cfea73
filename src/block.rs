//! Rectangular block model.
//!
//! A [`Block`] is an axis-aligned rectangle with a fixed shape and an
//! optional position inside the strip. Coordinates are inclusive integer
//! cells: a block at `(left, bottom)` covers columns `left..=right` and rows
//! `bottom..=top` where `right = left + width - 1` and
//! `top = bottom + height - 1`.

/// Position of a placed block (bottom-left cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub left: u32,
    pub bottom: u32,
}

/// A rectangular block, optionally placed inside the strip.
///
/// Blocks are value types: every layout owns its own copies and repositions
/// them independently. The id is unique within one problem instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: u16,
    width: u32,
    height: u32,
    position: Option<Position>,
}

impl Block {
    /// Creates an unplaced block. Width and height must be positive.
    pub fn new(id: u16, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            position: None,
        }
    }

    /// Creates a block already placed at `(left, bottom)`.
    pub fn placed(id: u16, width: u32, height: u32, left: u32, bottom: u32) -> Self {
        let mut block = Self::new(id, width, height);
        block.localize(left, bottom);
        block
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell area of the block, fixed at construction (rotation preserves it).
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn left(&self) -> Option<u32> {
        self.position.map(|p| p.left)
    }

    pub fn bottom(&self) -> Option<u32> {
        self.position.map(|p| p.bottom)
    }

    pub fn right(&self) -> Option<u32> {
        self.position.map(|p| p.left + self.width - 1)
    }

    pub fn top(&self) -> Option<u32> {
        self.position.map(|p| p.bottom + self.height - 1)
    }

    /// Sets or overwrites the block's position. Total: the caller supplies
    /// coordinates within strip bounds.
    pub fn localize(&mut self, left: u32, bottom: u32) {
        self.position = Some(Position { left, bottom });
    }

    /// Rotates the block 90°, swapping width and height. A placed block is
    /// re-localized at the same bottom-left cell. Involutive.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        if let Some(p) = self.position {
            self.localize(p.left, p.bottom);
        }
    }

    /// Overlap area of two blocks in cells; 0 when either is unplaced.
    pub fn intersection_area(&self, other: &Block) -> u64 {
        let (Some(a), Some(b)) = (self.position, other.position) else {
            return 0;
        };
        let x_min = a.left.max(b.left) as i64;
        let y_min = a.bottom.max(b.bottom) as i64;
        let x_max = (a.left + self.width - 1).min(b.left + other.width - 1) as i64;
        let y_max = (a.bottom + self.height - 1).min(b.bottom + other.height - 1) as i64;
        let dx = (x_max - x_min + 1).max(0) as u64;
        let dy = (y_max - y_min + 1).max(0) as u64;
        dx * dy
    }

    pub fn intersects(&self, other: &Block) -> bool {
        self.intersection_area(other) > 0
    }
}

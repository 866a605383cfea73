//! Occupancy model of one candidate layout.
//!
//! A [`Space`] is a fixed-width vertical strip with an occupancy grid and an
//! ordered list of placed blocks. It answers overlap and placement-order
//! validity queries and maintains the derived occupied height and free area.
//!
//! Blocks are never removed: a layout is deep-cloned or rebuilt instead.
//! The single exception is [`Space::relocate`], which restamps one block in
//! place after the new position has already passed the validity query.

use serde::Serialize;

use crate::block::Block;
use crate::error::{Error, Result};

/// One entry of a layout's genotype: a placed block as an
/// `(id, left, bottom)` triple, in placement order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gene {
    pub id: u16,
    pub left: u32,
    pub bottom: u32,
}

/// Workspace the blocks are placed into.
#[derive(Debug, Clone)]
pub struct Space {
    width: u32,
    max_height: u32,
    min_height: u32,
    /// Row-major occupancy grid of `max_height` rows. Cells hold the id of
    /// the occupying block, or 0 when free.
    grid: Vec<u16>,
    blocks_in: Vec<Block>,
    occupied_height: u32,
    /// Bounding-rectangle area minus the sum of placed block areas. Signed
    /// so that corruption (overlap that slipped through) is detectable.
    free_area: i64,
}

impl Space {
    /// Creates an empty space sized for the given block set.
    ///
    /// The grid height is `3 × Σ max(width, height)`, a generous upper bound
    /// that placement can never exhaust. `min_height` is the informational
    /// lower bound `Σ min(width, height)`; it is not enforced.
    pub fn new(width: u32, all_blocks: &[Block]) -> Self {
        let max_height: u32 = all_blocks
            .iter()
            .map(|b| b.width().max(b.height()))
            .sum::<u32>()
            * 3;
        let min_height: u32 = all_blocks.iter().map(|b| b.width().min(b.height())).sum();
        log::trace!("max height: {max_height}, min height: {min_height}");
        Self {
            width,
            max_height,
            min_height,
            grid: vec![0; width as usize * max_height as usize],
            blocks_in: Vec::with_capacity(all_blocks.len()),
            occupied_height: 0,
            free_area: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn min_height(&self) -> u32 {
        self.min_height
    }

    /// Height of the layout: max `top + 1` over placed blocks.
    pub fn occupied_height(&self) -> u32 {
        self.occupied_height
    }

    pub fn free_area(&self) -> i64 {
        self.free_area
    }

    /// Placed blocks, in placement order.
    pub fn blocks_in(&self) -> &[Block] {
        &self.blocks_in
    }

    /// The layout's genotype, derived from the placed blocks on demand so it
    /// can never go stale.
    pub fn genotype(&self) -> Vec<Gene> {
        self.blocks_in
            .iter()
            .map(|b| Gene {
                id: b.id(),
                left: b.left().unwrap_or(0),
                bottom: b.bottom().unwrap_or(0),
            })
            .collect()
    }

    /// Fitness of the layout (occupied height, lower is better).
    ///
    /// Errors if the free area went negative, which signals a corrupted
    /// space: overlapping or invalid placements slipped past the validity
    /// checks. Such a run must abort rather than silently continue.
    pub fn fitness(&self) -> Result<u32> {
        if self.free_area < 0 {
            return Err(Error::CorruptedLayout {
                free_area: self.free_area,
                occupied_height: self.occupied_height,
                width: self.width,
            });
        }
        Ok(self.occupied_height)
    }

    /// Appends a placed block, stamps the grid and recomputes the derived
    /// values. The block must already hold a position inside the strip; a
    /// block reaching past the right edge is rejected before stamping, since
    /// its cells would wrap into the row above.
    pub fn add_block(&mut self, block: Block) -> Result<()> {
        let Some(right) = block.right() else {
            return Err(Error::UnplacedBlock { id: block.id() });
        };
        if right >= self.width {
            return Err(Error::OutOfStrip {
                id: block.id(),
                left: block.left().unwrap_or(0),
                right,
                width: self.width,
            });
        }
        self.stamp(&block, block.id());
        self.blocks_in.push(block);
        self.recompute();
        Ok(())
    }

    /// Moves the block at `index` to `(left, bottom)`, restamping the grid
    /// and recomputing height and free area. Only call after the new
    /// placement has passed [`Space::is_valid_placement`].
    pub fn relocate(&mut self, index: usize, left: u32, bottom: u32) {
        let mut block = self.blocks_in[index].clone();
        self.stamp(&block, 0);
        block.localize(left, bottom);
        self.stamp(&block, block.id());
        self.blocks_in[index] = block;
        self.recompute();
    }

    /// Placement-order invariant: block ids must stack in non-decreasing
    /// baseline order. A placed block with the candidate's own id is the
    /// slot being replaced and is skipped.
    ///
    /// The check is symmetric (a lower-id block must not sit above the
    /// candidate, and the candidate must not sit above a higher-id block) so
    /// the pairwise invariant holds for every valid space, including after a
    /// relocation.
    pub fn order_valid(&self, candidate: &Block) -> bool {
        let Some(candidate_bottom) = candidate.bottom() else {
            return false;
        };
        for block in &self.blocks_in {
            if block.id() == candidate.id() {
                continue;
            }
            let bottom = block.bottom().unwrap_or(0);
            if block.id() < candidate.id() && bottom > candidate_bottom {
                return false;
            }
            if block.id() > candidate.id() && bottom < candidate_bottom {
                return false;
            }
        }
        true
    }

    /// Full validity query for a candidate placement: no overlap with any
    /// other placed block, and the placement-order invariant holds. The two
    /// conditions are independent and both required.
    pub fn is_valid_placement(&self, candidate: &Block) -> bool {
        for block in &self.blocks_in {
            if block.id() != candidate.id() && candidate.intersects(block) {
                return false;
            }
        }
        self.order_valid(candidate)
    }

    /// Scans grid rows bottom-up and returns the first row holding
    /// `block.width` contiguous free cells, if any. Heuristic hint only;
    /// never used for placement validity.
    pub fn lowest_fitting_row(&self, block: &Block) -> Option<u32> {
        let width = self.width as usize;
        let needed = block.width() as usize;
        for row in 0..self.max_height as usize {
            let cells = &self.grid[row * width..(row + 1) * width];
            let mut run = 0usize;
            for &cell in cells {
                if cell == 0 {
                    run += 1;
                    if run == needed {
                        return Some(row as u32);
                    }
                } else {
                    run = 0;
                }
            }
        }
        None
    }

    /// Renders the occupied part of the strip as text, top row first.
    /// Debug aid; `.` marks a free cell, ids print modulo 10.
    pub fn render(&self) -> String {
        let width = self.width as usize;
        let rows = self.occupied_height.max(1) as usize;
        let mut out = String::with_capacity(rows * (width + 1));
        for row in (0..rows.min(self.max_height as usize)).rev() {
            for &cell in &self.grid[row * width..(row + 1) * width] {
                if cell == 0 {
                    out.push('.');
                } else {
                    out.push(char::from_digit((cell % 10) as u32, 10).unwrap_or('#'));
                }
            }
            out.push('\n');
        }
        out
    }

    fn stamp(&mut self, block: &Block, value: u16) {
        let (Some(pos), Some(top)) = (block.position(), block.top()) else {
            return;
        };
        let width = self.width as usize;
        let top_row = (top + 1).min(self.max_height);
        for row in pos.bottom..top_row {
            let base = row as usize * width;
            for col in pos.left..pos.left + block.width() {
                self.grid[base + col as usize] = value;
            }
        }
    }

    fn recompute(&mut self) {
        self.occupied_height = self
            .blocks_in
            .iter()
            .filter_map(|b| b.top())
            .map(|t| t + 1)
            .max()
            .unwrap_or(0);
        let bounding = self.width as i64 * self.occupied_height as i64;
        let placed: i64 = self.blocks_in.iter().map(|b| b.area() as i64).sum();
        self.free_area = bounding - placed;
        log::trace!(
            "occupied height: {}, free area: {}",
            self.occupied_height,
            self.free_area
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks() -> Vec<Block> {
        vec![Block::new(1, 3, 2), Block::new(2, 2, 2), Block::new(3, 4, 1)]
    }

    #[test]
    fn test_new_space_bounds() {
        let space = Space::new(10, &blocks());
        // 3 * (3 + 2 + 4) and 2 + 2 + 1.
        assert_eq!(space.max_height(), 27);
        assert_eq!(space.min_height(), 5);
        assert_eq!(space.occupied_height(), 0);
        assert_eq!(space.free_area(), 0);
    }

    #[test]
    fn test_add_block_updates_derived_values() {
        let mut space = Space::new(10, &blocks());
        space.add_block(Block::placed(1, 3, 2, 0, 0)).unwrap();
        assert_eq!(space.occupied_height(), 2);
        assert_eq!(space.free_area(), 20 - 6);

        space.add_block(Block::placed(2, 2, 2, 5, 1)).unwrap();
        assert_eq!(space.occupied_height(), 3);
        assert_eq!(space.free_area(), 30 - 6 - 4);
        assert_eq!(space.blocks_in().len(), 2);
    }

    #[test]
    fn test_add_unplaced_block_fails() {
        let mut space = Space::new(10, &blocks());
        let err = space.add_block(Block::new(1, 3, 2)).unwrap_err();
        assert!(matches!(err, Error::UnplacedBlock { id: 1 }));
    }

    #[test]
    fn test_add_block_past_right_edge_is_rejected() {
        let mut space = Space::new(5, &[Block::new(1, 3, 1)]);
        // Columns 3..=5 in a width-5 strip: the last cell would wrap into
        // row 1 column 0 through the row-major grid.
        let err = space.add_block(Block::placed(1, 3, 1, 3, 0)).unwrap_err();
        assert!(matches!(err, Error::OutOfStrip { id: 1, right: 5, .. }));
        assert!(space.blocks_in().is_empty());
        // Every row must still be fully free.
        assert_eq!(space.lowest_fitting_row(&Block::new(9, 5, 1)), Some(0));
    }

    #[test]
    fn test_grid_cells_hold_block_ids() {
        let mut space = Space::new(10, &blocks());
        space.add_block(Block::placed(2, 2, 2, 3, 0)).unwrap();
        let rendered = space.render();
        // Two rows, block id 2 stamped at columns 3..=4.
        assert_eq!(rendered, "...22.....\n...22.....\n");
    }

    #[test]
    fn test_order_valid_symmetric() {
        let mut space = Space::new(10, &blocks());
        space.add_block(Block::placed(1, 3, 2, 0, 1)).unwrap();
        space.add_block(Block::placed(2, 2, 2, 5, 3)).unwrap();

        // Higher id below a lower id's baseline: invalid.
        assert!(!space.order_valid(&Block::placed(3, 4, 1, 0, 0)));
        // Candidate above every lower id: valid.
        assert!(space.order_valid(&Block::placed(3, 4, 1, 0, 4)));
        // Relocating block 1 above block 2's baseline: invalid.
        assert!(!space.order_valid(&Block::placed(1, 3, 2, 0, 5)));
        // Same id as an existing slot is the slot being replaced.
        assert!(space.order_valid(&Block::placed(2, 2, 2, 0, 2)));
    }

    #[test]
    fn test_is_valid_placement_rejects_overlap() {
        let mut space = Space::new(10, &blocks());
        space.add_block(Block::placed(1, 3, 2, 0, 0)).unwrap();
        assert!(!space.is_valid_placement(&Block::placed(2, 2, 2, 1, 1)));
        assert!(space.is_valid_placement(&Block::placed(2, 2, 2, 4, 0)));
    }

    #[test]
    fn test_relocate_restamps_and_recomputes() {
        let mut space = Space::new(10, &blocks());
        space.add_block(Block::placed(1, 3, 2, 0, 0)).unwrap();
        space.add_block(Block::placed(2, 2, 2, 5, 4)).unwrap();
        assert_eq!(space.occupied_height(), 6);

        let candidate = Block::placed(2, 2, 2, 5, 0);
        assert!(space.is_valid_placement(&candidate));
        space.relocate(1, 5, 0);
        assert_eq!(space.occupied_height(), 2);
        assert_eq!(space.blocks_in()[1].bottom(), Some(0));
        // Old cells must be cleared.
        assert_eq!(space.lowest_fitting_row(&Block::new(9, 10, 1)), Some(2));
    }

    #[test]
    fn test_lowest_fitting_row() {
        let mut space = Space::new(5, &blocks());
        space.add_block(Block::placed(1, 4, 1, 0, 0)).unwrap();
        // Row 0 has a single free cell, row 1 is fully free.
        assert_eq!(space.lowest_fitting_row(&Block::new(9, 1, 1)), Some(0));
        assert_eq!(space.lowest_fitting_row(&Block::new(9, 2, 1)), Some(1));
    }

    #[test]
    fn test_genotype_matches_placement_order() {
        let mut space = Space::new(10, &blocks());
        space.add_block(Block::placed(1, 3, 2, 2, 0)).unwrap();
        space.add_block(Block::placed(2, 2, 2, 7, 1)).unwrap();
        let genes = space.genotype();
        assert_eq!(
            genes,
            vec![
                Gene {
                    id: 1,
                    left: 2,
                    bottom: 0
                },
                Gene {
                    id: 2,
                    left: 7,
                    bottom: 1
                },
            ]
        );
    }

    #[test]
    fn test_fitness_detects_corruption() {
        let mut space = Space::new(4, &[Block::new(1, 4, 2), Block::new(2, 4, 2)]);
        // Force an overlap through the unchecked add path.
        space.add_block(Block::placed(1, 4, 2, 0, 0)).unwrap();
        space.add_block(Block::placed(2, 4, 2, 0, 0)).unwrap();
        let err = space.fitness().unwrap_err();
        assert!(matches!(err, Error::CorruptedLayout { .. }));
    }
}

//! Randomized constructive placement.
//!
//! Greedy, order-sensitive: each block is rotated with probability 0.5 and
//! dropped into the first valid slot found while scanning rows from the
//! floor upward (up to the current occupied height plus a small slack) and,
//! per row, a shuffled set of columns. Scanning rows bottom-up keeps
//! layouts compact; diversity comes from rotation and the column order.
//! There is no backtracking across blocks.

use rand::prelude::*;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::space::Space;

/// Vertical slack above the occupied height scanned by the genetic engine.
pub const GA_SLACK: u32 = 10;

/// Vertical slack scanned by the annealing engine.
pub const SA_SLACK: u32 = 15;

/// Places every block of `blocks` into `space`, in input order.
///
/// Exhausting the randomized candidate set without a valid slot is a
/// caller-visible failure; the partially filled space is left as-is and
/// should be discarded.
pub fn construct_layout<R: Rng>(
    space: &mut Space,
    blocks: &[Block],
    slack: u32,
    rng: &mut R,
) -> Result<()> {
    for template in blocks {
        let mut block = template.clone();
        if rng.gen::<f64>() < 0.5 {
            block.rotate();
        }
        place_one(space, block, slack, rng)?;
    }
    Ok(())
}

fn place_one<R: Rng>(space: &mut Space, mut block: Block, slack: u32, rng: &mut R) -> Result<()> {
    if block.width() > space.width() {
        return Err(Error::PlacementExhausted {
            id: block.id(),
            candidates: 0,
        });
    }

    let rows = space.occupied_height() + slack;
    let columns_per_row = (space.width() - block.width() + 1) as usize;
    let scanned = rows as usize * columns_per_row;

    let mut found = None;
    'rows: for bottom in 0..rows {
        let mut columns: Vec<u32> = (0..=space.width() - block.width()).collect();
        columns.shuffle(rng);
        for left in columns {
            block.localize(left, bottom);
            if space.is_valid_placement(&block) {
                found = Some((left, bottom));
                break 'rows;
            }
        }
    }

    match found {
        Some((left, bottom)) => {
            block.localize(left, bottom);
            space.add_block(block)
        }
        None => Err(Error::PlacementExhausted {
            id: block.id(),
            candidates: scanned,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn layout(width: u32, blocks: &[Block], seed: u64) -> Space {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut space = Space::new(width, blocks);
        construct_layout(&mut space, blocks, GA_SLACK, &mut rng).unwrap();
        space
    }

    #[test]
    fn test_places_every_block() {
        let blocks: Vec<Block> = (1..=8).map(|id| Block::new(id, 3, 2)).collect();
        let space = layout(12, &blocks, 7);
        assert_eq!(space.blocks_in().len(), 8);
    }

    #[test]
    fn test_layouts_are_pairwise_disjoint() {
        let blocks: Vec<Block> = (1..=10)
            .map(|id| Block::new(id, 1 + id as u32 % 4, 1 + (id as u32 * 3) % 5))
            .collect();
        for seed in 0..20 {
            let space = layout(9, &blocks, seed);
            let placed = space.blocks_in();
            for i in 0..placed.len() {
                for j in i + 1..placed.len() {
                    assert_eq!(
                        placed[i].intersection_area(&placed[j]),
                        0,
                        "blocks {} and {} overlap (seed {seed})",
                        placed[i].id(),
                        placed[j].id()
                    );
                }
            }
        }
    }

    #[test]
    fn test_layouts_respect_placement_order() {
        let blocks: Vec<Block> = (1..=10).map(|id| Block::new(id, 2, 2)).collect();
        for seed in 0..20 {
            let space = layout(8, &blocks, seed);
            let placed = space.blocks_in();
            for a in placed {
                for b in placed {
                    if a.id() <= b.id() {
                        assert!(
                            a.bottom().unwrap() <= b.bottom().unwrap(),
                            "order invariant broken for {} and {} (seed {seed})",
                            a.id(),
                            b.id()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_first_block_rests_on_the_floor() {
        // A lone 3x2 block in a width-10 strip must sit at the bottom and
        // occupy height 2 or 3, whichever way it was rotated.
        let blocks = vec![Block::new(1, 3, 2)];
        for seed in 0..50 {
            let space = layout(10, &blocks, seed);
            assert_eq!(space.blocks_in()[0].bottom(), Some(0), "seed {seed}");
            assert!(matches!(space.fitness().unwrap(), 2 | 3));
        }
    }

    #[test]
    fn test_fitness_bounded_by_space_limits() {
        let blocks: Vec<Block> = (1..=6).map(|id| Block::new(id, 4, 3)).collect();
        let space = layout(10, &blocks, 3);
        let fitness = space.fitness().unwrap();
        assert!(fitness >= 3);
        assert!(fitness <= space.max_height());
    }

    #[test]
    fn test_oversized_block_is_a_visible_failure() {
        let blocks = vec![Block::placed(1, 20, 20, 0, 0)];
        let mut rng = StdRng::seed_from_u64(1);
        let mut space = Space::new(10, &blocks);
        // 20 wide in a 10-wide strip, and 20 high after rotation: no slot.
        let err = construct_layout(&mut space, &blocks, GA_SLACK, &mut rng).unwrap_err();
        assert!(matches!(err, Error::PlacementExhausted { id: 1, .. }));
        assert!(space.blocks_in().is_empty());
    }
}

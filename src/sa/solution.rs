//! Candidate layout for the annealing engine.

use rand::prelude::*;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::heuristic::{construct_layout, SA_SLACK};
use crate::space::{Gene, Space};

/// Shuffled passes over the block list before a neighbor search gives up.
const NEIGHBOR_PASSES: usize = 64;

/// One annealing solution: an owned [`Space`]; fitness is its occupied
/// height.
#[derive(Debug, Clone)]
pub struct Solution {
    space: Space,
}

impl Solution {
    /// Builds a solution from raw blocks via the constructive heuristic.
    pub fn from_blocks<R: Rng>(space_width: u32, blocks: &[Block], rng: &mut R) -> Result<Self> {
        let mut space = Space::new(space_width, blocks);
        construct_layout(&mut space, blocks, SA_SLACK, rng)?;
        space.fitness()?;
        Ok(Self { space })
    }

    /// Rebuilds a solution from an explicit placement list.
    pub fn from_placed_layout(space_width: u32, placed: Vec<Block>) -> Result<Self> {
        let mut space = Space::new(space_width, &placed);
        for block in placed {
            space.add_block(block)?;
        }
        space.fitness()?;
        Ok(Self { space })
    }

    pub fn fitness(&self) -> u32 {
        self.space.occupied_height()
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn genotype(&self) -> Vec<Gene> {
        self.space.genotype()
    }

    /// Produces a neighboring solution by relocating one block.
    ///
    /// Walks the placed blocks in shuffled order; each visited block is
    /// rotated with probability 0.5 and offered one uniform random
    /// `(left, bottom)`. The first relocation that is valid with everything
    /// else unchanged wins, and a brand-new solution is rebuilt from the
    /// full updated placement list. Bounded at [`NEIGHBOR_PASSES`] shuffled
    /// passes; exhaustion is a caller-visible error.
    pub fn neighbor<R: Rng>(&self, rng: &mut R) -> Result<Solution> {
        let n = self.space.blocks_in().len();
        if n == 0 {
            return Err(Error::NeighborExhausted { attempts: 0 });
        }
        for _ in 0..NEIGHBOR_PASSES {
            let mut order: Vec<usize> = (0..n).collect();
            order.shuffle(rng);
            for index in order {
                let mut candidate = self.space.blocks_in()[index].clone();
                if rng.gen::<f64>() < 0.5 {
                    candidate.rotate();
                }
                if candidate.width() > self.space.width() {
                    continue;
                }
                let left = rng.gen_range(0..=self.space.width() - candidate.width());
                let bottom = rng.gen_range(0..=self.space.occupied_height());
                candidate.localize(left, bottom);
                if self.space.is_valid_placement(&candidate) {
                    let mut placed = self.space.blocks_in().to_vec();
                    placed[index] = candidate;
                    return Solution::from_placed_layout(self.space.width(), placed);
                }
            }
        }
        Err(Error::NeighborExhausted {
            attempts: NEIGHBOR_PASSES * n,
        })
    }
}

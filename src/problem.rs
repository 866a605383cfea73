//! Problem instance: the strip and the blocks to pack.

use rand::prelude::*;

use crate::block::Block;

/// A strip-packing problem instance: a named strip width plus the immutable
/// block template set every layout is built from.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    name: String,
    space_width: u32,
    blocks: Vec<Block>,
}

impl ProblemInstance {
    /// Generates `num_blocks` random blocks with ids `1..=num_blocks` and
    /// sides drawn uniformly from `1..=⌊space_width / 1.8⌋`.
    pub fn generate<R: Rng>(
        name: impl Into<String>,
        num_blocks: u16,
        space_width: u32,
        rng: &mut R,
    ) -> Self {
        let max_side = ((space_width as f64 / 1.8).floor() as u32).max(1);
        let blocks = (1..=num_blocks)
            .map(|id| {
                Block::new(
                    id,
                    rng.gen_range(1..=max_side),
                    rng.gen_range(1..=max_side),
                )
            })
            .collect();
        let instance = Self {
            name: name.into(),
            space_width,
            blocks,
        };
        log::info!(
            "instance {}: strip width {}, {} blocks",
            instance.name,
            instance.space_width,
            num_blocks
        );
        instance
    }

    /// Wraps an explicit block set, for callers that bring their own shapes.
    pub fn from_blocks(name: impl Into<String>, space_width: u32, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            space_width,
            blocks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn space_width(&self) -> u32 {
        self.space_width
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

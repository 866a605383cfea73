//! Candidate layout for the genetic engine.

use rand::prelude::*;

use crate::block::Block;
use crate::error::Result;
use crate::heuristic::{construct_layout, GA_SLACK};
use crate::space::{Gene, Space};

/// Bounded number of relocation attempts per mutation call.
const MUTATION_TRIES: usize = 10;

/// One candidate layout: an owned [`Space`] whose placed blocks encode the
/// genotype. Fitness is the occupied height, always read from the space.
#[derive(Debug, Clone)]
pub struct Individual {
    space: Space,
}

impl Individual {
    /// Builds a layout from raw blocks via the constructive heuristic.
    pub fn from_blocks<R: Rng>(space_width: u32, blocks: &[Block], rng: &mut R) -> Result<Self> {
        let mut space = Space::new(space_width, blocks);
        construct_layout(&mut space, blocks, GA_SLACK, rng)?;
        space.fitness()?;
        Ok(Self { space })
    }

    /// Rebuilds a layout from an explicit placement list (the fenotype
    /// path), without re-running the heuristic.
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

    /// Single-point crossover.
    ///
    /// The midpoint is drawn from `1..=n-3` so both the prefix and the
    /// suffix keep at least two genes. The prefix (index ≤ midpoint) copies
    /// the partner's placements verbatim; the suffix re-bases this parent's
    /// blocks by the height difference between the partner's midpoint block
    /// and this parent's block after it, raising a floor offset until the
    /// block neither overlaps a child block nor sits below one. The child is
    /// assembled through the placed-layout constructor.
    pub fn crossover<R: Rng>(&self, partner: &Individual, rng: &mut R) -> Result<Individual> {
        let a = self.space.blocks_in();
        let b = partner.space.blocks_in();
        let n = a.len();
        if n < 4 || b.len() != n {
            // Too few genes to split: rebuild this parent's layout.
            return Individual::from_placed_layout(self.space.width(), a.to_vec());
        }

        let midpoint = rng.gen_range(1..=n - 3);
        let diff = b[midpoint].bottom().unwrap_or(0) as i64
            - a[midpoint + 1].bottom().unwrap_or(0) as i64;

        let mut child: Vec<Block> = Vec::with_capacity(n);
        for i in 0..n {
            if i <= midpoint {
                child.push(b[i].clone());
                continue;
            }
            let left = a[i].left().unwrap_or(0);
            let base = a[i].bottom().unwrap_or(0) as i64;
            let mut block = Block::new(a[i].id(), a[i].width(), a[i].height());
            let mut floor = 0i64;
            loop {
                let bottom = (base - diff + floor).max(0) as u32;
                block.localize(left, bottom);
                let valid = child.iter().all(|placed| {
                    !block.intersects(placed) && bottom >= placed.bottom().unwrap_or(0)
                });
                if valid {
                    break;
                }
                floor += 1;
            }
            child.push(block);
        }

        Individual::from_placed_layout(self.space.width(), child)
    }

    /// With probability `mutation_rate`, tries up to [`MUTATION_TRIES`]
    /// random relocations of one random block, accepting the first that
    /// passes the validity query. Returns whether a relocation happened.
    pub fn mutate<R: Rng>(&mut self, mutation_rate: f64, rng: &mut R) -> bool {
        if rng.gen::<f64>() >= mutation_rate {
            return false;
        }
        let n = self.space.blocks_in().len();
        if n == 0 {
            return false;
        }
        for _ in 0..MUTATION_TRIES {
            let index = rng.gen_range(0..n);
            let mut candidate = self.space.blocks_in()[index].clone();
            let left = rng.gen_range(0..=self.space.width() - candidate.width());
            let bottom = rng.gen_range(0..=self.space.occupied_height());
            candidate.localize(left, bottom);
            if self.space.is_valid_placement(&candidate) {
                log::trace!("mutated block {} to ({left}, {bottom})", candidate.id());
                self.space.relocate(index, left, bottom);
                return true;
            }
        }
        false
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.genotype() == other.genotype()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn blocks(n: u16) -> Vec<Block> {
        (1..=n)
            .map(|id| Block::new(id, 1 + id as u32 % 3, 1 + (id as u32 * 2) % 3))
            .collect()
    }

    fn assert_valid(individual: &Individual) {
        let placed = individual.space().blocks_in();
        for i in 0..placed.len() {
            for j in i + 1..placed.len() {
                assert_eq!(placed[i].intersection_area(&placed[j]), 0);
                let (a, b) = if placed[i].id() <= placed[j].id() {
                    (&placed[i], &placed[j])
                } else {
                    (&placed[j], &placed[i])
                };
                assert!(a.bottom().unwrap() <= b.bottom().unwrap());
            }
        }
    }

    #[test]
    fn test_fenotype_round_trip() {
        let placed = vec![
            Block::placed(1, 3, 2, 0, 0),
            Block::placed(2, 2, 2, 4, 1),
            Block::placed(3, 2, 1, 7, 3),
        ];
        let individual = Individual::from_placed_layout(10, placed.clone()).unwrap();
        let genes = individual.genotype();
        assert_eq!(genes.len(), placed.len());
        for (gene, block) in genes.iter().zip(&placed) {
            assert_eq!(gene.id, block.id());
            assert_eq!(gene.left, block.left().unwrap());
            assert_eq!(gene.bottom, block.bottom().unwrap());
        }
        assert_eq!(individual.fitness(), 4);
    }

    #[test]
    fn test_from_placed_layout_rejects_block_past_strip_edge() {
        let placed = vec![Block::placed(1, 3, 1, 3, 0)];
        assert!(Individual::from_placed_layout(5, placed).is_err());
    }

    #[test]
    fn test_crossover_produces_valid_child() {
        let template = blocks(8);
        let mut rng = StdRng::seed_from_u64(11);
        let a = Individual::from_blocks(8, &template, &mut rng).unwrap();
        let b = Individual::from_blocks(8, &template, &mut rng).unwrap();
        for _ in 0..10 {
            let child = a.crossover(&b, &mut rng).unwrap();
            assert_eq!(child.space().blocks_in().len(), template.len());
            assert_valid(&child);
        }
    }

    #[test]
    fn test_crossover_with_tiny_genotype_clones_parent() {
        let template = blocks(3);
        let mut rng = StdRng::seed_from_u64(4);
        let a = Individual::from_blocks(8, &template, &mut rng).unwrap();
        let b = Individual::from_blocks(8, &template, &mut rng).unwrap();
        let child = a.crossover(&b, &mut rng).unwrap();
        assert_eq!(child, a);
    }

    #[test]
    fn test_mutation_keeps_layout_valid_and_fitness_fresh() {
        let template = blocks(10);
        let mut rng = StdRng::seed_from_u64(9);
        let mut individual = Individual::from_blocks(9, &template, &mut rng).unwrap();
        let mut mutated = 0;
        for _ in 0..50 {
            if individual.mutate(1.0, &mut rng) {
                mutated += 1;
                assert_valid(&individual);
                assert_eq!(
                    individual.fitness(),
                    individual.space().fitness().unwrap(),
                    "fitness must always be derived from the space"
                );
            }
        }
        assert!(mutated > 0, "no relocation accepted in 50 forced attempts");
    }

    #[test]
    fn test_mutation_rate_zero_never_mutates() {
        let template = blocks(6);
        let mut rng = StdRng::seed_from_u64(2);
        let mut individual = Individual::from_blocks(9, &template, &mut rng).unwrap();
        let before = individual.genotype();
        for _ in 0..20 {
            assert!(!individual.mutate(0.0, &mut rng));
        }
        assert_eq!(individual.genotype(), before);
    }
}

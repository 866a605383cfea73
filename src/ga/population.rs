//! Population of candidate layouts and the genetic operators over it.
//!
//! Selection, crossover, mutation and replacement all produce owned
//! individuals; the population itself is immutable and a new one is built
//! per generation from the replacement result.

use std::sync::Arc;

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::block::Block;
use crate::error::Result;
use crate::ga::individual::Individual;

/// Fixed-size generation of layouts plus the shared block template set and
/// the worker pool used to build layouts in parallel.
pub struct Population {
    space_width: u32,
    blocks: Arc<Vec<Block>>,
    pool: Arc<ThreadPool>,
    members: Vec<Individual>,
}

impl Population {
    /// Builds `num_individuals` layouts from the template in parallel.
    ///
    /// Each worker task gets its own RNG seeded from the driver RNG before
    /// dispatch, so results are deterministic under any scheduling.
    pub fn generate<R: Rng>(
        space_width: u32,
        blocks: Arc<Vec<Block>>,
        num_individuals: usize,
        pool: Arc<ThreadPool>,
        rng: &mut R,
    ) -> Result<Self> {
        let members = Self::build_members(space_width, &blocks, num_individuals, &pool, rng)?;
        log::info!("generated population of {}", members.len());
        Ok(Self {
            space_width,
            blocks,
            pool,
            members,
        })
    }

    /// Wraps a replacement result into the next generation, sharing the
    /// template and worker pool with this one.
    pub fn succeed(&self, members: Vec<Individual>) -> Self {
        Self {
            space_width: self.space_width,
            blocks: Arc::clone(&self.blocks),
            pool: Arc::clone(&self.pool),
            members,
        }
    }

    fn build_members<R: Rng>(
        space_width: u32,
        blocks: &Arc<Vec<Block>>,
        count: usize,
        pool: &Arc<ThreadPool>,
        rng: &mut R,
    ) -> Result<Vec<Individual>> {
        let seeds: Vec<u64> = (0..count).map(|_| rng.gen()).collect();
        let blocks = Arc::clone(blocks);
        pool.install(|| {
            seeds
                .into_par_iter()
                .map(|seed| {
                    let mut worker_rng = StdRng::seed_from_u64(seed);
                    Individual::from_blocks(space_width, &blocks, &mut worker_rng)
                })
                .collect::<Result<Vec<_>>>()
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    /// The fittest individual (lowest fitness, first occurrence on ties).
    pub fn best(&self) -> &Individual {
        let mut fittest = &self.members[0];
        for individual in &self.members {
            if individual.fitness() < fittest.fitness() {
                fittest = individual;
            }
        }
        fittest
    }

    /// The least fit individual (highest fitness, first occurrence on ties).
    pub fn worst(&self) -> &Individual {
        let mut worst = &self.members[0];
        for individual in &self.members {
            if individual.fitness() > worst.fitness() {
                worst = individual;
            }
        }
        worst
    }

    pub fn average_fitness(&self) -> f64 {
        let total: u64 = self.members.iter().map(|i| i.fitness() as u64).sum();
        total as f64 / self.members.len() as f64
    }

    /// Median fitness; for an even count, the truncated integer mean of the
    /// two central values.
    pub fn median_fitness(&self) -> u32 {
        let mut fitness: Vec<u32> = self.members.iter().map(Individual::fitness).collect();
        fitness.sort_unstable();
        let mid = fitness.len() / 2;
        if fitness.len() % 2 == 0 {
            (fitness[mid - 1] + fitness[mid]) / 2
        } else {
            fitness[mid]
        }
    }

    /// Tournament selection: shuffle the population, partition into groups
    /// of `k`, proportional-select one winner per group; repeat whole-pool
    /// passes until `per_choose` of the population is collected.
    pub fn selection_tournament<R: Rng>(
        &self,
        k: usize,
        per_choose: f64,
        rng: &mut R,
    ) -> Vec<Individual> {
        let num_choose = (self.members.len() as f64 * per_choose) as usize;
        let k = k.max(1);
        let mut parents = Vec::with_capacity(num_choose);
        while parents.len() < num_choose {
            let mut pool: Vec<Individual> = self.members.clone();
            pool.shuffle(rng);
            for group in pool.chunks(k) {
                if parents.len() >= num_choose {
                    break;
                }
                parents.extend(self.selection_proportional(group, 1, rng));
            }
        }
        parents
    }

    /// Elitist selection: repeatedly extract the global minimum fitness
    /// (stable, first occurrence on ties) until `num_choose` are collected.
    pub fn selection_elitist(&self, num_choose: usize) -> Vec<Individual> {
        let mut pool: Vec<Individual> = self.members.clone();
        let take = num_choose.min(pool.len());
        let mut chosen = Vec::with_capacity(take);
        for _ in 0..take {
            let mut min_index = 0;
            for (i, individual) in pool.iter().enumerate() {
                if individual.fitness() < pool[min_index].fitness() {
                    min_index = i;
                }
            }
            chosen.push(pool.remove(min_index));
        }
        chosen
    }

    /// Fitness-proportionate (roulette-wheel) selection over `candidates`.
    ///
    /// Weight of candidate i is `(worst - fitness_i + best) / Σ fitness`,
    /// biasing toward lower fitness; best and worst are population-global.
    /// Each draw walks the cumulative table with a uniform number in
    /// `[0, 1)` (last candidate as fallback), removes the winner and
    /// renormalizes the survivors by subtracting their own fitness share.
    pub fn selection_proportional<R: Rng>(
        &self,
        candidates: &[Individual],
        num_choose: usize,
        rng: &mut R,
    ) -> Vec<Individual> {
        if candidates.is_empty() || num_choose == 0 {
            return Vec::new();
        }
        let best = self.best().fitness() as f64;
        let worst = self.worst().fitness() as f64;
        let sum: f64 = candidates.iter().map(|c| c.fitness() as f64).sum();
        let sum = if sum > 0.0 { sum } else { 1.0 };

        let mut weighted: Vec<(f64, Individual)> = candidates
            .iter()
            .map(|c| ((worst - c.fitness() as f64 + best) / sum, c.clone()))
            .collect();

        let mut chosen = Vec::with_capacity(num_choose);
        while chosen.len() < num_choose && !weighted.is_empty() {
            let draw = rng.gen::<f64>();
            let mut cumulative = 0.0;
            let mut pick = weighted.len() - 1;
            for (i, (weight, _)) in weighted.iter().enumerate() {
                cumulative += *weight;
                if cumulative >= draw {
                    pick = i;
                    break;
                }
            }
            let (_, winner) = weighted.remove(pick);
            chosen.push(winner);
            for (weight, survivor) in weighted.iter_mut() {
                *weight -= survivor.fitness() as f64 / sum;
            }
        }
        chosen
    }

    /// Crosses shuffled ordered parent pairs until `per_children` of the
    /// parent count is produced.
    pub fn crossover<R: Rng>(
        &self,
        parents: &[Individual],
        per_children: f64,
        rng: &mut R,
    ) -> Result<Vec<Individual>> {
        let num_children = (parents.len() as f64 * per_children) as usize;
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(parents.len() * parents.len());
        for i in 0..parents.len() {
            for j in 0..parents.len() {
                if i != j {
                    pairs.push((i, j));
                }
            }
        }
        pairs.shuffle(rng);

        let mut children = Vec::with_capacity(num_children);
        for (i, j) in pairs {
            if children.len() >= num_children {
                break;
            }
            children.push(parents[i].crossover(&parents[j], rng)?);
        }
        log::debug!("crossover produced {} children", children.len());
        Ok(children)
    }

    /// Mutates each child in place with the configured rate.
    pub fn mutate_all<R: Rng>(children: &mut [Individual], mutation_rate: f64, rng: &mut R) {
        for child in children {
            child.mutate(mutation_rate, rng);
        }
    }

    /// Gap replacement: keep children strictly better than the current
    /// worst, backfill the rest of the generation elitistically.
    pub fn replacement_gap(&self, children: Vec<Individual>) -> Vec<Individual> {
        let worst = self.worst().fitness();
        let mut next: Vec<Individual> = children
            .into_iter()
            .filter(|c| c.fitness() < worst)
            .collect();
        next.truncate(self.members.len());
        let gap = self.members.len() - next.len();
        if gap > 0 {
            next.extend(self.selection_elitist(gap));
        }
        next
    }

    /// Final judgment: keep `survivors` elites and regenerate the rest of
    /// the population from scratch (diversity injection after stagnation).
    pub fn replacement_final_judgment<R: Rng>(
        &self,
        survivors: usize,
        rng: &mut R,
    ) -> Result<Vec<Individual>> {
        let mut next = self.selection_elitist(survivors);
        let refill = self.members.len() - next.len();
        next.extend(Self::build_members(
            self.space_width,
            &self.blocks,
            refill,
            &self.pool,
            rng,
        )?);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::ThreadPoolBuilder;

    fn test_pool() -> Arc<ThreadPool> {
        Arc::new(ThreadPoolBuilder::new().num_threads(2).build().unwrap())
    }

    fn blocks(n: u16) -> Arc<Vec<Block>> {
        Arc::new((1..=n).map(|id| Block::new(id, 2, 2)).collect())
    }

    fn population(n_members: usize, seed: u64) -> Population {
        let mut rng = StdRng::seed_from_u64(seed);
        Population::generate(10, blocks(6), n_members, test_pool(), &mut rng).unwrap()
    }

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let a = population(8, 42);
        let b = population(8, 42);
        for (x, y) in a.members().iter().zip(b.members()) {
            assert_eq!(x.genotype(), y.genotype());
        }
    }

    #[test]
    fn test_best_and_worst() {
        let pop = population(10, 1);
        let best = pop.best().fitness();
        let worst = pop.worst().fitness();
        assert!(best <= worst);
        for m in pop.members() {
            assert!(m.fitness() >= best);
            assert!(m.fitness() <= worst);
        }
    }

    #[test]
    fn test_median_even_count_truncates() {
        let pop = population(4, 3);
        let mut fitness: Vec<u32> = pop.members().iter().map(Individual::fitness).collect();
        fitness.sort_unstable();
        assert_eq!(pop.median_fitness(), (fitness[1] + fitness[2]) / 2);
    }

    #[test]
    fn test_tournament_collects_quota() {
        let pop = population(10, 7);
        let mut rng = StdRng::seed_from_u64(8);
        let parents = pop.selection_tournament(2, 0.5, &mut rng);
        assert_eq!(parents.len(), 5);
    }

    #[test]
    fn test_elitist_returns_sorted_prefix() {
        let pop = population(10, 9);
        let chosen = pop.selection_elitist(4);
        assert_eq!(chosen.len(), 4);
        for pair in chosen.windows(2) {
            assert!(pair[0].fitness() <= pair[1].fitness());
        }
        assert_eq!(chosen[0].fitness(), pop.best().fitness());
    }

    #[test]
    fn test_proportional_selection_total() {
        let pop = population(10, 13);
        let mut rng = StdRng::seed_from_u64(5);
        let chosen = pop.selection_proportional(pop.members(), 10, &mut rng);
        assert_eq!(chosen.len(), 10);
    }

    #[test]
    fn test_replacement_gap_keeps_size_and_best() {
        let pop = population(10, 21);
        let mut rng = StdRng::seed_from_u64(6);
        let parents = pop.selection_tournament(2, 0.5, &mut rng);
        let children = pop.crossover(&parents, 1.0, &mut rng).unwrap();
        let next = pop.replacement_gap(children);
        assert_eq!(next.len(), pop.len());
        let next_best = next.iter().map(Individual::fitness).min().unwrap();
        assert!(next_best <= pop.best().fitness());
    }

    #[test]
    fn test_final_judgment_keeps_survivors() {
        let pop = population(8, 33);
        let mut rng = StdRng::seed_from_u64(2);
        let next = pop.replacement_final_judgment(2, &mut rng).unwrap();
        assert_eq!(next.len(), pop.len());
        assert_eq!(next[0].fitness(), pop.best().fitness());
    }
}

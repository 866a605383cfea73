//! Genetic search driver.
//!
//! Orchestrates successive generations — selection, crossover, mutation,
//! replacement — until the configured stop condition, collecting best,
//! worst, mean and median fitness per generation. A stagnant best fitness
//! triggers the final-judgment restart, which keeps a small elite set and
//! regenerates the rest of the population.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::{Error, Result};
use crate::ga::population::Population;
use crate::space::Gene;

/// Stop condition for the genetic driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaStop {
    /// Run a fixed number of generations.
    Generations(u32),
    /// Run until the wall-clock budget elapses.
    ComputeTime(Duration),
}

/// Configuration for the genetic engine.
#[derive(Debug, Clone, Serialize)]
pub struct GaConfig {
    /// Population size, constant across generations.
    pub population_size: usize,
    /// Tournament group size K.
    pub tournament_size: usize,
    /// Fraction of the population selected as parents, and of the parents
    /// crossed into children.
    pub per_child_choose: f64,
    /// Stagnant generations before the final-judgment restart.
    pub gen_to_final_judgment: u32,
    /// Elite individuals preserved through a final judgment.
    pub survivors: usize,
    /// Probability that a child is mutated.
    pub mutation_rate: f64,
    /// Stop condition.
    pub stop: GaStop,
    /// Worker threads for population construction (0 = auto).
    pub n_jobs: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            tournament_size: 2,
            per_child_choose: 0.5,
            gen_to_final_judgment: 10,
            survivors: 1,
            mutation_rate: 0.1,
            stop: GaStop::Generations(100),
            n_jobs: 0,
        }
    }
}

impl GaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k.max(1);
        self
    }

    pub fn with_per_child_choose(mut self, fraction: f64) -> Self {
        self.per_child_choose = fraction.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_final_judgment(mut self, generations: u32, survivors: usize) -> Self {
        self.gen_to_final_judgment = generations;
        self.survivors = survivors;
        self
    }

    pub fn with_stop(mut self, stop: GaStop) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }
}

/// Statistics and final layout of a genetic run.
#[derive(Debug, Clone)]
pub struct GaOutcome {
    /// Best fitness per generation (index 0 is the initial population).
    pub best_fitness: Vec<u32>,
    /// Worst fitness per generation.
    pub worst_fitness: Vec<u32>,
    /// Mean fitness per generation.
    pub mean_fitness: Vec<f64>,
    /// Median fitness per generation.
    pub median_fitness: Vec<u32>,
    /// Generations completed.
    pub generations: u32,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Genotype of the best layout found.
    pub best_layout: Vec<Gene>,
    /// Fitness of the best layout found.
    pub final_best: u32,
}

/// Genetic algorithm runner.
pub struct GaRunner {
    config: GaConfig,
    space_width: u32,
    blocks: Arc<Vec<Block>>,
}

impl GaRunner {
    pub fn new(config: GaConfig, space_width: u32, blocks: Vec<Block>) -> Self {
        Self {
            config,
            space_width,
            blocks: Arc::new(blocks),
        }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the genetic search with the given randomness source.
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<GaOutcome> {
        let start = Instant::now();
        let n_jobs = resolve_jobs(self.config.n_jobs);
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(n_jobs)
                .build()
                .map_err(|e| Error::WorkerPool(e.to_string()))?,
        );
        log::info!(
            "genetic search: population {}, stop {:?}, {} workers",
            self.config.population_size,
            self.config.stop,
            n_jobs
        );

        let mut population = Population::generate(
            self.space_width,
            Arc::clone(&self.blocks),
            self.config.population_size,
            pool,
            rng,
        )?;

        let mut best_fitness = vec![population.best().fitness()];
        let mut worst_fitness = vec![population.worst().fitness()];
        let mut mean_fitness = vec![population.average_fitness()];
        let mut median_fitness = vec![population.median_fitness()];
        let mut best_layout = population.best().clone();
        let mut stagnant = 0u32;
        let mut generation = 0u32;

        while self.keep_running(generation, start) {
            let parents = population.selection_tournament(
                self.config.tournament_size,
                self.config.per_child_choose,
                rng,
            );
            let mut children =
                population.crossover(&parents, self.config.per_child_choose, rng)?;
            Population::mutate_all(&mut children, self.config.mutation_rate, rng);

            let next = if stagnant == self.config.gen_to_final_judgment {
                log::info!(
                    "final judgment: keeping {} survivors, regenerating the rest",
                    self.config.survivors
                );
                stagnant = 0;
                population.replacement_final_judgment(self.config.survivors, rng)?
            } else {
                population.replacement_gap(children)
            };
            population = population.succeed(next);

            best_fitness.push(population.best().fitness());
            worst_fitness.push(population.worst().fitness());
            mean_fitness.push(population.average_fitness());
            median_fitness.push(population.median_fitness());
            if population.best().fitness() < best_layout.fitness() {
                best_layout = population.best().clone();
            }

            let len = best_fitness.len();
            if best_fitness[len - 1] == best_fitness[len - 2] {
                stagnant += 1;
            } else {
                stagnant = 0;
            }
            generation += 1;

            log::info!(
                "generation {generation}: best {} worst {} mean {:.3} median {}",
                best_fitness[len - 1],
                worst_fitness[len - 1],
                mean_fitness[len - 1],
                median_fitness[len - 1],
            );
        }

        log::debug!("best layout:\n{}", best_layout.space().render());
        Ok(GaOutcome {
            best_fitness,
            worst_fitness,
            mean_fitness,
            median_fitness,
            generations: generation,
            elapsed: start.elapsed(),
            final_best: best_layout.fitness(),
            best_layout: best_layout.genotype(),
        })
    }

    fn keep_running(&self, generation: u32, start: Instant) -> bool {
        match self.config.stop {
            GaStop::Generations(limit) => generation < limit,
            GaStop::ComputeTime(budget) => start.elapsed() < budget,
        }
    }
}

/// Resolves a worker count, mapping 0 to half the available parallelism.
pub(crate) fn resolve_jobs(n_jobs: usize) -> usize {
    if n_jobs >= 1 {
        return n_jobs;
    }
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (available / 2).max(1)
}

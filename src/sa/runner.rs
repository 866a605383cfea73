//! Simulated annealing driver.
//!
//! Walks a chain of neighboring solutions, accepting improvements outright
//! and regressions with the Metropolis probability against the best fitness
//! seen so far, while the temperature cools under the configured schedule.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::error::Result;
use crate::sa::solution::Solution;
use crate::space::Gene;

/// Temperature update rule applied once per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingSchedule {
    /// `T(i) = T_init - k * i`
    Linear,
    /// `T(i+1) = k * T(i)`
    #[serde(rename = "exp")]
    Exponential,
    /// `T(i+1) = T(i) / (1 + k * T(i))`
    #[serde(rename = "div")]
    Divisive,
}

/// Stop condition for the annealing driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaStop {
    /// Run a fixed number of iterations.
    Iterations(u64),
    /// Run until the wall-clock budget elapses.
    ComputeTime(Duration),
}

/// Configuration for the annealing engine.
#[derive(Debug, Clone, Serialize)]
pub struct SaConfig {
    /// Starting temperature.
    pub t_init: f64,
    /// Floor temperature; the schedule never cools below it.
    pub t_end: f64,
    /// Schedule coefficient.
    pub k: f64,
    /// Cooling schedule.
    pub schedule: CoolingSchedule,
    /// Stop condition.
    pub stop: SaStop,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            t_init: 100.0,
            t_end: 1.0,
            k: 0.1,
            schedule: CoolingSchedule::Exponential,
            stop: SaStop::Iterations(1000),
        }
    }
}

impl SaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperatures(mut self, t_init: f64, t_end: f64) -> Self {
        self.t_init = t_init;
        self.t_end = t_end;
        self
    }

    pub fn with_schedule(mut self, schedule: CoolingSchedule, k: f64) -> Self {
        self.schedule = schedule;
        self.k = k;
        self
    }

    pub fn with_stop(mut self, stop: SaStop) -> Self {
        self.stop = stop;
        self
    }
}

/// Statistics and final layout of an annealing run.
#[derive(Debug, Clone)]
pub struct SaOutcome {
    /// Fitness of the current solution per iteration.
    pub accepted_fitness: Vec<u32>,
    /// Temperature in effect at each iteration, recorded before cooling.
    pub temperatures: Vec<f64>,
    /// Best fitness seen over the whole run.
    pub best_fitness: u32,
    /// Iterations completed.
    pub iterations: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Genotype of the best layout found.
    pub best_layout: Vec<Gene>,
}

/// Simulated annealing runner.
pub struct SaRunner {
    config: SaConfig,
    space_width: u32,
    blocks: Arc<Vec<Block>>,
}

impl SaRunner {
    pub fn new(config: SaConfig, space_width: u32, blocks: Vec<Block>) -> Self {
        Self {
            config,
            space_width,
            blocks: Arc::new(blocks),
        }
    }

    pub fn config(&self) -> &SaConfig {
        &self.config
    }

    /// Runs the annealing search with the given randomness source.
    pub fn run<R: Rng>(&self, rng: &mut R) -> Result<SaOutcome> {
        let start = Instant::now();
        log::info!(
            "annealing search: schedule {:?}, T {} -> {}, stop {:?}",
            self.config.schedule,
            self.config.t_init,
            self.config.t_end,
            self.config.stop
        );

        let mut current = Solution::from_blocks(self.space_width, &self.blocks, rng)?;
        let mut best = current.clone();
        let mut best_fitness = best.fitness();

        let mut accepted_fitness = Vec::new();
        let mut temperatures = Vec::new();
        let mut t = self.config.t_init;
        let mut iteration = 0u64;

        loop {
            let candidate = current.neighbor(rng)?;
            let fitness = candidate.fitness();
            if fitness < best_fitness {
                best = candidate.clone();
                best_fitness = fitness;
                current = candidate;
            } else {
                let delta = best_fitness as f64 - fitness as f64;
                if rng.gen::<f64>() < (delta / t).exp() {
                    current = candidate;
                }
            }

            accepted_fitness.push(current.fitness());
            temperatures.push(t);
            t = self.next_temperature(t, iteration);
            iteration += 1;

            log::debug!(
                "iteration {iteration}: current {} best {best_fitness} T {t:.4}",
                accepted_fitness[accepted_fitness.len() - 1]
            );

            let stop = match self.config.stop {
                SaStop::Iterations(limit) => iteration >= limit,
                SaStop::ComputeTime(budget) => start.elapsed() >= budget,
            };
            if stop {
                break;
            }
        }

        log::debug!("best layout:\n{}", best.space().render());
        Ok(SaOutcome {
            accepted_fitness,
            temperatures,
            best_fitness,
            iterations: iteration,
            elapsed: start.elapsed(),
            best_layout: best.genotype(),
        })
    }

    /// Applies one cooling step, clamped at the floor temperature.
    fn next_temperature(&self, t: f64, iteration: u64) -> f64 {
        let next = match self.config.schedule {
            CoolingSchedule::Linear => self.config.t_init - self.config.k * (iteration + 1) as f64,
            CoolingSchedule::Exponential => self.config.k * t,
            CoolingSchedule::Divisive => t / (1.0 + self.config.k * t),
        };
        if next < self.config.t_end {
            self.config.t_end
        } else {
            next
        }
    }
}

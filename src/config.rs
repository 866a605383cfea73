//! TOML-backed run configuration.
//!
//! A settings file describes the problem instance and both engines; the
//! binary loads it, validates the numeric ranges up front and converts the
//! relevant section into a [`GaConfig`] or [`SaConfig`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ga::runner::{GaConfig, GaStop};
use crate::sa::runner::{CoolingSchedule, SaConfig, SaStop};

/// Which engine a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Genetic,
    SimulatedAnnealing,
}

/// Problem instance description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSettings {
    pub algorithm: Algorithm,
    pub space_width: u32,
    pub num_blocks: u16,
}

/// How a genetic run stops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum GaStopSetting {
    Generations(u32),
    ComputeTimeSecs(f64),
}

/// How an annealing run stops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SaStopSetting {
    Iterations(u64),
    ComputeTimeSecs(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticSettings {
    pub population_size: usize,
    pub tournament_size: usize,
    pub per_child_choose: f64,
    pub gen_to_final_judgment: u32,
    pub survivors: usize,
    pub mutation_rate: f64,
    pub stop: GaStopSetting,
    #[serde(default)]
    pub n_jobs: usize,
}

impl Default for GeneticSettings {
    fn default() -> Self {
        let defaults = GaConfig::default();
        Self {
            population_size: defaults.population_size,
            tournament_size: defaults.tournament_size,
            per_child_choose: defaults.per_child_choose,
            gen_to_final_judgment: defaults.gen_to_final_judgment,
            survivors: defaults.survivors,
            mutation_rate: defaults.mutation_rate,
            stop: GaStopSetting::Generations(100),
            n_jobs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnealingSettings {
    pub t_init: f64,
    pub t_end: f64,
    pub k: f64,
    pub schedule: CoolingSchedule,
    pub stop: SaStopSetting,
}

impl Default for AnnealingSettings {
    fn default() -> Self {
        let defaults = SaConfig::default();
        Self {
            t_init: defaults.t_init,
            t_end: defaults.t_end,
            k: defaults.k,
            schedule: defaults.schedule,
            stop: SaStopSetting::Iterations(1000),
        }
    }
}

/// Full settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub problem: ProblemSettings,
    #[serde(default)]
    pub genetic: GeneticSettings,
    #[serde(default)]
    pub annealing: AnnealingSettings,
}

impl Settings {
    /// Loads and validates a settings file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings that would make a run degenerate before any work
    /// starts.
    pub fn validate(&self) -> Result<()> {
        if self.problem.space_width == 0 {
            return Err(Error::Config("space_width must be positive".into()));
        }
        if self.problem.num_blocks == 0 {
            return Err(Error::Config("num_blocks must be positive".into()));
        }
        let ga = &self.genetic;
        if ga.population_size < 2 {
            return Err(Error::Config("population_size must be at least 2".into()));
        }
        if ga.tournament_size < 1 {
            return Err(Error::Config("tournament_size must be at least 1".into()));
        }
        if !(ga.per_child_choose > 0.0 && ga.per_child_choose <= 1.0) {
            return Err(Error::Config("per_child_choose must be in (0, 1]".into()));
        }
        if !(ga.mutation_rate >= 0.0 && ga.mutation_rate <= 1.0) {
            return Err(Error::Config("mutation_rate must be in [0, 1]".into()));
        }
        if ga.survivors >= ga.population_size {
            return Err(Error::Config(
                "survivors must be smaller than population_size".into(),
            ));
        }
        let sa = &self.annealing;
        if !(sa.t_init > sa.t_end && sa.t_end > 0.0) {
            return Err(Error::Config("temperatures must satisfy t_init > t_end > 0".into()));
        }
        if sa.k <= 0.0 {
            return Err(Error::Config("k must be positive".into()));
        }
        Ok(())
    }

    /// Converts the genetic section into an engine config.
    pub fn to_ga_config(&self, n_jobs_override: Option<usize>) -> GaConfig {
        let ga = &self.genetic;
        GaConfig {
            population_size: ga.population_size,
            tournament_size: ga.tournament_size,
            per_child_choose: ga.per_child_choose,
            gen_to_final_judgment: ga.gen_to_final_judgment,
            survivors: ga.survivors,
            mutation_rate: ga.mutation_rate,
            stop: match ga.stop {
                GaStopSetting::Generations(n) => GaStop::Generations(n),
                GaStopSetting::ComputeTimeSecs(secs) => {
                    GaStop::ComputeTime(Duration::from_secs_f64(secs))
                }
            },
            n_jobs: n_jobs_override.unwrap_or(ga.n_jobs),
        }
    }

    /// Converts the annealing section into an engine config.
    pub fn to_sa_config(&self) -> SaConfig {
        let sa = &self.annealing;
        SaConfig {
            t_init: sa.t_init,
            t_end: sa.t_end,
            k: sa.k,
            schedule: sa.schedule,
            stop: match sa.stop {
                SaStopSetting::Iterations(n) => SaStop::Iterations(n),
                SaStopSetting::ComputeTimeSecs(secs) => {
                    SaStop::ComputeTime(Duration::from_secs_f64(secs))
                }
            },
        }
    }
}

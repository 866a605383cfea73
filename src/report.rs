//! JSON run reports.
//!
//! Each finished run is written as a single pretty-printed JSON file under
//! the output directory, named after the run. A report echoes the engine
//! configuration next to the per-step statistics so a result file is
//! self-describing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::ga::runner::{GaConfig, GaOutcome};
use crate::sa::runner::{SaConfig, SaOutcome};
use crate::space::Gene;

/// Report of a genetic run.
#[derive(Debug, Serialize)]
pub struct GaReport {
    pub name: String,
    pub space_width: u32,
    pub num_blocks: usize,
    pub config: GaConfig,
    pub generations: u32,
    pub elapsed_ms: u128,
    pub best_fitness: Vec<u32>,
    pub worst_fitness: Vec<u32>,
    pub mean_fitness: Vec<f64>,
    pub median_fitness: Vec<u32>,
    pub final_best: u32,
    pub best_layout: Vec<Gene>,
}

impl GaReport {
    pub fn new(name: &str, space_width: u32, config: GaConfig, outcome: GaOutcome) -> Self {
        Self {
            name: name.to_owned(),
            space_width,
            num_blocks: outcome.best_layout.len(),
            config,
            generations: outcome.generations,
            elapsed_ms: outcome.elapsed.as_millis(),
            best_fitness: outcome.best_fitness,
            worst_fitness: outcome.worst_fitness,
            mean_fitness: outcome.mean_fitness,
            median_fitness: outcome.median_fitness,
            final_best: outcome.final_best,
            best_layout: outcome.best_layout,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        write_report(dir, &self.name, self)
    }
}

/// Report of an annealing run.
#[derive(Debug, Serialize)]
pub struct SaReport {
    pub name: String,
    pub space_width: u32,
    pub num_blocks: usize,
    pub config: SaConfig,
    pub iterations: u64,
    pub elapsed_ms: u128,
    pub accepted_fitness: Vec<u32>,
    pub temperatures: Vec<f64>,
    pub best_fitness: u32,
    pub best_layout: Vec<Gene>,
}

impl SaReport {
    pub fn new(name: &str, space_width: u32, config: SaConfig, outcome: SaOutcome) -> Self {
        Self {
            name: name.to_owned(),
            space_width,
            num_blocks: outcome.best_layout.len(),
            config,
            iterations: outcome.iterations,
            elapsed_ms: outcome.elapsed.as_millis(),
            accepted_fitness: outcome.accepted_fitness,
            temperatures: outcome.temperatures,
            best_fitness: outcome.best_fitness,
            best_layout: outcome.best_layout,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        write_report(dir, &self.name, self)
    }
}

fn write_report<P: AsRef<Path>, T: Serialize>(dir: P, name: &str, report: &T) -> Result<PathBuf> {
    fs::create_dir_all(&dir)?;
    let path = dir.as_ref().join(format!("{name}.json"));
    let file = fs::File::create(&path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ga_outcome() -> GaOutcome {
        GaOutcome {
            best_fitness: vec![9, 8, 8],
            worst_fitness: vec![12, 11, 10],
            mean_fitness: vec![10.5, 9.5, 9.0],
            median_fitness: vec![10, 9, 9],
            generations: 2,
            elapsed: Duration::from_millis(42),
            best_layout: vec![
                Gene { id: 1, left: 0, bottom: 0 },
                Gene { id: 2, left: 3, bottom: 1 },
            ],
            final_best: 8,
        }
    }

    #[test]
    fn test_ga_report_round_trips_through_json() {
        let report = GaReport::new("unit", 10, GaConfig::default(), ga_outcome());
        let text = serde_json::to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["name"], "unit");
        assert_eq!(value["final_best"], 8);
        assert_eq!(value["num_blocks"], 2);
        assert_eq!(value["best_layout"][1]["left"], 3);
        assert_eq!(value["config"]["population_size"], 50);
    }

    #[test]
    fn test_write_json_creates_directory_and_file() {
        let dir = std::env::temp_dir().join("strip-pack-report-test");
        let _ = fs::remove_dir_all(&dir);
        let report = GaReport::new("run-a", 10, GaConfig::default(), ga_outcome());
        let path = report.write_json(&dir).unwrap();
        assert!(path.ends_with("run-a.json"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"final_best\": 8"));
        fs::remove_dir_all(&dir).unwrap();
    }
}

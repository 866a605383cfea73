//! Simulated annealing engine: solutions, cooling schedules and the driver.

pub mod runner;
pub mod solution;

pub use runner::{CoolingSchedule, SaConfig, SaOutcome, SaRunner, SaStop};
pub use solution::Solution;

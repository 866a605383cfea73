//! Genetic search engine: individuals, population operators and the driver.

pub mod individual;
pub mod population;
pub mod runner;

pub use individual::Individual;
pub use population::Population;
pub use runner::{GaConfig, GaOutcome, GaRunner, GaStop};

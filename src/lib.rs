//! Strip packing by metaheuristic search.
//!
//! Places rectangular blocks into a fixed-width strip of cells, minimizing
//! the occupied height. Two engines share the same layout representation:
//! a genetic algorithm ([`GaRunner`]) and simulated annealing
//! ([`SaRunner`]). Layouts live in a [`Space`], a cell grid stamped with
//! block ids; initial layouts come from a randomized constructive
//! heuristic, and every engine move keeps layouts overlap-free and
//! id-ordered bottom to top.
//!
//! ```no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use strip_pack::{GaConfig, GaRunner, GaStop, ProblemInstance};
//!
//! # fn main() -> strip_pack::Result<()> {
//! let mut rng = StdRng::seed_from_u64(42);
//! let problem = ProblemInstance::generate("demo", 100, 40, &mut rng);
//! let config = GaConfig::new().with_stop(GaStop::Generations(50));
//! let runner = GaRunner::new(config, problem.space_width(), problem.blocks().to_vec());
//! let outcome = runner.run(&mut rng)?;
//! println!("best height: {}", outcome.final_best);
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod ga;
pub mod heuristic;
pub mod problem;
pub mod report;
pub mod sa;
pub mod space;

pub use block::{Block, Position};
pub use config::{Algorithm, Settings};
pub use error::{Error, Result};
pub use ga::{GaConfig, GaOutcome, GaRunner, GaStop, Individual, Population};
pub use heuristic::{construct_layout, GA_SLACK, SA_SLACK};
pub use problem::ProblemInstance;
pub use report::{GaReport, SaReport};
pub use sa::{CoolingSchedule, SaConfig, SaOutcome, SaRunner, SaStop, Solution};
pub use space::{Gene, Space};

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use strip_pack::{
    Algorithm, GaReport, GaRunner, ProblemInstance, SaReport, SaRunner, Settings,
};

/// Strip packing by genetic search or simulated annealing.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Settings file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Run name, used for the report file.
    #[arg(long, default_value = "run")]
    name: String,

    /// Seed for the random number generator (default: from entropy).
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for the genetic engine, overriding the settings file.
    #[arg(long)]
    n_jobs: Option<usize>,

    /// Output directory for reports.
    #[arg(short, long, default_value = "results")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let problem = ProblemInstance::generate(
        &cli.name,
        settings.problem.num_blocks,
        settings.problem.space_width,
        &mut rng,
    );
    log::info!(
        "problem '{}': {} blocks in a width-{} strip",
        problem.name(),
        problem.blocks().len(),
        problem.space_width()
    );

    let path = match settings.problem.algorithm {
        Algorithm::Genetic => {
            let config = settings.to_ga_config(cli.n_jobs);
            let runner =
                GaRunner::new(config.clone(), problem.space_width(), problem.blocks().to_vec());
            let outcome = runner.run(&mut rng).context("genetic run failed")?;
            println!(
                "best height {} after {} generations in {:.2?}",
                outcome.final_best, outcome.generations, outcome.elapsed
            );
            GaReport::new(&cli.name, problem.space_width(), config, outcome).write_json(&cli.out)?
        }
        Algorithm::SimulatedAnnealing => {
            let config = settings.to_sa_config();
            let runner =
                SaRunner::new(config.clone(), problem.space_width(), problem.blocks().to_vec());
            let outcome = runner.run(&mut rng).context("annealing run failed")?;
            println!(
                "best height {} after {} iterations in {:.2?}",
                outcome.best_fitness, outcome.iterations, outcome.elapsed
            );
            SaReport::new(&cli.name, problem.space_width(), config, outcome).write_json(&cli.out)?
        }
    };
    println!("report written to {}", path.display());
    Ok(())
}

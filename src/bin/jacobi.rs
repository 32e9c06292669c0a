//! Jacobi solver command-line interface.
//!
//! ```sh
//! jacobi -n 1000 -d 0.5 --workers 4
//! jacobi A.bin b.bin x.bin --workers 9 --config solver.toml
//! ```
//! Workers are threads of this process; the wall time of the solve is
//! printed to stderr in seconds.
use anyhow::{ensure, Context};
use clap::Parser;
use grid_decomp::functions::broadcast_scalar;
use jacobi_grid::io::{read_system, write_binary_file};
use jacobi_grid::utils::random_system;
use jacobi_grid::{solve, Collective, JacobiConfig, JacobiError, ThreadUniverse};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "jacobi")]
#[command(about = "Solve a dense diagonally dominant system Ax = b with the Jacobi iteration")]
#[command(version)]
struct Cli {
    /// Solve a random system of this size instead of reading files.
    #[arg(short, conflicts_with = "files")]
    n: Option<usize>,
    /// Difficulty of the random system, 0.0 (easiest) to 1.0.
    #[arg(short, default_value_t = 0.5, requires = "n")]
    difficulty: f64,
    /// Seed of the random system.
    #[arg(long, requires = "n")]
    seed: Option<u64>,
    /// Binary input matrix, input vector and output solution.
    #[arg(num_args = 3, value_names = ["INPUT_A", "INPUT_B", "OUTPUT_X"], required_unless_present = "n")]
    files: Vec<PathBuf>,
    /// Number of workers; must be 1 or a perfect square.
    #[arg(long, default_value_t = 1)]
    workers: usize,
    /// Solver settings (toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    ensure!(cli.workers > 0, "at least one worker is required");

    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            JacobiConfig::from_toml(&text)?
        }
        None => JacobiConfig::default(),
    };

    // input is loaded once, on behalf of the coordinator
    let (n, a, b) = match cli.n {
        Some(n) => {
            ensure!(n > 0, "system size must be positive");
            let (a, b) = random_system(n, cli.difficulty, cli.seed);
            (n, a, b)
        }
        None => read_system(&cli.files[0], &cli.files[1]).context("reading input")?,
    };

    let results = ThreadUniverse::new(cli.workers).run(|world| {
        let root = world.rank() == 0;
        let mut n = if root { n } else { 0 };
        broadcast_scalar(&world, 0, &mut n)?;
        let (a, b) = if root { (&a[..], &b[..]) } else { (&[][..], &[][..]) };
        let mut x = vec![0.; if root { n } else { 0 }];

        let start = Instant::now();
        let report = solve(n, a, b, &mut x, world, &config)?;
        Ok::<_, JacobiError>((report, start.elapsed(), x))
    });

    // every worker reports the same outcome, the coordinator holds x
    let (report, elapsed, x) = results
        .into_iter()
        .next()
        .context("no worker returned")??;
    log::info!(
        "{} iterations, residual {:.3e}",
        report.iterations,
        report.residual
    );
    eprintln!("{}", elapsed.as_secs_f64());

    if let Some(out) = cli.files.get(2) {
        write_binary_file(out, &x).with_context(|| format!("writing {}", out.display()))?;
    }
    Ok(())
}

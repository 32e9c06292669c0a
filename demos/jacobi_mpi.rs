//! Jacobi solver with one mpi process per worker. Run with
//!
//! cargo mpirun --np 4 --example jacobi_mpi --features mpi -- -n 1000
//!
//! or with files: `-- A.bin b.bin x.bin`. Only rank 0 touches files.
use anyhow::{ensure, Context};
use clap::Parser;
use grid_decomp::functions::{broadcast_scalar, root_verdict};
use grid_decomp::mpi_comm::{initialize, MpiComm};
use jacobi_grid::io::{read_system, write_binary_file};
use jacobi_grid::utils::random_system;
use jacobi_grid::{solve, Collective, JacobiConfig};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "jacobi_mpi")]
struct Cli {
    /// Solve a random system of this size instead of reading files.
    #[arg(short, conflicts_with = "files")]
    n: Option<usize>,
    /// Difficulty of the random system, 0.0 (easiest) to 1.0.
    #[arg(short, default_value_t = 0.5, requires = "n")]
    difficulty: f64,
    /// Binary input matrix, input vector and output solution.
    #[arg(num_args = 3, value_names = ["INPUT_A", "INPUT_B", "OUTPUT_X"], required_unless_present = "n")]
    files: Vec<PathBuf>,
    /// Solver settings (toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let universe = initialize().context("mpi is already initialized")?;
    let world = MpiComm::world(&universe);
    let root = world.rank() == 0;

    let config = match &cli.config {
        Some(path) => JacobiConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => JacobiConfig::default(),
    };

    let mut input = None;
    let loaded = root_verdict(&world, 0, || {
        input = Some(match cli.n {
            Some(n) => Ok((n, random_system(n, cli.difficulty, None))),
            None => read_system(&cli.files[0], &cli.files[1]).map(|(n, a, b)| (n, (a, b))),
        });
        matches!(input, Some(Ok(_)))
    })?;
    if !loaded {
        // only the coordinator knows what went wrong
        if let Some(Err(e)) = input {
            return Err(e).context("reading input");
        }
        anyhow::bail!("coordinator failed to load input");
    }
    let (mut n, (a, b)) = match input {
        Some(Ok(system)) => system,
        _ => (0, (vec![], vec![])),
    };
    broadcast_scalar(&world, 0, &mut n)?;
    ensure!(n > 0, "system size must be positive");
    let mut x = vec![0.; if root { n } else { 0 }];

    let start = Instant::now();
    let report = solve(n, &a, &b, &mut x, world, &config)?;
    if root {
        log::info!(
            "{} iterations, residual {:.3e}",
            report.iterations,
            report.residual
        );
        eprintln!("{}", start.elapsed().as_secs_f64());
        if let Some(out) = cli.files.get(2) {
            write_binary_file(out, &x)?;
        }
    }
    Ok(())
}

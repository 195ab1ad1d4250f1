mod campaign;
mod common;
mod events;
mod output;
mod run;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use common::{parse_priorities, random_priorities, ring_config, seeded_rng};
use events::{emit, EventStarted};

#[derive(Parser)]
#[command(name = "hs-sim", about = "Hirschberg-Sinclair leader election simulator")]
struct Cli {
    /// Name used in events and output file names.
    #[arg(short, long, default_value = "ring")]
    name: String,

    /// Also write JSONL events to `<dir>/<name>_<mode>_<timestamp>.jsonl`.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Election timeout in ms (default: $HS_ELECTION_TIMEOUT_MS or 30000).
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one election and report the leader.
    Run {
        /// Ring size, priorities drawn at random from 1..=N^4.
        #[arg(long, conflicts_with = "priorities", required_unless_present = "priorities")]
        nodes: Option<usize>,
        /// Explicit priorities, clockwise from P0 (comma-separated).
        #[arg(long)]
        priorities: Option<String>,
        /// Seed for random priorities.
        #[arg(long)]
        seed: Option<u64>,
        /// Emit every process event as a JSONL line.
        #[arg(long)]
        trace: bool,
        /// Refuse duplicate priorities instead of breaking ties by position.
        #[arg(long)]
        strict: bool,
    },

    /// Run elections over a range of ring sizes with random priorities.
    Campaign {
        /// Smallest ring size.
        #[arg(long, default_value = "1")]
        min_nodes: usize,
        /// Largest ring size.
        #[arg(long, default_value = "64")]
        max_nodes: usize,
        /// Size increment.
        #[arg(long, default_value = "1")]
        step: usize,
        /// Elections per ring size.
        #[arg(long, default_value = "3")]
        runs: u32,
        /// Base seed (run k uses seed + k).
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    let mode = match cli.command {
        Command::Run { .. } => "run",
        Command::Campaign { .. } => "campaign",
    };
    if let Some(dir) = &cli.output_dir {
        let path = output::resolve_output_path(dir, &cli.name, mode)?;
        output::init_jsonl_writer(&path)?;
        eprintln!("Writing events to {}", path.display());
    }

    eprintln!("hs-sim v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run {
            nodes,
            priorities,
            seed,
            trace,
            strict,
        } => {
            let (priorities, seed) = match (priorities, nodes) {
                (Some(list), _) => (parse_priorities(&list)?, None),
                (None, Some(n)) if n > 0 => {
                    let (mut rng, seed) = seeded_rng(seed);
                    (random_priorities(n, &mut rng), Some(seed))
                }
                _ => anyhow::bail!("--nodes must be at least 1"),
            };

            emit(&EventStarted::new(&cli.name, mode, priorities.len()));
            run::run(
                run::RunConfig {
                    priorities,
                    seed,
                    ring: ring_config(cli.timeout_ms, strict, trace),
                    trace,
                },
                start,
            )
            .await?;
        }

        Command::Campaign {
            min_nodes,
            max_nodes,
            step,
            runs,
            seed,
        } => {
            emit(&EventStarted::new(&cli.name, mode, max_nodes));
            campaign::run(campaign::CampaignConfig {
                name: cli.name,
                min_nodes,
                max_nodes,
                step,
                runs_per_size: runs,
                seed,
                timeout_ms: cli.timeout_ms,
            })
            .await?;
        }
    }

    Ok(())
}

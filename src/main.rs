//! pulsegrid CLI - rhythms, grid walks and real-time OSC playback

use clap::{Parser, Subcommand, ValueEnum};
use pulsegrid::boundary::BoundaryMode;
use pulsegrid::config::{Config, WalkConfig};
use pulsegrid::dispatcher::RealtimeDispatcher;
use pulsegrid::euclid::distribute;
use pulsegrid::grid::Grid;
use pulsegrid::message::args_to_json;
use pulsegrid::sampler::{DrunkParams, GridWalk};
use pulsegrid::transport::OscTransport;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pulsegrid")]
#[command(about = "Euclidean rhythms, grid sampling and timed OSC dispatch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a Euclidean rhythm as x..x..x.
    Euclid {
        /// Number of onsets
        events: usize,

        /// Number of slots
        positions: usize,

        /// Start the pattern at this slot
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        rotation: i64,
    },

    /// Walk a gradient grid and print the visited positions
    Walk {
        /// Sampler to use
        #[arg(short, long, value_enum, default_value = "raster")]
        sampler: SamplerKind,

        #[arg(long, default_value = "8")]
        rows: usize,

        #[arg(long, default_value = "8")]
        cols: usize,

        /// Number of samples
        #[arg(short = 'n', long, default_value = "16")]
        steps: usize,

        /// Start position as row,col
        #[arg(long, value_parser = parse_position, default_value = "0,0")]
        start: [usize; 2],

        /// End position for the line sampler as row,col
        #[arg(long, value_parser = parse_position, default_value = "7,7")]
        end: [usize; 2],

        /// Edge handling for the drunk sampler (wrap, reflect, clamp)
        #[arg(long, default_value = "wrap")]
        mode: BoundaryMode,

        /// Seed for the random samplers
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Compose a config offline and print its events as JSON lines
    Render {
        /// TOML config file
        config: PathBuf,
    },

    /// Compose a config and send it to its OSC target in real time
    Play {
        /// TOML config file
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SamplerKind {
    Raster,
    Drunk,
    Random,
    Distribution,
    Line,
}

fn parse_position(s: &str) -> Result<[usize; 2], String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected row,col, got '{s}'"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row: {e}"))?;
    let col = col.trim().parse().map_err(|e| format!("bad column: {e}"))?;
    Ok([row, col])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Euclid {
            events,
            positions,
            rotation,
        } => {
            let rhythm = distribute(events, positions)?.rotated(rotation);
            println!("{rhythm}");
        }

        Commands::Walk {
            sampler,
            rows,
            cols,
            steps,
            start,
            end,
            mode,
            seed,
        } => {
            let walk = match sampler {
                SamplerKind::Raster => WalkConfig::Raster {
                    start,
                    primary: (0, 1),
                    secondary: (1, 0),
                },
                SamplerKind::Drunk => WalkConfig::Drunk {
                    start,
                    params: DrunkParams {
                        mode,
                        ..DrunkParams::default()
                    },
                },
                SamplerKind::Random => WalkConfig::Random,
                SamplerKind::Distribution => WalkConfig::Distribution {
                    row: Default::default(),
                    col: Default::default(),
                },
                SamplerKind::Line => WalkConfig::Line {
                    start,
                    end,
                    steps: steps.saturating_sub(1).max(1),
                },
            };

            let grid = Grid::gradient(rows, cols)?;
            let (walk, log) = GridWalk::new(&grid, walk.build(seed)?, Some(steps))?.logged();
            for sample in walk {
                println!("{} {:.3}", sample.position, sample.value[0]);
            }
            println!();
            print!("{}", log.render_ascii(grid.bounds()));
        }

        Commands::Render { config } => {
            let config = Config::load(&config)?;
            for event in config.render()? {
                let args = args_to_json(&event.payload);
                let line = serde_json::json!({
                    "time": event.time,
                    "address": event.payload.addr,
                    "args": args,
                });
                println!("{line}");
            }
        }

        Commands::Play { config } => {
            let config = Config::load(&config)?;
            let events = config.render()?;
            let transport = OscTransport::connect(&config.output.target)?;

            let handle = RealtimeDispatcher::new(transport)
                .with_policy(config.output.send_policy())
                .spawn(events);

            let cancel = handle.cancel_token();
            let interrupt = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupted, stopping playback");
                    cancel.cancel();
                }
            });

            let report = handle.join().await?;
            interrupt.abort();

            println!(
                "sent {} / failed {} / retried {}{}",
                report.sent,
                report.failed,
                report.retried,
                if report.cancelled { " (cancelled)" } else { "" }
            );
        }
    }

    Ok(())
}

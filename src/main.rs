use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use timetable_planner::config::PlannerConfig;
use timetable_planner::display::{print_schedule, write_schedule_to_file};
use timetable_planner::form::{export_subject_to_csv, validate_subject, SubjectRequest};
use timetable_planner::parser::load_subjects;
use timetable_planner::schedule::{build_schedule_with, OptionalOrder, Strategy, SubjectId, TimetableGrid};
use timetable_planner::web;

/// Weekly timetable planner
#[derive(Debug, Parser)]
#[command(name = "timetable-planner", version, about = "Build conflict-free weekly timetables")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a timetable from a subject CSV
    Generate {
        csv: PathBuf,
        /// Also write the rendered timetable to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Shuffle optional subjects with this seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate one subject and append it to a subject CSV
    Add {
        csv: PathBuf,
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        day: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        required: bool,
    },
    /// Print the selectable start/end times
    Options,
    /// Run the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    Greedy,
    EarliestEnd,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::EarliestEnd => Strategy::EarliestEnd,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = PlannerConfig::load().context("failed to load configuration")?;

    match cli.command {
        Command::Generate { csv, output, strategy, seed } => {
            let candidates = load_subjects(&csv)
                .with_context(|| format!("failed to read subjects from {}", csv.display()))?;
            info!(count = candidates.len(), path = %csv.display(), "loaded subjects");

            let mut options = config.generate.options();
            if let Some(strategy) = strategy {
                options.strategy = strategy.into();
            }
            if let Some(seed) = seed {
                options.optional_order = OptionalOrder::Shuffled { seed };
            }

            let outcome = build_schedule_with(&candidates, &options);
            let grid = TimetableGrid::from_schedule(&outcome.accepted, config.grid.hours());
            print_schedule(&outcome, &grid);

            if let Some(output) = output {
                write_schedule_to_file(&outcome, &grid, &output)
                    .with_context(|| format!("failed to write {}", output.display()))?;
                println!("\nTimetable saved to {}", output.display());
            }
        }
        Command::Add { csv, id, name, day, start, end, required } => {
            let request = SubjectRequest {
                name,
                day: Some(day),
                start: Some(start),
                end: Some(end),
                required,
            };
            let valid = validate_subject(&request, config.slots.max_end())?;
            export_subject_to_csv(SubjectId(id), &valid, &csv)?;
            println!("Added {} to {}", valid.name, csv.display());
        }
        Command::Options => {
            let labels: Vec<String> = config.slots.options().map(|t| t.to_string()).collect();
            println!("{}", labels.join(" "));
        }
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            println!("Access the API at http://localhost:{}", config.server.port);
            web::start_server(config).await?;
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TIMETABLE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

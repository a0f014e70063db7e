use crate::infra::load_catalog;
use crate::server;
use clap::{Args, Parser, Subcommand};
use mvp_planner::config::AppConfig;
use mvp_planner::domain::MeasureId;
use mvp_planner::error::AppError;
use mvp_planner::scoring::{clamp_rate, parse_rate};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "MVP Planner",
    about = "Plan MVP participation and score measure performance against benchmarks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single performance rate and print the result as JSON
    Score(ScoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory holding clinicians.csv, mvps.csv, measures.csv and benchmarks.csv
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Quality measure id, e.g. 001
    #[arg(long)]
    measure: String,
    /// Collection type; defaults to the measure's first listed type
    #[arg(long)]
    collection_type: Option<String>,
    /// Performance rate, 0-100; a trailing % is accepted
    #[arg(long)]
    rate: String,
    /// Directory holding the catalog exports
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
    }
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(dir) = args.data_dir {
        config.planner.data_dir = Some(dir);
    }

    let catalog = load_catalog(&config.planner);
    let measure_id = MeasureId::from(args.measure);
    let collection_type = args
        .collection_type
        .unwrap_or_else(|| catalog.default_collection_type(&measure_id).to_string());
    let rate = clamp_rate(parse_rate(&args.rate));
    let score = catalog.engine().score(&measure_id, &collection_type, rate);

    let report = serde_json::json!({
        "measure_id": measure_id,
        "collection_type": collection_type,
        "rate": rate,
        "decile": score.decile,
        "points": score.points,
        "direction": score.direction,
        "basis": score.basis,
    });
    println!("{report:#}");
    Ok(())
}

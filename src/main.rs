//! CLI entry point for the slot concentration analyses.
//!
//! Each subcommand runs one analysis over local CSV inputs and writes its
//! results into an output directory.

use anyhow::Result;
use clap::{Parser, Subcommand};
use slot_hhi::analyzers::analyzer::{run_airport_hhi, run_expansion, run_route_hhi, run_slots};
use slot_hhi::config::AnalysisConfig;
use slot_hhi::output::OutputDir;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "slot_hhi")]
#[command(about = "Airline market concentration (HHI) across airports and routes", long_about = None)]
struct Cli {
    /// JSON analysis config; built-in defaults apply when omitted
    #[arg(long, global = true, env = "SLOT_HHI_CONFIG")]
    config: Option<PathBuf>,

    /// Gzip-compress every output file
    #[arg(long, global = true, default_value_t = false)]
    gzip: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Departures per airline group and season at each airport
    Slots {
        /// Directory with <AIRPORT>.csv slot sheets and <AIRPORT>_NEW_ENTRANT.csv lists
        #[arg(short, long, default_value = "slots")]
        slots_dir: PathBuf,

        #[arg(short, long, default_value = "Result1")]
        output_dir: PathBuf,
    },
    /// HHI per airport and season from market-share percentages
    AirportHhi {
        /// Directory with <AIRPORT>.csv slot sheets and <AIRPORT>_NEW_ENTRANT.csv lists
        #[arg(short, long, default_value = "slots")]
        slots_dir: PathBuf,

        #[arg(short, long, default_value = "Result3")]
        output_dir: PathBuf,
    },
    /// HHI per origin airport, destination region and year
    RouteHhi {
        /// Schedule CSV
        #[arg(value_name = "SCHEDULE")]
        schedule: PathBuf,

        /// Directory with <AIRPORT>_NEW_ENTRANT.csv lists
        #[arg(short = 'e', long, default_value = "slots")]
        entrants_dir: PathBuf,

        #[arg(short, long, default_value = "Result4")]
        output_dir: PathBuf,
    },
    /// Lufthansa capacity changes on former Air Berlin routes
    Expansion {
        /// Schedule CSV
        #[arg(value_name = "SCHEDULE")]
        schedule: PathBuf,

        #[arg(short, long, default_value = "Result5")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/slot_hhi.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("slot_hhi.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = AnalysisConfig::load_or_default(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Slots {
            slots_dir,
            output_dir,
        } => run_slots(&config, &slots_dir, &OutputDir::create(output_dir, cli.gzip)?),
        Commands::AirportHhi {
            slots_dir,
            output_dir,
        } => run_airport_hhi(&config, &slots_dir, &OutputDir::create(output_dir, cli.gzip)?),
        Commands::RouteHhi {
            schedule,
            entrants_dir,
            output_dir,
        } => run_route_hhi(
            &config,
            &schedule,
            &entrants_dir,
            &OutputDir::create(output_dir, cli.gzip)?,
        ),
        Commands::Expansion {
            schedule,
            output_dir,
        } => run_expansion(&config, &schedule, &OutputDir::create(output_dir, cli.gzip)?),
    };

    match result {
        Ok(written) => {
            for path in &written {
                info!(path = %path.display(), "Saved");
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            Err(e)
        }
    }
}

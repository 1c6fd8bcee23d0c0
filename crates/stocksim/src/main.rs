use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stocksim::cli::{self, SimulateArgs};
use stocksim::config::API_URL_ENV;
use stocksim::state::AppState;
use stocksim::{App, AppConfig, HttpGateway, Session, SimulationWorker, init_logging};
use stocksim_core::PortfolioModel;

#[derive(Parser, Debug)]
#[command(name = "stocksim")]
#[command(about = "A terminal client for Monte Carlo stock portfolio simulations")]
struct Args {
    /// Path to the data directory (default: ~/.stocksim/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Base URL of the simulation service
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the simulation service is reachable
    Health,
    /// Run one simulation without the terminal UI
    Simulate {
        /// Holding as TICKER=WEIGHT; repeat for each stock
        #[arg(long = "holding")]
        holdings: Vec<String>,

        /// Trading days to simulate
        #[arg(long)]
        days: Option<u32>,

        /// Number of Monte Carlo trials
        #[arg(long)]
        simulations: Option<u32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stocksim")
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let config =
        AppConfig::load(&data_dir).with_overrides(std::env::var(API_URL_ENV).ok(), args.api_url);
    tracing::info!(api_url = %config.api_url, "Using simulation service");

    let gateway = HttpGateway::new(&config.api_url, config.request_timeout())?;

    match args.command {
        Some(Command::Health) => {
            let healthy = cli::run_health(&gateway, &mut io::stdout())?;
            return Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Some(Command::Simulate {
            holdings,
            days,
            simulations,
            json,
        }) => {
            let request = SimulateArgs {
                holdings,
                days,
                simulations,
                json,
            };
            cli::run_simulate(&request, config.parameters(), &gateway, &mut io::stdout())?;
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    let session = Session::new(PortfolioModel::default(), config.parameters());
    let state = AppState::new(session, config.api_url.clone());
    let mut app = App::new(state, SimulationWorker::new(gateway));

    ratatui::run(|terminal| app.run(terminal))?;

    tracing::info!("Application shutting down");

    if let Err(err) = ratatui::try_restore() {
        tracing::error!("Failed to restore terminal: {err}");
    }

    Ok(ExitCode::SUCCESS)
}

//! Terminal client for a remote Monte Carlo stock simulation service
//!
//! The UI edits a portfolio and simulation parameters, sends them to the service
//! through a background worker, and charts the returned results. The same session
//! drives the headless `health` and `simulate` subcommands.

pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod screens;
pub mod session;
pub mod state;
pub mod worker;

pub use app::App;
pub use config::AppConfig;
pub use gateway::{GatewayError, HealthStatus, HttpGateway, SimulationGateway};
pub use logging::init_logging;
pub use session::Session;
pub use worker::SimulationWorker;

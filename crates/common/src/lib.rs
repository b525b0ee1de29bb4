use clap::{Parser, Subcommand};
use database::Database;

pub mod extract;
pub mod kind;
pub mod money;
pub mod period;
pub mod validation;

pub use kind::Kind;
pub use period::YearMonth;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:finance.db")]
    pub database_url: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    #[arg(long, env = "MAX_CONNECTIONS", default_value = "5")]
    pub max_connections: u32,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Insert the default category tree and exit.
    Seed,
}

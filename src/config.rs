//! Runtime configuration from command-line flags and environment variables.

use std::path::PathBuf;

use clap::Parser;

/// Review Roster - assigns pull request reviewers within teams
#[derive(Parser, Debug, Clone)]
#[command(name = "review-roster")]
#[command(about = "Review Roster - assigns pull request reviewers within teams")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// SQLite database file (parent directories are created)
    #[arg(long, env = "DATABASE_PATH", default_value = "review-roster.db")]
    pub database_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

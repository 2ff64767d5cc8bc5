//! Command-line interface for tictac_duel.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tictac Duel - two-player tic-tac-toe over TCP
#[derive(Parser, Debug)]
#[command(name = "tictac_duel")]
#[command(about = "Networked two-player tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host one game per port
    Server {
        /// Ports to listen on
        #[arg(required = true, num_args = 1..)]
        ports: Vec<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Join a game as a player
    Client {
        /// Server host name or address
        host: String,

        /// Server port
        port: u16,

        /// File to write logs to (overrides the config file)
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

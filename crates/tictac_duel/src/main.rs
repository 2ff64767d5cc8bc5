//! Tictac Duel - unified CLI
//!
//! Runs either the game server or a terminal player.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tictac_duel::{Client, ClientEvent, DuelConfig, Server, render, spawn_stdin_reader};
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version are not failures.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    match cli.command {
        Command::Server {
            ports,
            host,
            config,
        } => run_server(ports, host, config).await,
        Command::Client {
            host,
            port,
            log_file,
            config,
        } => run_client(host, port, log_file, config).await,
    }
}

/// `RUST_LOG` if set, the configured filter otherwise.
fn env_filter(config: &DuelConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.logging().filter()))
}

/// Run one game server per port until Ctrl-C
async fn run_server(ports: Vec<u16>, host: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let mut config = DuelConfig::load(config.as_deref())?;
    if let Some(host) = host {
        config.set_host(host);
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config))
        .init();

    info!(?ports, host = %config.server().host(), "Starting tictac_duel server");

    let mut servers = JoinSet::new();
    for port in ports {
        let server = Server::bind(config.server().host(), port)
            .await
            .with_context(|| format!("could not start server on port {port}"))?;
        servers.spawn(server.run());
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("could not listen for Ctrl-C")?;
                info!("Shutting down");
                break;
            }
            joined = servers.join_next() => match joined {
                Some(Ok(Ok(()))) => info!("Server stopped"),
                Some(Ok(Err(err))) => error!(error = %err, "Server failed"),
                Some(Err(err)) => error!(error = %err, "Server task aborted"),
                None => {
                    info!("All servers stopped");
                    break;
                }
            },
        }
    }

    servers.shutdown().await;
    Ok(())
}

/// Run the terminal player
async fn run_client(
    host: String,
    port: u16,
    log_file: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let mut config = DuelConfig::load(config.as_deref())?;
    if let Some(log_file) = log_file {
        config.set_log_file(log_file);
    }

    // Setup logging to file to avoid interfering with the board
    let path = config.client().log_file();
    let log_file = std::fs::File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config))
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();

    info!(%host, port, "Starting tictac_duel client");

    let (client, mut events) = Client::connect(&host, port).await?;
    println!("WAITING FOR THE GAME TO START...");

    // Blocking stdin lives on its own thread; it dies with the process.
    spawn_stdin_reader(client.clone()).context("could not start input thread")?;

    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Update(update) => print!("{}", render(&update)),
            ClientEvent::Disconnected => {
                println!("Disconnected from the server");
                break;
            }
        }
    }

    client.close();
    Ok(())
}

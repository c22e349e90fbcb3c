//! Pokedex - interactive shell over the pokecache store
//!
//! Restores caught Pokemon from the snapshot file on start and writes them
//! back on every way out: `exit`, end of input, Ctrl+C or SIGTERM.

use std::io::{BufRead, Write};

use anyhow::Context;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokecache::app::{dispatch, Command, Flow};
use pokecache::{AppContext, Config};

/// Main entry point for the Pokedex shell.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and restore the durable snapshot
/// 4. Serve commands until exit, end of input or a shutdown signal
/// 5. Save the snapshot and stop the sweeper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokecache=info,pokedex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, sweep_interval={}s, snapshot={}",
        config.default_ttl,
        config.sweep_interval,
        config.snapshot_path.display()
    );

    let ctx = AppContext::start(config)
        .await
        .context("Failed to load pokedex")?;

    println!("Pokedex REPL (type 'help' to explore menus or 'exit' to quit)");
    let served = run_repl(&ctx).await;

    println!("Saving Pokedex before exiting...");
    match ctx.shutdown().await {
        Ok(count) => println!("Pokedex saved successfully ({} caught).", count),
        Err(err) => {
            warn!("Snapshot save failed: {}", err);
            return Err(err).context("Failed to save pokedex");
        }
    }

    served
}

/// Reads and dispatches commands until the session ends.
async fn run_repl(ctx: &AppContext) -> anyhow::Result<()> {
    let mut lines = spawn_stdin_reader();
    let mut stdout = std::io::stdout();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        print!("Pokedex> ");
        stdout.flush()?;

        let line = tokio::select! {
            line = lines.recv() => line.transpose().context("Failed to read input")?,
            signal = &mut shutdown => {
                println!();
                info!("Received {}, shutting down", signal?);
                return Ok(());
            }
        };

        // End of input
        let Some(line) = line else {
            println!();
            return Ok(());
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };

        match dispatch(ctx, command, &mut stdout).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(err) => println!("Error: {}", err),
        }
    }
}

/// Forwards stdin lines from a detached thread so a pending read never
/// holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Resolves with the signal name on Ctrl+C or SIGTERM.
async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => res.map(|_| "Ctrl+C"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map(|_| "Ctrl+C")
    }
}

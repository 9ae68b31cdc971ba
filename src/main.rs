//! `presencewatch` binary.
//!
//! Polls the default user's presence, prints every new HTML fragment to stdout
//! and logs events to stderr. Type `r` or `retry` on stdin to retry right away.
//! Stops on SIGINT, SIGTERM or SIGQUIT.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use presencewatch::{
    shutdown_signal, Config, ControllerHandle, HtmlRenderer, LanyardClient, LogWriter, Subscribe,
    Watcher,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cfg = Config::default();
    let client = LanyardClient::new(&cfg).context("building lanyard client")?;
    let (renderer, fragments) = HtmlRenderer::new(cfg.user_id.clone());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    info!(endpoint = %cfg.endpoint(), interval = ?cfg.poll_interval, "watching presence");
    let watcher = Watcher::start(&cfg, Arc::new(client), Arc::new(renderer), subs);

    let printer = tokio::spawn(print_fragments(fragments));
    let input = tokio::spawn(read_commands(watcher.handle()));

    let signal = shutdown_signal().await.context("registering signal handlers")?;
    info!(signal, "shutting down");

    input.abort();
    watcher.shutdown().await;
    let _ = printer.await;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Prints the current fragment and every change until the renderer is dropped.
async fn print_fragments(mut rx: watch::Receiver<String>) {
    loop {
        println!("{}", *rx.borrow_and_update());
        if rx.changed().await.is_err() {
            break;
        }
    }
}

/// Maps `r` / `retry` lines to manual retries until stdin closes.
async fn read_commands(handle: ControllerHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "r" | "retry" => {
                if let Err(e) = handle.manual_retry().await {
                    warn!(error = %e, "manual retry rejected");
                    break;
                }
            }
            "" => {}
            other => warn!(input = other, "unknown command, type `retry`"),
        }
    }
}

//! OSC Relay Harness
//!
//! Loads the relay module against an in-process host and replays host
//! callbacks read from stdin, one per line:
//!
//! ```text
//! open A
//! open B
//! out A /mixer/gain 3 0.5
//! close A
//! ```
//!
//! Every `send` / `receive` the module asks the host for is logged.

mod command;

use anyhow::{bail, Result};
use clap::Parser;
use osc_relay::{
    ChannelHost, ClientBroadcastRelay, HostAction, HostCapabilities, HostHandle, ModuleRunner,
    OutboundMessage, RelayConfig, Settings,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::Command;

#[derive(Parser)]
#[command(name = "osc-relay-harness")]
#[command(about = "Replay GUI server callbacks against the OSC relay module")]
#[command(version)]
struct Cli {
    /// JSON settings file (must contain a "send" target)
    #[arg(short, long, conflicts_with = "send")]
    settings: Option<PathBuf>,

    /// Controller targets as host:port
    #[arg(long, num_args = 1..)]
    send: Vec<String>,

    /// Do not report client counts to the controller
    #[arg(long)]
    no_notify: bool,

    /// Host the replayed GUI messages are addressed to
    #[arg(long, default_value = "127.0.0.1")]
    gui_host: String,

    /// Port the replayed GUI messages are addressed to
    #[arg(long, default_value_t = 8080)]
    gui_port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = match (&cli.settings, cli.send.is_empty()) {
        (Some(path), _) => Settings::from_file(path)?,
        (None, false) => Settings::with_send(cli.send.iter().cloned()),
        (None, true) => bail!("either --settings or --send is required"),
    };

    let config = RelayConfig {
        notify_controller: !cli.no_notify,
        ..Default::default()
    };

    let (host, mut actions) = ChannelHost::new(settings);
    let relay = ClientBroadcastRelay::new(config, HostCapabilities::from_host(Arc::new(host)));
    let (handle, calls) = HostHandle::channel(64);
    let runner = tokio::spawn(ModuleRunner::new(relay).run(calls));

    let logger = tokio::spawn(async move {
        while let Some(action) = actions.recv().await {
            log_action(&action);
        }
    });

    info!("Reading host callbacks from stdin");
    replay(&handle, &cli.gui_host, cli.gui_port).await;
    drop(handle);

    let relay = runner.await??;
    drop(relay);
    logger.await?;

    info!("Harness finished");
    Ok(())
}

async fn replay(handle: &HostHandle, gui_host: &str, gui_port: u16) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let next = tokio::select! {
            _ = handle.closed() => {
                warn!("Module stopped, no longer reading stdin");
                break;
            }
            next = lines.next_line() => next,
        };

        let line = match next {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("stdin read error: {}", e);
                break;
            }
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping line '{}': {}", line, e);
                continue;
            }
        };

        let result = match command {
            Command::Open(client) => handle.open(client).await,
            Command::Close(client) => handle.close(client).await,
            Command::Out {
                client,
                address,
                args,
            } => {
                let message = OutboundMessage::new(address, args, gui_host, gui_port, client);
                handle.osc_out(message).await.map(|_| ())
            }
        };

        if let Err(e) = result {
            warn!("Module stopped: {}", e);
            break;
        }
    }
}

fn log_action(action: &HostAction) {
    match action {
        HostAction::Send {
            host,
            port,
            address,
            args,
        } => info!("send {}:{} {} {:?}", host, port, address, args),
        HostAction::Receive {
            host,
            port,
            address,
            args,
            context,
        } => info!(
            "receive {}:{} {} {:?} -> client {}",
            host, port, address, args, context.client_id
        ),
    }
}

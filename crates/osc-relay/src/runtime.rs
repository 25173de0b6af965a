//! In-process host runtime
//!
//! Models the GUI server's event loop: a single task owns the module and
//! invokes its hooks serially as host calls arrive. Host actions produced
//! by the module (`send` / `receive`) are surfaced on a channel so callers
//! can forward them to real sockets or inspect them.
//!
//! ```no_run
//! use osc_relay::{
//!     ChannelHost, ClientBroadcastRelay, HostCapabilities, HostHandle, ModuleRunner, RelayConfig,
//!     Settings,
//! };
//! use std::sync::Arc;
//!
//! # async fn demo() -> osc_relay::Result<()> {
//! let (host, mut actions) = ChannelHost::new(Settings::with_send(["127.0.0.1:5555"]));
//! let host = HostCapabilities::from_host(Arc::new(host));
//! let relay = ClientBroadcastRelay::new(RelayConfig::default(), host);
//! let (handle, calls) = HostHandle::channel(64);
//! let runner = tokio::spawn(ModuleRunner::new(relay).run(calls));
//!
//! handle.open("a").await?;
//! while let Ok(action) = actions.try_recv() {
//!     println!("{:?}", action);
//! }
//! drop(handle);
//! runner.await.expect("runner panicked")?;
//! # Ok(())
//! # }
//! ```

use rosc::OscType;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::{RelayError, Result};
use crate::host::{ConfigReader, OscReceiver, OscSender};
use crate::message::{ClientId, OutboundMessage, RoutingContext};
use crate::module::CustomModule;
use crate::settings::Settings;

/// A callback the host invokes on a module
#[derive(Debug)]
pub enum HostCall {
    /// Client connection opened
    Open(ClientId),
    /// Client connection closed
    Close(ClientId),
    /// Message leaving the host toward a client
    OscOut {
        message: OutboundMessage,
        reply: Option<oneshot::Sender<OutboundMessage>>,
    },
}

/// An action a module asked the host to perform
#[derive(Debug, Clone, PartialEq)]
pub enum HostAction {
    /// Fire a message at a fixed endpoint
    Send {
        host: String,
        port: u16,
        address: String,
        args: Vec<OscType>,
    },
    /// Re-inject a message as if received from `host:port`
    Receive {
        host: String,
        port: u16,
        address: String,
        args: Vec<OscType>,
        context: RoutingContext,
    },
}

/// Host capabilities backed by an unbounded action channel and a
/// [`Settings`] store.
pub struct ChannelHost {
    actions: mpsc::UnboundedSender<HostAction>,
    settings: Settings,
}

impl ChannelHost {
    pub fn new(settings: Settings) -> (Self, mpsc::UnboundedReceiver<HostAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                actions: tx,
                settings,
            },
            rx,
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn push(&self, action: HostAction) -> Result<()> {
        self.actions
            .send(action)
            .map_err(|_| RelayError::ChannelClosed)
    }
}

impl OscSender for ChannelHost {
    fn send(&self, host: &str, port: u16, address: &str, args: &[OscType]) -> Result<()> {
        self.push(HostAction::Send {
            host: host.to_string(),
            port,
            address: address.to_string(),
            args: args.to_vec(),
        })
    }
}

impl OscReceiver for ChannelHost {
    fn receive(
        &self,
        host: &str,
        port: u16,
        address: &str,
        args: &[OscType],
        context: &RoutingContext,
    ) -> Result<()> {
        self.push(HostAction::Receive {
            host: host.to_string(),
            port,
            address: address.to_string(),
            args: args.to_vec(),
            context: context.clone(),
        })
    }
}

impl ConfigReader for ChannelHost {
    fn read(&self, key: &str) -> Result<Option<Vec<String>>> {
        self.settings.read(key)
    }
}

/// Handle for submitting host calls to a running [`ModuleRunner`]
#[derive(Debug, Clone)]
pub struct HostHandle {
    calls: mpsc::Sender<HostCall>,
}

impl HostHandle {
    /// Create a bounded call queue and its submitting handle. A `buffer`
    /// of zero is raised to one.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<HostCall>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { calls: tx }, rx)
    }

    pub async fn open(&self, client: impl Into<ClientId>) -> Result<()> {
        self.submit(HostCall::Open(client.into())).await
    }

    pub async fn close(&self, client: impl Into<ClientId>) -> Result<()> {
        self.submit(HostCall::Close(client.into())).await
    }

    /// Run a message through the module's outbound filter and wait for the
    /// filtered result.
    pub async fn osc_out(&self, message: OutboundMessage) -> Result<OutboundMessage> {
        let (tx, rx) = oneshot::channel();
        self.submit(HostCall::OscOut {
            message,
            reply: Some(tx),
        })
        .await?;
        rx.await.map_err(|_| RelayError::ChannelClosed)
    }

    /// Resolves once the runner has stopped accepting calls, whether the
    /// queue drained or `init` failed.
    pub async fn closed(&self) {
        self.calls.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.calls.is_closed()
    }

    pub async fn submit(&self, call: HostCall) -> Result<()> {
        self.calls
            .send(call)
            .await
            .map_err(|_| RelayError::ChannelClosed)
    }
}

/// Drives a [`CustomModule`] from a queue of host calls
pub struct ModuleRunner<M> {
    module: M,
}

impl<M: CustomModule> ModuleRunner<M> {
    pub fn new(module: M) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Initialize the module, then dispatch calls until every handle is
    /// dropped. Returns the module so its final state can be inspected.
    pub async fn run(mut self, mut calls: mpsc::Receiver<HostCall>) -> Result<M> {
        if let Err(e) = self.module.init() {
            error!("Module init failed: {}", e);
            return Err(e);
        }
        info!("Module initialized");

        while let Some(call) = calls.recv().await {
            self.dispatch(call);
        }

        debug!("Host call queue closed");
        Ok(self.module)
    }

    /// Invoke the hook matching a single host call
    pub fn dispatch(&mut self, call: HostCall) {
        match call {
            HostCall::Open(client) => self.module.on_connect(client),
            HostCall::Close(client) => self.module.on_disconnect(&client),
            HostCall::OscOut { message, reply } => {
                let filtered = self.module.filter_outbound(message);
                if let Some(reply) = reply {
                    // Caller may have stopped waiting
                    let _ = reply.send(filtered);
                }
            }
        }
    }

    pub fn into_inner(self) -> M {
        self.module
    }
}

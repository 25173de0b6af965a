//! Client broadcast relay
//!
//! The GUI server's built-in state sync is disabled so that a newly
//! connected client is not overwritten with another client's state. This
//! module replaces it with an explicit rebroadcast: every message leaving
//! the server toward one client is re-injected once for each *other*
//! connected client, leaving the sender's own view untouched.
//!
//! On startup the relay announces `/server-ready` to the controller
//! endpoint (the first `send` target). With `notify_controller` enabled it
//! also reports the client count on `/gui-clients` after every connect and
//! disconnect.

use rosc::OscType;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::endpoint::ControllerEndpoint;
use crate::error::{RelayError, Result};
use crate::host::HostCapabilities;
use crate::message::{ClientId, OutboundMessage, RoutingContext};
use crate::module::CustomModule;
use crate::registry::ClientRegistry;
use crate::settings::SEND_KEY;

/// Address of the readiness announcement
pub const SERVER_READY_ADDRESS: &str = "/server-ready";

/// Address of the client-count notification
pub const GUI_CLIENTS_ADDRESS: &str = "/gui-clients";

/// Relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Report the client count to the controller after connect/disconnect
    #[serde(default = "default_notify_controller")]
    pub notify_controller: bool,
    /// Settings key holding the controller target list
    #[serde(default = "default_controller_key")]
    pub controller_key: String,
}

fn default_notify_controller() -> bool {
    true
}

fn default_controller_key() -> String {
    SEND_KEY.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            notify_controller: default_notify_controller(),
            controller_key: default_controller_key(),
        }
    }
}

/// Tracks connected clients and rebroadcasts outbound messages to every
/// client other than the one they were produced for.
pub struct ClientBroadcastRelay {
    config: RelayConfig,
    host: HostCapabilities,
    clients: ClientRegistry,
    controller: Option<ControllerEndpoint>,
}

impl ClientBroadcastRelay {
    pub fn new(config: RelayConfig, host: HostCapabilities) -> Self {
        Self {
            config,
            host,
            clients: ClientRegistry::new(),
            controller: None,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Controller endpoint, once `init` has resolved it
    pub fn controller(&self) -> Option<&ControllerEndpoint> {
        self.controller.as_ref()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn is_connected(&self, id: &ClientId) -> bool {
        self.clients.contains(id)
    }

    /// Currently connected clients, in no particular order
    pub fn clients(&self) -> Vec<ClientId> {
        self.clients.iter().cloned().collect()
    }

    /// Resolve the controller endpoint and announce readiness.
    pub fn init(&mut self) -> Result<()> {
        let key = &self.config.controller_key;
        let targets = self
            .host
            .config
            .read(key)?
            .ok_or_else(|| RelayError::Config(format!("'{}' is not configured", key)))?;

        let first = targets
            .first()
            .ok_or_else(|| RelayError::Config(format!("'{}' has no targets", key)))?;

        let endpoint: ControllerEndpoint = first.parse()?;
        info!("Controller endpoint: {}", endpoint);

        self.host
            .sender
            .send(&endpoint.host, endpoint.port, SERVER_READY_ADDRESS, &[])?;
        self.controller = Some(endpoint);
        Ok(())
    }

    pub fn connect(&mut self, id: ClientId) {
        if self.clients.insert(id.clone()) {
            info!("Client connected: {} ({} total)", id, self.clients.len());
        } else {
            debug!("Client {} already connected", id);
        }
        self.notify_count();
    }

    pub fn disconnect(&mut self, id: &ClientId) {
        if self.clients.remove(id) {
            info!("Client disconnected: {} ({} total)", id, self.clients.len());
        } else {
            debug!("Disconnect for unknown client {}", id);
        }
        self.notify_count();
    }

    /// Re-deliver `message` to every connected client except its origin,
    /// then hand it back unchanged.
    pub fn filter_outbound(&self, message: OutboundMessage) -> OutboundMessage {
        for id in self.clients.others(&message.client_id) {
            debug!("Relaying {} from {} to {}", message.address, message.client_id, id);

            let context = RoutingContext::for_client(id.clone());
            if let Err(e) = self.host.receiver.receive(
                &message.host,
                message.port,
                &message.address,
                &message.args,
                &context,
            ) {
                warn!("Failed to relay {} to {}: {}", message.address, id, e);
            }
        }

        message
    }

    fn notify_count(&self) {
        if !self.config.notify_controller {
            return;
        }

        let Some(endpoint) = &self.controller else {
            debug!("Controller not resolved yet, skipping client count");
            return;
        };

        let count = i32::try_from(self.clients.len()).unwrap_or(i32::MAX);
        if let Err(e) = self.host.sender.send(
            &endpoint.host,
            endpoint.port,
            GUI_CLIENTS_ADDRESS,
            &[OscType::Int(count)],
        ) {
            warn!("Failed to notify controller {}: {}", endpoint, e);
        }
    }
}

impl CustomModule for ClientBroadcastRelay {
    fn init(&mut self) -> Result<()> {
        ClientBroadcastRelay::init(self)
    }

    fn on_connect(&mut self, client: ClientId) {
        self.connect(client);
    }

    fn on_disconnect(&mut self, client: &ClientId) {
        self.disconnect(client);
    }

    fn filter_outbound(&mut self, message: OutboundMessage) -> OutboundMessage {
        ClientBroadcastRelay::filter_outbound(self, message)
    }
}

impl std::fmt::Debug for ClientBroadcastRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBroadcastRelay")
            .field("config", &self.config)
            .field("clients", &self.clients.len())
            .field("controller", &self.controller)
            .finish()
    }
}

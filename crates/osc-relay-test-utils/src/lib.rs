//! Common test helpers for osc-relay tests
//!
//! This crate provides:
//! - A recording host double implementing every host capability
//! - Failure injection for send/receive
//! - Relay and message fixtures

use osc_relay::{
    ClientBroadcastRelay, ClientId, ConfigReader, HostAction, HostCapabilities, OscReceiver,
    OscSender, OscType, OutboundMessage, RelayConfig, RelayError, Result, RoutingContext,
    Settings,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

/// Default controller target used by fixtures
pub const CONTROLLER: &str = "127.0.0.1:5555";

/// Host address carried by fixture messages
pub const GUI_HOST: &str = "127.0.0.1";

/// Host port carried by fixture messages
pub const GUI_PORT: u16 = 8080;

// ============================================================================
// Logging
// ============================================================================

static TRACING: Once = Once::new();

/// Install a test subscriber once per process. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Recording Host
// ============================================================================

/// Host double that records every action in call order
#[derive(Default)]
pub struct RecordingHost {
    settings: Settings,
    actions: Mutex<Vec<HostAction>>,
    fail_send: AtomicBool,
    fail_receive: AtomicBool,
}

impl RecordingHost {
    pub fn new(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            settings,
            ..Default::default()
        })
    }

    /// Host whose `send` setting points at [`CONTROLLER`]
    pub fn with_controller() -> Arc<Self> {
        Self::new(Settings::with_send([CONTROLLER]))
    }

    pub fn capabilities(self: &Arc<Self>) -> HostCapabilities {
        HostCapabilities::from_host(Arc::clone(self))
    }

    pub fn actions(&self) -> Vec<HostAction> {
        self.actions.lock().clone()
    }

    pub fn clear(&self) {
        self.actions.lock().clear();
    }

    /// `(address, args)` of every `send` call
    pub fn sent(&self) -> Vec<(String, Vec<OscType>)> {
        self.actions
            .lock()
            .iter()
            .filter_map(|action| match action {
                HostAction::Send { address, args, .. } => Some((address.clone(), args.clone())),
                _ => None,
            })
            .collect()
    }

    /// Integer payloads of every `/gui-clients` notification
    pub fn client_counts(&self) -> Vec<i32> {
        self.sent()
            .into_iter()
            .filter(|(address, _)| address == osc_relay::GUI_CLIENTS_ADDRESS)
            .filter_map(|(_, args)| match args.first() {
                Some(OscType::Int(n)) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Every `receive` call as `(recipient, address, args)`
    pub fn relayed(&self) -> Vec<(ClientId, String, Vec<OscType>)> {
        self.actions
            .lock()
            .iter()
            .filter_map(|action| match action {
                HostAction::Receive {
                    address,
                    args,
                    context,
                    ..
                } => Some((context.client_id.clone(), address.clone(), args.clone())),
                _ => None,
            })
            .collect()
    }

    /// Recipients of every `receive` call, sorted
    pub fn relayed_to(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .relayed()
            .into_iter()
            .map(|(id, _, _)| id.to_string())
            .collect();
        ids.sort();
        ids
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn fail_receives(&self, fail: bool) {
        self.fail_receive.store(fail, Ordering::SeqCst);
    }
}

impl OscSender for RecordingHost {
    fn send(&self, host: &str, port: u16, address: &str, args: &[OscType]) -> Result<()> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(RelayError::Host("send refused".to_string()));
        }
        self.actions.lock().push(HostAction::Send {
            host: host.to_string(),
            port,
            address: address.to_string(),
            args: args.to_vec(),
        });
        Ok(())
    }
}

impl OscReceiver for RecordingHost {
    fn receive(
        &self,
        host: &str,
        port: u16,
        address: &str,
        args: &[OscType],
        context: &RoutingContext,
    ) -> Result<()> {
        if self.fail_receive.load(Ordering::SeqCst) {
            return Err(RelayError::Host("receive refused".to_string()));
        }
        self.actions.lock().push(HostAction::Receive {
            host: host.to_string(),
            port,
            address: address.to_string(),
            args: args.to_vec(),
            context: context.clone(),
        });
        Ok(())
    }
}

impl ConfigReader for RecordingHost {
    fn read(&self, key: &str) -> Result<Option<Vec<String>>> {
        self.settings.read(key)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// An initialized relay wired to a fresh recording host. The readiness
/// announcement is cleared from the recording.
pub fn ready_relay(config: RelayConfig) -> (ClientBroadcastRelay, Arc<RecordingHost>) {
    let host = RecordingHost::with_controller();
    let mut relay = ClientBroadcastRelay::new(config, host.capabilities());
    relay
        .init()
        .expect("relay init failed with fixture settings");
    host.clear();
    (relay, host)
}

/// An outbound message produced for `client`
pub fn message_from(
    client: impl Into<ClientId>,
    address: &str,
    args: Vec<OscType>,
) -> OutboundMessage {
    OutboundMessage::new(address, args, GUI_HOST, GUI_PORT, client)
}

//! OSC Relay
//!
//! A custom module for OSC GUI servers that keeps every connected client
//! in sync by rebroadcasting outbound messages:
//! - Tracks connected clients by host-assigned id
//! - Re-injects each outbound message once per *other* client
//! - Announces readiness to an external controller
//! - Optionally reports the client count to that controller
//!
//! The module reaches the outside world only through the capabilities in
//! [`host`], and is driven through the [`CustomModule`] hooks.
//!
//! # Example
//!
//! ```no_run
//! use osc_relay::{ClientBroadcastRelay, HostCapabilities, RelayConfig};
//!
//! fn load(host: HostCapabilities) -> osc_relay::Result<ClientBroadcastRelay> {
//!     let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host);
//!     relay.init()?;
//!     Ok(relay)
//! }
//! ```

pub mod endpoint;
pub mod error;
pub mod host;
pub mod message;
pub mod module;
pub mod registry;
pub mod relay;
pub mod runtime;
pub mod settings;

pub use endpoint::ControllerEndpoint;
pub use error::{RelayError, Result};
pub use host::{ConfigReader, HostCapabilities, OscReceiver, OscSender};
pub use message::{ClientId, OutboundMessage, RoutingContext};
pub use module::CustomModule;
pub use registry::ClientRegistry;
pub use relay::{ClientBroadcastRelay, RelayConfig, GUI_CLIENTS_ADDRESS, SERVER_READY_ADDRESS};
pub use runtime::{ChannelHost, HostAction, HostCall, HostHandle, ModuleRunner};
pub use settings::{Settings, SEND_KEY};

/// Re-exported so hosts can build argument lists without a direct dependency
pub use rosc::OscType;

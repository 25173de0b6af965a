//! Capabilities the host runtime provides to a module
//!
//! A module never talks to sockets or configuration files itself. The host
//! hands it three capabilities at construction:
//!
//! - [`OscSender`] fires a message at a fixed `host:port` endpoint
//! - [`OscReceiver`] re-injects a message as if it had been received from
//!   `host:port`, tagged with a [`RoutingContext`]
//! - [`ConfigReader`] looks up a configuration key

use rosc::OscType;
use std::sync::Arc;

use crate::error::Result;
use crate::message::RoutingContext;

/// Fire a message to a fixed endpoint
pub trait OscSender: Send + Sync {
    fn send(&self, host: &str, port: u16, address: &str, args: &[OscType]) -> Result<()>;
}

/// Re-inject a message into the host as if received from `host:port`
pub trait OscReceiver: Send + Sync {
    fn receive(
        &self,
        host: &str,
        port: u16,
        address: &str,
        args: &[OscType],
        context: &RoutingContext,
    ) -> Result<()>;
}

/// Configuration lookup
pub trait ConfigReader: Send + Sync {
    /// Read a key as a list of strings. `Ok(None)` if the key is not set;
    /// an error if it is set to something unreadable.
    fn read(&self, key: &str) -> Result<Option<Vec<String>>>;
}

/// The capability set handed to a module
#[derive(Clone)]
pub struct HostCapabilities {
    pub sender: Arc<dyn OscSender>,
    pub receiver: Arc<dyn OscReceiver>,
    pub config: Arc<dyn ConfigReader>,
}

impl HostCapabilities {
    pub fn new(
        sender: Arc<dyn OscSender>,
        receiver: Arc<dyn OscReceiver>,
        config: Arc<dyn ConfigReader>,
    ) -> Self {
        Self {
            sender,
            receiver,
            config,
        }
    }

    /// Build from a single value implementing every capability
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: OscSender + OscReceiver + ConfigReader + 'static,
    {
        Self {
            sender: host.clone(),
            receiver: host.clone(),
            config: host,
        }
    }
}

impl std::fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCapabilities").finish_non_exhaustive()
    }
}

//! Client identifiers and the messages passed through the outbound filter

use rosc::OscType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque client identifier assigned by the host.
///
/// The host keys its client table by string, so numeric ids are stored in
/// their decimal form and compare equal to the matching string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for ClientId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A message leaving the host toward one client.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// OSC address pattern
    pub address: String,
    /// Typed OSC arguments
    pub args: Vec<OscType>,
    /// Destination host
    pub host: String,
    /// Destination port
    pub port: u16,
    /// Client the message originated from
    pub client_id: ClientId,
}

impl OutboundMessage {
    pub fn new(
        address: impl Into<String>,
        args: Vec<OscType>,
        host: impl Into<String>,
        port: u16,
        client_id: impl Into<ClientId>,
    ) -> Self {
        Self {
            address: address.into(),
            args,
            host: host.into(),
            port,
            client_id: client_id.into(),
        }
    }
}

/// Context attached to a re-injected message so the host can route it
/// back to one specific client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingContext {
    #[serde(rename = "clientId")]
    pub client_id: ClientId,
}

impl RoutingContext {
    pub fn for_client(client_id: ClientId) -> Self {
        Self { client_id }
    }
}

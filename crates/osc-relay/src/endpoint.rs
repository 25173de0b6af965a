//! Controller endpoint parsing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;

/// Address of the external controller that receives readiness and
/// client-count notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerEndpoint {
    pub host: String,
    pub port: u16,
}

impl ControllerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for ControllerEndpoint {
    type Err = RelayError;

    /// Parse a `host:port` target. The port is taken after the last colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RelayError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = s.trim().rsplit_once(':').ok_or_else(|| invalid("expected host:port"))?;

        if host.is_empty() {
            return Err(invalid("empty host"));
        }

        let port: u16 = port
            .parse()
            .map_err(|e| invalid(&format!("bad port: {}", e)))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ControllerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

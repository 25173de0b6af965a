//! Harness input lines

use anyhow::{anyhow, bail, Result};
use osc_relay::{ClientId, OscType};

/// One line of harness input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(ClientId),
    Close(ClientId),
    Out {
        client: ClientId,
        address: String,
        args: Vec<OscType>,
    },
}

impl Command {
    /// Parse `open ID`, `close ID` or `out ID ADDRESS [ARG...]`.
    /// Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default();
        let client = parts
            .next()
            .map(ClientId::from)
            .ok_or_else(|| anyhow!("'{}' needs a client id", verb))?;

        let command = match verb {
            "open" => Command::Open(client),
            "close" => Command::Close(client),
            "out" => {
                let address = parts
                    .next()
                    .ok_or_else(|| anyhow!("'out' needs an address"))?;
                if !address.starts_with('/') {
                    bail!("OSC address must start with '/': {}", address);
                }
                Command::Out {
                    client,
                    address: address.to_string(),
                    args: parts.map(parse_arg).collect(),
                }
            }
            other => bail!("unknown command: {}", other),
        };

        Ok(Some(command))
    }
}

/// Integers, then floats, otherwise strings
fn parse_arg(raw: &str) -> OscType {
    if let Ok(i) = raw.parse::<i32>() {
        OscType::Int(i)
    } else if let Ok(f) = raw.parse::<f32>() {
        OscType::Float(f)
    } else {
        OscType::String(raw.to_string())
    }
}

//! Host plugin contract

use crate::error::Result;
use crate::message::{ClientId, OutboundMessage};

/// Hooks a host runtime invokes on a custom module.
///
/// The host calls these serially from its own event loop, so
/// implementations take `&mut self` and need no internal locking.
pub trait CustomModule {
    /// Called once when the host loads the module
    fn init(&mut self) -> Result<()>;

    /// A client connection opened
    fn on_connect(&mut self, client: ClientId);

    /// A client connection closed
    fn on_disconnect(&mut self, client: &ClientId);

    /// Inspect a message leaving the host toward one client. The returned
    /// message continues along the host's normal delivery path.
    fn filter_outbound(&mut self, message: OutboundMessage) -> OutboundMessage;
}

//! Connected client registry

use std::collections::HashSet;

use crate::message::ClientId;

/// Set of currently connected clients.
///
/// An id is present exactly while its connection is open. Iteration order
/// is unspecified.
#[derive(Debug, Default, Clone)]
pub struct ClientRegistry {
    clients: HashSet<ClientId>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client. Returns false if it was already present.
    pub fn insert(&mut self, id: ClientId) -> bool {
        self.clients.insert(id)
    }

    /// Unregister a client. Returns false if it was not present.
    pub fn remove(&mut self, id: &ClientId) -> bool {
        self.clients.remove(id)
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientId> {
        self.clients.iter()
    }

    /// Every registered client except `sender`
    pub fn others<'a>(&'a self, sender: &'a ClientId) -> impl Iterator<Item = &'a ClientId> + 'a {
        self.clients.iter().filter(move |id| *id != sender)
    }
}

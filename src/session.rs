//! Per-connection handshake state.
//!
//! A Teltonika terminal identifies itself exactly once per TCP connection by
//! sending an IMEI-only handshake frame; every later data frame on that
//! connection carries no identity of its own. The registry records which IMEI
//! a connection handshook with so the pre-parser can attribute telemetry.

use std::collections::HashMap;

/// Connection-to-IMEI association store.
///
/// The registry is owned by the hosting transport layer and passed into
/// [`preparse`](crate::frame::preparse) per call; the protocol core holds no
/// hidden process-wide state. It performs no internal synchronization: a host
/// that dispatches frames for different connections concurrently must wrap it
/// (e.g. in a mutex) or shard it per connection. The host is also responsible
/// for calling [`evict`](ImeiRegistry::evict) when a socket closes; nothing in
/// the protocol core removes entries.
#[derive(Debug, Clone, Default)]
pub struct ImeiRegistry {
    map: HashMap<String, String>,
}

impl ImeiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `imei` with `connection_id`, replacing any previous entry.
    pub fn register(&mut self, connection_id: &str, imei: &str) {
        self.map
            .insert(connection_id.to_owned(), imei.to_owned());
    }

    /// IMEI the connection handshook with, if any.
    pub fn imei_for(&self, connection_id: &str) -> Option<&str> {
        self.map.get(connection_id).map(String::as_str)
    }

    /// Whether the connection has completed its handshake.
    pub fn is_ready(&self, connection_id: &str) -> bool {
        self.map.contains_key(connection_id)
    }

    /// Remove a connection's entry, returning the IMEI it was bound to.
    ///
    /// Hosts call this when the underlying socket closes.
    pub fn evict(&mut self, connection_id: &str) -> Option<String> {
        self.map.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_lookup_evict() {
        let mut registry = ImeiRegistry::new();
        assert!(!registry.is_ready("conn1"));

        registry.register("conn1", "352093081452251");
        assert!(registry.is_ready("conn1"));
        assert_eq!(registry.imei_for("conn1"), Some("352093081452251"));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.evict("conn1").as_deref(), Some("352093081452251"));
        assert!(registry.is_empty());
        assert_eq!(registry.evict("conn1"), None);
    }

    #[test]
    fn re_register_overwrites() {
        let mut registry = ImeiRegistry::new();
        registry.register("conn1", "111111111111111");
        registry.register("conn1", "222222222222222");
        assert_eq!(registry.imei_for("conn1"), Some("222222222222222"));
        assert_eq!(registry.len(), 1);
    }
}

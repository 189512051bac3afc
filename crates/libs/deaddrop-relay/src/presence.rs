use deaddrop_core::{ChannelId, IdentityRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Tracks which identities currently have a live channel.
///
/// At most one binding per identity: registering a channel for an identity
/// that already has one silently replaces the old binding, so the last
/// transport to report reachability wins. Bindings live only in process
/// memory and vanish on restart.
///
/// Handles are cheap clones sharing one map, meant to be passed to whatever
/// owns the transport wiring alongside the coordinator.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    bindings: Arc<Mutex<HashMap<IdentityRef, ChannelId>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, identity: IdentityRef, channel: ChannelId) {
        if let Ok(mut guard) = self.bindings.lock() {
            guard.insert(identity, channel);
        }
    }

    pub fn unregister(&self, identity: IdentityRef) {
        if let Ok(mut guard) = self.bindings.lock() {
            guard.remove(&identity);
        }
    }

    pub fn lookup(&self, identity: IdentityRef) -> Option<ChannelId> {
        self.bindings.lock().ok().and_then(|guard| guard.get(&identity).cloned())
    }

    pub fn is_reachable(&self, identity: IdentityRef) -> bool {
        self.lookup(identity).is_some()
    }

    /// Drop every binding. Used at service shutdown so no identity reads as
    /// reachable while the transport winds down.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.bindings.lock() {
            guard.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_lookup() {
        let registry = PresenceRegistry::new();
        registry.register(IdentityRef(1), ChannelId::from("chan-a"));
        assert_eq!(registry.lookup(IdentityRef(1)), Some(ChannelId::from("chan-a")));
        assert!(registry.is_reachable(IdentityRef(1)));
        assert!(!registry.is_reachable(IdentityRef(2)));
    }

    #[test]
    fn reregister_replaces_binding() {
        let registry = PresenceRegistry::new();
        registry.register(IdentityRef(1), ChannelId::from("chan-a"));
        registry.register(IdentityRef(1), ChannelId::from("chan-b"));
        assert_eq!(registry.lookup(IdentityRef(1)), Some(ChannelId::from("chan-b")));
    }

    #[test]
    fn unregister_absent_is_noop() {
        let registry = PresenceRegistry::new();
        registry.unregister(IdentityRef(7));
        assert!(!registry.is_reachable(IdentityRef(7)));
    }

    #[test]
    fn clones_share_bindings() {
        let registry = PresenceRegistry::new();
        let handle = registry.clone();
        handle.register(IdentityRef(3), ChannelId::from("chan-c"));
        assert!(registry.is_reachable(IdentityRef(3)));
    }

    #[test]
    fn clear_drops_everything() {
        let registry = PresenceRegistry::new();
        registry.register(IdentityRef(1), ChannelId::from("chan-a"));
        registry.register(IdentityRef(2), ChannelId::from("chan-b"));
        registry.clear();
        assert!(!registry.is_reachable(IdentityRef(1)));
        assert!(!registry.is_reachable(IdentityRef(2)));
    }
}

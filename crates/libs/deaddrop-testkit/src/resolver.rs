use async_trait::async_trait;
use deaddrop_core::IdentityRef;
use deaddrop_relay::IdentityResolver;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Resolver backed by a fixed identity table.
///
/// Identities can be removed mid-test to exercise rendering of messages
/// whose sender has since disappeared.
#[derive(Debug, Default)]
pub struct StaticResolver {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    known: HashSet<IdentityRef>,
    names: HashMap<IdentityRef, String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(self, identity: IdentityRef, name: &str) -> Self {
        self.add(identity, name);
        self
    }

    /// Known identity with no display name, for the unknown-sender fallback.
    pub fn with_unnamed_identity(self, identity: IdentityRef) -> Self {
        self.add_unnamed(identity);
        self
    }

    pub fn add(&self, identity: IdentityRef, name: &str) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.known.insert(identity);
            guard.names.insert(identity, name.to_string());
        }
    }

    pub fn add_unnamed(&self, identity: IdentityRef) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.known.insert(identity);
        }
    }

    pub fn remove(&self, identity: IdentityRef) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.known.remove(&identity);
            guard.names.remove(&identity);
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn exists(&self, identity: IdentityRef) -> bool {
        self.inner.lock().map(|guard| guard.known.contains(&identity)).unwrap_or(false)
    }

    async fn display_name(&self, identity: IdentityRef) -> Option<String> {
        self.inner.lock().ok().and_then(|guard| guard.names.get(&identity).cloned())
    }
}

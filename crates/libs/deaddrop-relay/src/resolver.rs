use async_trait::async_trait;
use deaddrop_core::IdentityRef;

/// Read-only view of the external identity service.
///
/// The relay never creates or mutates identities; it only confirms that one
/// exists before staging and fetches a display name when rendering an
/// envelope. Implementations map any backend failure to "absent" rather
/// than surfacing their own error type.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Whether the identity is currently known to the identity service.
    async fn exists(&self, identity: IdentityRef) -> bool;

    /// Display name for rendering, if the identity is still known.
    async fn display_name(&self, identity: IdentityRef) -> Option<String>;
}

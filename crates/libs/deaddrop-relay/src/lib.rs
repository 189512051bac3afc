//! Store-and-forward delivery core for the deaddrop relay.
//!
//! A sender addresses a message to an identity. If the identity currently
//! has a live channel the message is pushed and immediately purged from
//! storage; otherwise it stays staged until the identity reconnects and
//! claims it, or the retention deadline passes. Nothing is ever stored once
//! delivered, and deletion happens only after the transport confirms the
//! push.
//!
//! The moving parts:
//!
//! - [`PresenceRegistry`]: which identities are reachable, and over which
//!   channel. One binding per identity, last writer wins.
//! - [`MessageStore`]: the staging area, with [`SqliteStore`] for durable
//!   deployments and [`MemoryStore`] for tests and ephemeral ones.
//! - [`DeliveryCoordinator`]: the submit/drain protocol tying the two
//!   together through the [`IdentityResolver`] and [`Transport`] seams.
//! - [`ExpirySweeper`]: the recurring purge of staged messages past their
//!   retention deadline.
//!
//! Reachability changes arrive as [`PresenceEvent`] values, normally pumped
//! from the session transport by [`spawn_presence_worker`].

pub mod clock;
pub mod config;
pub mod delivery;
pub mod events;
pub mod presence;
pub mod resolver;
pub mod store;
pub mod sweep;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use config::RelayConfig;
pub use delivery::{DeliveryCoordinator, DrainOutcome, Outcome, RelayError};
pub use events::{spawn_presence_worker, PresenceEvent};
pub use presence::PresenceRegistry;
pub use resolver::IdentityResolver;
pub use store::{MemoryStore, MessageStore, SqliteStore, StoreError};
pub use sweep::ExpirySweeper;
pub use transport::{PushError, Transport};

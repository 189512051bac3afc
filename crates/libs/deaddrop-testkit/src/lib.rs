//! Scripted fakes for the deaddrop relay's collaborator seams.
//!
//! Integration tests build a [`DeliveryCoordinator`] against these instead
//! of a real identity service, session transport, or wall clock:
//! [`StaticResolver`] answers from a fixed (but mutable) identity table,
//! [`ScriptedTransport`] records every push and plays back a per-push
//! behavior, and [`ManualClock`] only moves when the test advances it.
//!
//! [`DeliveryCoordinator`]: deaddrop_relay::DeliveryCoordinator

pub mod clock;
pub mod resolver;
pub mod transport;

pub use clock::ManualClock;
pub use resolver::StaticResolver;
pub use transport::{PushBehavior, ScriptedTransport};

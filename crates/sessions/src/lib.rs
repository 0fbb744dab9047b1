//! Session state contract and persistence for the Cadena orchestrator.
//!
//! One serialized session per `(tenant, user)` pair lives in a TTL'd
//! key–value store.  This crate defines the state shape (flat layout with
//! explicit slices plus an `extras` escape hatch), the builder that creates
//! and hydrates sessions, the minimal structural validator, key derivation,
//! and the [`KvStore`] contract with its in-memory adapter.

mod builder;
mod keys;
mod state;
mod store;
mod validator;

pub use builder::StateBuilder;
pub use keys::{idempotency_key, orchestrated_key, session_key};
pub use state::{Cart, DialogueEntry, OrderSlice, SessionState, SupportSlice};
pub use store::{KvStore, MemoryStore};
pub use validator::StateValidator;

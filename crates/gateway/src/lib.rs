//! Cadena gateway — the turn orchestration engine.
//!
//! Ties the session store, intent router, and lane agents into the
//! deterministic per-message loop: load → validate → append user turn →
//! route → invoke agent → apply patch → optional baton hops → persist →
//! mark processed.

pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;

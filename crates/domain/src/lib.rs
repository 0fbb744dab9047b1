//! Shared domain types for the Cadena turn orchestrator.
//!
//! This crate holds the vocabulary every other crate speaks: the error
//! taxonomy, configuration model, lane identifiers, the normalized [`Turn`],
//! the raw inbound provider message, and the outbound message envelope.

pub mod config;
pub mod error;
pub mod inbound;
pub mod lane;
pub mod message;
pub mod turn;

pub use error::{Error, Result};
pub use inbound::{Direction, InboundMessage, MessageKind};
pub use lane::{Lane, LaneSet};
pub use message::OutboundMessage;
pub use turn::Turn;

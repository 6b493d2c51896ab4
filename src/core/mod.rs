//! Core types for session reconstruction.
//!
//! `schema` holds the on-disk record shapes as they appear in the event log;
//! `message` holds the reassembled model the renderers consume.

pub mod message;
pub mod schema;

// Re-export key types for convenience
pub use message::{Invocation, LogicalMessage, Role, Segment, Usage};
pub use schema::{ContentBlock, MessageBody, RawContent, RawEvent, ResultContent, TurnRecord};

//! Core type definitions
//!
//! The quarantine record as seen by callers, the on-disk attribute value it
//! is persisted through, and the events database row that carries the rest.

mod attribute;
mod event;
mod record;

pub use attribute::*;
pub use event::*;
pub use record::*;

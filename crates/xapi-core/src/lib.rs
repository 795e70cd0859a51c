//! Core statement layer for the xAPI record tools.
//!
//! Wraps one xAPI record as stored by a Learning Record Store and exposes
//! typed accessors over it: actor, verb and object with their localized
//! display strings, storage timestamps, and the envelope's identifiers,
//! flags and forwarding queues.

pub mod error;
pub mod statement;

//! Tabular analysis layer for xAPI statements.
//!
//! Responsible for building row/column frames of statement fields,
//! normalizing and filtering them, aggregating per-actor statistics, and
//! ingesting exported CSV tables or directories of stored statement
//! documents.

pub mod aggregate;
pub mod frame;
pub mod reader;
pub mod transform;

pub use xapi_core as core;

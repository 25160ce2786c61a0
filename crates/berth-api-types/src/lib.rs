//! Shared request and response bodies for the Berth API.
//!
//! The dashboard speaks camelCase JSON; list and inspect payloads are the
//! Docker Engine models and are not mirrored here.

pub mod types;

pub use types::*;

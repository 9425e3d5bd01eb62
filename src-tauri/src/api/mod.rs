//! Records shared with the frontend.
//!
//! Plugin and entry shapes, event payloads and the error type returned
//! by every command live here.

pub mod types;

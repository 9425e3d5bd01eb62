//! Runtime state shared by the search bar and the settings window.
//!
//! The runtime domain handles the live, in-memory side of plugins:
//! the entries they answered and the index runs they are executing.

pub mod entries;
pub mod indexing;

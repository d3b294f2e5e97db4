//! Client-side model of the tvheadend administrative console.
//!
//! Everything here is free of terminal concerns.  The stateful pieces
//! (`filter`, `query`, `browser`) are plain state machines: they hand out
//! fetch requests and accept completions, and the caller decides how and
//! when the network round trip happens.

pub mod autorec;
pub mod browser;
pub mod catalog;
pub mod client;
pub mod config;
pub mod detail;
pub mod filter;
pub mod idnode;
pub mod model;
pub mod platform;
pub mod query;

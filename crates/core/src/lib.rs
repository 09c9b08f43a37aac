//! Domain primitives shared by the career guidance backend and dashboards.
//!
//! Nothing in this crate performs I/O. Handlers, repositories and the
//! dashboard client build on these types and pure functions.

pub mod error;
pub mod grading;
pub mod matching;
pub mod reconnect;
pub mod roles;
pub mod search;
pub mod status;
pub mod time_ago;
pub mod types;
pub mod validation;

//! Client side of the career guidance dashboards.
//!
//! - [`client`] -- typed REST client for the role-scoped API.
//! - [`views`] -- per-page state objects and their page-load sequences.
//! - [`render`] -- escaped HTML fragments for each view.
//! - [`stream`] / [`chat`] -- notification stream and chat socket clients,
//!   kept alive by [`session::supervise`].
//! - [`debounce`] -- quiet-period filter for search inputs.

pub mod chat;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod format;
pub mod models;
pub mod render;
pub mod session;
pub mod stream;
pub mod views;

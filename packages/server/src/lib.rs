//! Real-time message hub for Traveller game sessions.
//!
//! Clients join a session over WebSocket and exchange broadcast and private
//! messages routed by a single Hub loop.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

//! Interactive command-line client for the Traveller session hub.

pub mod command;
pub mod error;
pub mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
pub use session::session_url;

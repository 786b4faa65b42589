//! Utilities shared by the Traveller hub server and its CLI client.

pub mod logger;
pub mod time;

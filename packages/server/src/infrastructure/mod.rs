//! Infrastructure layer: wire codec, the Hub actor, connection actors and
//! identity resolution.

pub mod connection;
pub mod dto;
pub mod hub;
pub mod identity;

//! The Hub: a single serialized router that owns the client registry.
//!
//! ## Responsibilities
//!
//! - Register and unregister connection actors
//! - Route broadcasts to every client of a session
//! - Route private messages to one `(user, session)` client
//! - Evict clients whose outbound buffer is full
//!
//! Every mutation goes through one command channel consumed by [`Hub::run`],
//! so the registry needs no lock. Dropping a client's [`ClientHandle`] closes
//! its outbound buffer, which is how the Hub tells an actor to stop.

mod handle;
mod router;

pub use handle::{ClientHandle, ClientSummary, HubCommand, HubError, HubHandle};
pub use router::Hub;

/// Capacity of each client's outbound buffer, in frames
pub const OUTBOUND_BUFFER_CAPACITY: usize = 256;

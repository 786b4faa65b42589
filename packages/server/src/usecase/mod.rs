//! Use cases invoked by the UI layer.

mod connect_client;
mod error;
mod inspect_hub;

pub use connect_client::ConnectClientUseCase;
pub use error::ConnectError;
pub use inspect_hub::InspectHubUseCase;

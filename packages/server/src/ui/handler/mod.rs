mod http;
mod websocket;

pub use http::{get_session_clients, health_check};
pub use websocket::websocket_handler;

//! Session hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin traveller-server
//! cargo run --bin traveller-server -- --host 0.0.0.0 --port 3000 --allow-query-identity
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use traveller_server::{
    config::{ConnectionSettings, ServerConfig},
    infrastructure::{hub::Hub, identity::TrustedIdentityProvider},
    ui::Server,
    usecase::{ConnectClientUseCase, InspectHubUseCase},
};
use traveller_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "traveller-server")]
#[command(about = "Real-time message hub for Traveller game sessions", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TRAVELLER_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TRAVELLER_PORT", default_value = "8080")]
    port: u16,

    /// Seconds to wait for the next frame (data or pong) before dropping a client
    #[arg(long, env = "TRAVELLER_PONG_WAIT_SECS", default_value = "60")]
    pong_wait_secs: u64,

    /// Seconds allowed for a single write to a client
    #[arg(long, env = "TRAVELLER_WRITE_WAIT_SECS", default_value = "10")]
    write_wait_secs: u64,

    /// Maximum inbound message size in bytes
    #[arg(long, env = "TRAVELLER_MAX_MESSAGE_SIZE", default_value = "512")]
    max_message_size: usize,

    /// Accept the `user_id` query parameter as identity (development only)
    #[arg(long, env = "TRAVELLER_ALLOW_QUERY_IDENTITY")]
    allow_query_identity: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let connection = match ConnectionSettings::new(
        Duration::from_secs(args.pong_wait_secs),
        Duration::from_secs(args.write_wait_secs),
        args.max_message_size,
    ) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        allow_query_identity: args.allow_query_identity,
        connection,
    };
    if config.allow_query_identity {
        tracing::warn!("Query parameter identity is enabled; do not use this in production");
    }

    // Initialize dependencies in order:
    // 1. Hub
    // 2. UseCases
    // 3. Server

    // 1. Create the Hub (started by the server)
    let (hub, hub_handle) = Hub::new();

    // 2. Create UseCases
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        hub_handle.clone(),
        Arc::new(TrustedIdentityProvider::new(config.allow_query_identity)),
        Arc::new(SystemClock),
        config.connection.clone(),
    ));
    let inspect_hub_usecase = Arc::new(InspectHubUseCase::new(hub_handle.clone()));

    // 3. Create and run the server
    let server = Server::new(
        config,
        hub,
        hub_handle,
        connect_client_usecase,
        inspect_hub_usecase,
    );
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

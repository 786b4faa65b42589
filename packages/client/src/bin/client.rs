//! Interactive client for the Traveller session hub.
//!
//! Lines typed at the prompt are broadcast to the session;
//! `/to <user> <message>` sends a private message.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin traveller-client -- --session S1 --user alice
//! cargo run --bin traveller-client -- -u ws://127.0.0.1:3000 -s S1 -n bob
//! ```
//!
//! The server must be started with `--allow-query-identity`.

use clap::Parser;

use traveller_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "traveller-client")]
#[command(about = "Interactive client for the Traveller session hub", long_about = None)]
struct Args {
    /// Session to join
    #[arg(short = 's', long, env = "TRAVELLER_SESSION")]
    session: String,

    /// User id to connect as
    #[arg(short = 'n', long, env = "TRAVELLER_USER")]
    user: String,

    /// Base WebSocket URL of the server
    #[arg(short = 'u', long, env = "TRAVELLER_URL", default_value = "ws://127.0.0.1:8080")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = traveller_client::run_client(args.url, args.session, args.user).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

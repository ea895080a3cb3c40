//! Terminal viewer for the live-stream event relay.
//!
//! Connects to the relay's WebSocket endpoint and prints history, status changes and
//! live events. Type `/connect <room>` to switch the relay to a room, `/disconnect` to
//! stop it, `/quit` to exit.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin liverelay-client
//! cargo run --bin liverelay-client -- --token alice:s3cret --room @foo
//! ```

use clap::Parser;

use liverelay_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "liverelay-client")]
#[command(about = "Terminal viewer for the live-stream event relay", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, env = "LIVERELAY_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Viewer token (`username:password`) checked by the relay before it accepts
    /// connect requests
    #[arg(short = 't', long, env = "LIVERELAY_TOKEN")]
    token: Option<String>,

    /// Room to request right after connecting
    #[arg(short = 'r', long)]
    room: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = liverelay_client::run_client(args.url, args.token, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

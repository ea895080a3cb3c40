//! Live-stream event relay server.
//!
//! Holds one upstream live-room subscription and fans its events out to every
//! connected websocket viewer.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin liverelay-server
//! cargo run --bin liverelay-server -- --port 3000 --upstream ws://127.0.0.1:9000/live
//! cargo run --bin liverelay-server -- --users-file users.json
//! ```

use std::sync::Arc;

use clap::Parser;

use liverelay_server::{
    config::{ServerArgs, UpstreamKind},
    domain::{Authorizer, LiveConnector},
    infrastructure::{
        auth::{AllowAllAuthorizer, JsonUserStore},
        live_source::{SimulatedLiveConnector, WebSocketLiveConnector},
        registry::ChannelSubscriberRegistry,
    },
    ui::Server,
    usecase::ConnectionSupervisor,
};
use liverelay_shared::logger::{install_panic_hook, setup_logger};

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");
    install_panic_hook();

    let args = ServerArgs::parse();
    if let Err(e) = args.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    // Initialize dependencies in order:
    // 1. Registry
    // 2. Authorizer
    // 3. LiveConnector
    // 4. ConnectionSupervisor
    // 5. Server

    // 1. Create the subscriber registry (in-memory replay buffer)
    let registry = Arc::new(ChannelSubscriberRegistry::new(args.history_capacity));

    // 2. Create the authorizer
    let authorizer: Arc<dyn Authorizer> = match &args.users_file {
        Some(path) => match JsonUserStore::load(path).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No users file configured, every viewer may control the relay");
            Arc::new(AllowAllAuthorizer)
        }
    };

    // 3. Create the upstream connector
    let connector: Arc<dyn LiveConnector> = match args.upstream() {
        Ok(UpstreamKind::Simulated) => {
            tracing::info!("Using the simulated upstream");
            Arc::new(SimulatedLiveConnector::new())
        }
        Ok(UpstreamKind::WebSocket(endpoint)) => {
            tracing::info!("Using upstream connector at {}", endpoint);
            Arc::new(WebSocketLiveConnector::new(endpoint))
        }
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 4. Create the supervisor
    let supervisor = Arc::new(ConnectionSupervisor::new(
        registry,
        authorizer,
        connector,
        args.session_settings(),
    ));

    // 5. Create and run the server
    let server = Server::new(supervisor, args.viewer_queue);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

//! ClusterTalk terminal chat client.
//!
//! Connects to a chat server, joins a room and exchanges messages typed at
//! the prompt. Use `/join <room>` to switch rooms; the previous room's
//! history is not kept. A dropped connection is not retried automatically.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin clustertalk-client -- --sender alice
//! cargo run --bin clustertalk-client -- -s bob -r tech -u ws://10.0.2.2:8080/ws
//! ```

use clap::Parser;

use clustertalk_client::{
    ClientConfig,
    cli::{ClientError, run_client},
    config::{DEFAULT_ROOM, DEFAULT_SERVER_URL},
    domain::RoomId,
};
use clustertalk_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "clustertalk-client")]
#[command(about = "Room-based WebSocket chat client", long_about = None)]
struct Args {
    /// Display name attached to outgoing messages
    #[arg(short = 's', long, default_value = "CliUser")]
    sender: String,

    /// Room to join on startup
    #[arg(short = 'r', long, default_value = DEFAULT_ROOM)]
    room: String,

    /// WebSocket server URL (the room is added as a query parameter)
    #[arg(short = 'u', long, default_value = DEFAULT_SERVER_URL)]
    url: String,
}

impl Args {
    fn into_parts(self) -> Result<(ClientConfig, RoomId), ClientError> {
        let config = ClientConfig::try_from_parts(&self.url, &self.sender)?;
        let room = RoomId::new(self.room)?;
        Ok((config, room))
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let (config, room) = match Args::parse().into_parts() {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run_client(config, room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

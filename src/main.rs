//! Courtside connection probe.
//!
//! Small diagnostic binary that wires the connection layer from the
//! local configuration, opens the realtime channel, and logs lifecycle
//! and chat events until interrupted.

use tracing_subscriber::{fmt, EnvFilter};

use courtside_client::{
    ClientConfig, ClientError, CourtsideClient, TOPIC_CONNECTED, TOPIC_DISCONNECTED,
    TOPIC_RECONNECT_EXHAUSTED,
};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    let env = std::env::var("COURTSIDE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match ClientConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Probe error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: ClientConfig) -> Result<(), ClientError> {
    tracing::info!("Starting courtside-probe v{}", env!("CARGO_PKG_VERSION"));

    let client = CourtsideClient::open(config).await?;

    let mut connected = client.realtime().subscribe(TOPIC_CONNECTED);
    let mut disconnected = client.realtime().subscribe(TOPIC_DISCONNECTED);
    let mut exhausted = client.realtime().subscribe(TOPIC_RECONNECT_EXHAUSTED);
    let mut chat = client.realtime().subscribe("chat_message");

    client.realtime().connect();

    loop {
        tokio::select! {
            Some(_) = connected.recv() => tracing::info!("Channel connected"),
            Some(_) = disconnected.recv() => tracing::info!("Channel dropped, reconnecting"),
            Some(_) = exhausted.recv() => {
                tracing::warn!("Reconnect attempts exhausted, stopping");
                break;
            }
            Some(event) = chat.recv() => {
                tracing::info!(data = %event.data, "Chat message");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, disconnecting");
                client.realtime().disconnect();
                break;
            }
        }
    }

    Ok(())
}

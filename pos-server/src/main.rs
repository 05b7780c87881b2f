use pos_server::{Config, Server, ServerState, init_logger, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    dotenv::dotenv().ok();
    init_logger();

    print_banner();
    tracing::info!("POS server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State (opens the embedded database)
    let state = ServerState::initialize(config)?;

    // 4. Serve until shutdown
    let server = Server::with_state(state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}

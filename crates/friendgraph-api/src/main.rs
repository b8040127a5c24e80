use anyhow::Context;
use friendgraph_api::Server;
use friendgraph_core::ConfigManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(ConfigManager::new().context("loading configuration")?);
    let settings = config.settings().clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "friendgraph_api={lvl},friendgraph_graph={lvl},friendgraph_core={lvl},tower_http=info",
                    lvl = settings.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid server address {}:{}",
                settings.server.host, settings.server.port
            )
        })?;

    let server = Server::new(addr, config).await?;
    server.run().await?;
    Ok(())
}

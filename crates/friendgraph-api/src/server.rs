use crate::{create_router, AppState};
use friendgraph_core::{ConfigManager, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

pub struct Server {
    state: AppState,
    addr: SocketAddr,
    allowed_origins: Vec<String>,
}

impl Server {
    pub async fn new(addr: SocketAddr, config: Arc<ConfigManager>) -> Result<Self> {
        let allowed_origins = config.settings().security.allowed_origins.clone();
        let state = AppState::new(config).await?;
        Ok(Self {
            state,
            addr,
            allowed_origins,
        })
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state, &self.allowed_origins);

        info!("Starting FriendGraph API server on {}", self.addr);

        let listener = {
            let socket = if self.addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }?;

            // Reuse addr to improve rebind under restarts
            if let Err(e) = socket.set_reuseaddr(true) {
                warn!("failed to set SO_REUSEADDR on {}: {}", self.addr, e);
            }
            if let Err(e) = socket.set_keepalive(true) {
                warn!("failed to set SO_KEEPALIVE on {}: {}", self.addr, e);
            }

            socket.bind(self.addr)?;
            socket.listen(1024)?
        };

        info!("Server listening on http://{}", self.addr);
        info!("API documentation:");
        info!("  GET   /users/:id - Get user profile");
        info!("  GET   /users/:id/friends - List friends");
        info!("  GET   /users/search?q=<text> - Search users");
        info!("  PATCH /users/:id/:friendId - Add or remove a friend");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }

    // Give in-flight requests a moment before the runtime tears down.
    tokio::time::sleep(Duration::from_millis(100)).await;
}

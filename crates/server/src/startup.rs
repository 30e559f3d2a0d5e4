use std::net::SocketAddr;

use configs::{AppConfig, ServerConfig};
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(s: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", s.host, s.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {}", s.host, s.port, e)))
}

/// Connect the configured store, applying migrations for PostgreSQL.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    if !cfg.server.uses_database() {
        warn!("STORE=memory: records live in process memory only");
        return Ok(ServerState::in_memory(cfg));
    }
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(format!("migrations failed: {}", e)))?;
    info!("migrations applied");
    Ok(ServerState::with_database(db, cfg))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;

    if let Some((email, password)) = cfg.auth.admin_credentials() {
        state.auth.ensure_admin(email, password).await?;
    }

    let app = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, store = %cfg.server.store, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_rejects_garbage_host() {
        let s = ServerConfig { host: "not a host".into(), ..Default::default() };
        assert!(matches!(bind_addr(&s), Err(StartupError::InvalidConfig(_))));
        let ok = ServerConfig { host: "0.0.0.0".into(), port: 9000, ..Default::default() };
        assert_eq!(bind_addr(&ok).unwrap().port(), 9000);
    }

    #[tokio::test]
    async fn memory_store_needs_no_database() {
        let mut cfg = AppConfig::default();
        cfg.server.store = "memory".into();
        let state = build_state(&cfg).await.unwrap();
        let page = state.providers.list(&[]).await.unwrap();
        assert_eq!(page.pagination.total, 0);
    }
}

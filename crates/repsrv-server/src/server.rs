use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use repsrv_store::{ObjectStore, WellKnownIris};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::actor;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;
use crate::tls;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub struct ReportServer {
    config: ServerConfig,
    state: AppState,
}

impl ReportServer {
    /// Validate `config`, build the actor profile, and seed a fresh store.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let origin = config.origin()?;
        let iris = WellKnownIris::new(&origin);
        let profile = actor::profile(&iris, &origin, &config.actor_name);
        let store = Arc::new(ObjectStore::new(&origin, &config.new_path, profile));
        Ok(Self {
            state: AppState::new(store),
            config,
        })
    }

    pub fn with_state(mut self, state: AppState) -> Self {
        self.state = state;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve until ctrl-c, over TLS when a certificate is configured.
    pub async fn serve(self) -> ServerResult<()> {
        let addr = self.config.bind_addr;
        let actor = self.state.store.well_known().actor().clone();
        let app = self.router();

        if let Some(cert) = &self.config.tls {
            let rustls = tls::load(cert).await?;
            let handle = Handle::new();
            tokio::spawn(shutdown_on_signal(handle.clone()));
            info!(%addr, %actor, "report server listening (tls)");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
            return Ok(());
        }

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, %actor, "report server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_on_signal(handle: Handle) {
    shutdown_signal().await;
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = ReportServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(
            server.state().store.well_known().actor().as_str(),
            "http://localhost:8080/actor"
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ServerConfig { host: String::new(), ..Default::default() };
        assert!(matches!(ReportServer::new(config), Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn unreadable_certificate_fails_before_listening() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            https: true,
            tls: Some(crate::config::TlsConfig {
                cert_path: dir.path().join("cert.pem"),
                key_path: dir.path().join("key.pem"),
            }),
            ..Default::default()
        };
        let server = ReportServer::new(config).unwrap();
        assert!(matches!(server.serve().await, Err(ServerError::Config(_))));
    }

    #[test]
    fn router_builds() {
        let server = ReportServer::new(ServerConfig::default()).unwrap();
        let _router = server.router();
    }
}

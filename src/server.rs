//! Process wiring: builds the service graph from configuration and serves it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::adapters::auth::{JwtSessionValidator, MockSessionValidator};
use crate::adapters::http::{build_router, AppState, RouterSettings};
use crate::adapters::machine::InMemoryMachineRepository;
use crate::adapters::pairing::{InMemoryPairingKeyStore, RedisPairingKeyStore};
use crate::adapters::user::{InMemoryUserRepository, RecordingSessionValidator};
use crate::adapters::websocket::{RealtimeHub, TelemetryRelay};
use crate::application::{
    spawn_key_sweeper, PairingAuthority, PairingPolicy, RegistrationOrchestrator,
};
use crate::config::{AppConfig, ConfigError, PairingStoreKind, ValidationError};
use crate::ports::{
    Clock, MachineRepository, PairingKeyStore, PairingStoreError, SessionValidator, SystemClock,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("pairing store unavailable: {0}")]
    PairingStore(#[from] PairingStoreError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initializes `tracing`: `RUST_LOG` wins over `server.log_level`; JSON in production.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.is_production() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// A fully wired service, ready to serve.
pub struct Application {
    router: Router,
    addr: SocketAddr,
    relay: Arc<TelemetryRelay>,
    background: Vec<JoinHandle<()>>,
}

impl Application {
    /// Builds the service with the session validator named by `config.auth`.
    pub async fn build(config: &AppConfig) -> Result<Self, StartupError> {
        let sessions: Arc<dyn SessionValidator> = match config.auth.secret() {
            Some(secret) => Arc::new(JwtSessionValidator::new(
                secret,
                config.auth.jwt_issuer.as_deref(),
            )),
            None => {
                tracing::warn!("No auth.jwt_secret configured; every session token will be rejected");
                Arc::new(MockSessionValidator::new())
            }
        };
        Self::build_with_sessions(config, sessions).await
    }

    /// Builds the service around an existing session validator.
    pub async fn build_with_sessions(
        config: &AppConfig,
        sessions: Arc<dyn SessionValidator>,
    ) -> Result<Self, StartupError> {
        config.validate()?;
        let addr = config.server.socket_addr()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let users = InMemoryUserRepository::new();
        let sessions: Arc<dyn SessionValidator> =
            Arc::new(RecordingSessionValidator::new(sessions, users.clone()));
        let machines: Arc<dyn MachineRepository> = Arc::new(InMemoryMachineRepository::new());

        let store: Arc<dyn PairingKeyStore> = match config.pairing.store {
            PairingStoreKind::Memory => Arc::new(InMemoryPairingKeyStore::new()),
            PairingStoreKind::Redis => {
                let url = config.redis.url.as_deref().unwrap_or_default();
                let mut store = RedisPairingKeyStore::connect(url).await?;
                if let Some(prefix) = &config.redis.key_prefix {
                    store = store.with_prefix(prefix.clone());
                }
                tracing::info!("Pairing keys stored in Redis");
                Arc::new(store)
            }
        };

        let authority = Arc::new(PairingAuthority::new(
            Arc::clone(&store),
            Arc::new(users.clone()),
            Arc::clone(&clock),
            PairingPolicy {
                key_ttl: config.pairing.key_ttl_chrono(),
                require_known_owner: config.pairing.require_known_owner,
            },
        ));
        let orchestrator = Arc::new(RegistrationOrchestrator::new(
            Arc::clone(&authority),
            Arc::new(users),
            Arc::clone(&machines),
        ));

        let agents = Arc::new(
            RealtimeHub::new("agent").with_outbound_buffer(config.realtime.outbound_buffer),
        );
        let dashboards = Arc::new(
            RealtimeHub::new("dashboard").with_outbound_buffer(config.realtime.outbound_buffer),
        );
        let relay = TelemetryRelay::install(
            &agents,
            Arc::clone(&dashboards),
            Arc::clone(&machines),
            Arc::clone(&sessions),
        );

        let background = vec![
            spawn_key_sweeper(store, clock, config.pairing.sweep_interval()),
            relay.spawn_heartbeat(config.realtime.heartbeat_interval()),
        ];

        let state = AppState {
            authority,
            orchestrator,
            machines,
            sessions,
            agents,
            dashboards,
            started_at: Instant::now(),
        };
        let settings = RouterSettings {
            agent_path: config.realtime.agent_path.clone(),
            dashboard_path: config.realtime.dashboard_path.clone(),
            cors: config.server.cors(),
        };

        Ok(Self {
            router: build_router(state, &settings),
            addr,
            relay,
            background,
        })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn relay(&self) -> &Arc<TelemetryRelay> {
        &self.relay
    }

    /// Binds the configured address and serves until Ctrl-C.
    pub async fn serve(self) -> Result<(), StartupError> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serves on `listener` until `shutdown` resolves, then stops background tasks.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), StartupError> {
        tracing::info!(addr = %listener.local_addr()?, "Xornet backend listening");

        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        for task in &self.background {
            task.abort();
        }
        tracing::info!("Xornet backend stopped");
        result.map_err(StartupError::from)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

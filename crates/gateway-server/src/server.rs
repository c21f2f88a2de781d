use std::net::SocketAddr;

use axum::Router;
use engine::{Engine, SchemaSettings};
use gateway_config::Config;
use tokio::signal;

use crate::{router, store};

/// Start parameters of the gateway.
pub struct ServeConfig {
    /// The GraphQL endpoint listen address.
    pub listen_address: SocketAddr,
    /// The gateway configuration.
    pub config: Config,
}

/// Connects to the document store, builds the schema and serves it until a termination
/// signal is received.
///
/// # Errors
///
/// Fails when the store settings are incomplete, when the configured fields do not make a
/// valid schema or when the listen address cannot be bound.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> crate::Result<()> {
    let store = store::build_store(&config.store)?;

    let settings = SchemaSettings::new(config.store.partition_key_field(), &config.schema)?
        .with_introspection(config.graph.introspection);

    tracing::info!(
        partition_key = settings.partition_key_field(),
        fields = settings.fields().len(),
        "Schema ready"
    );

    let engine = Engine::new(store, settings)?;
    let router = router::router(&config, engine);

    bind(listen_address, config.graph.path(), router).await
}

async fn bind(addr: SocketAddr, path: &str, router: Router<()>) -> crate::Result<()> {
    let app = router.into_make_service();

    let handle = axum_server::Handle::new();

    // Spawn a task to gracefully shutdown server.
    tokio::spawn(graceful_shutdown(handle.clone()));

    let handle_for_listening = handle.clone();
    let url = format!("http://{addr}{path}");
    tokio::spawn(async move {
        if handle_for_listening.listening().await.is_some() {
            tracing::info!("GraphQL endpoint exposed at {url}");
        }
    });

    axum_server::bind(addr)
        .handle(handle)
        .serve(app)
        .await
        .map_err(crate::Error::Server)
}

/// Waits for Ctrl+C or SIGTERM, then lets in-flight requests finish before shutting down.
async fn graceful_shutdown(handle: axum_server::Handle) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
    handle.graceful_shutdown(Some(std::time::Duration::from_secs(3)));
}

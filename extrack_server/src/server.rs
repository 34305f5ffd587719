//! HTTP server implementation for the exercise tracker.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use extrack_core::config::ServerConfig;
use extrack_core::ExerciseStore;

use crate::handlers::{
    handle_add_exercise, handle_create_user, handle_healthy, handle_list_users, handle_user_log,
    AppState,
};

/// Build the application router.
///
/// When `static_dir` is set, unmatched paths are served from it and `/`
/// resolves to its `index.html`.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route(
            "/api/users",
            get(handle_list_users).post(handle_create_user),
        )
        .route("/api/users/{id}/exercises", post(handle_add_exercise))
        .route("/api/users/{id}/logs", get(handle_user_log))
        .route("/-/healthy", get(handle_healthy));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// HTTP server for the exercise tracker.
pub struct ExtrackServer {
    store: Arc<dyn ExerciseStore>,
    config: ServerConfig,
}

impl ExtrackServer {
    /// Create a new server over an opened store.
    pub fn new(store: Arc<dyn ExerciseStore>, config: ServerConfig) -> Self {
        Self { store, config }
    }

    /// Run the HTTP server until SIGINT or SIGTERM, then close the store.
    pub async fn run(self) -> extrack_core::Result<()> {
        let state = AppState::new(Arc::clone(&self.store));
        let app = router(state, self.config.static_dir.as_deref());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Your app is listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.store.close()?;
        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Listen for SIGTERM and SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}

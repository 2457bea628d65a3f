use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::routing::{delete, get, post, put};
use axum::{middleware, BoxError, Router};
use serde::Serialize;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use faculty_core::config::GatewayConfig;
use faculty_core::error::{FacultyError, Result};

use super::faculty;
use super::response::{ApiError, ApiResponse};
use super::tracing::tracing_middleware;
use crate::storage::PhotoStorage;
use crate::workflow::FacultyService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FacultyService>,
    pub photos: Arc<PhotoStorage>,
}

impl AppState {
    pub fn new(service: FacultyService, photos: PhotoStorage) -> Self {
        Self {
            service: Arc::new(service),
            photos: Arc::new(photos),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
}

/// HTTP gateway serving the faculty API.
pub struct GatewayServer {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let cors = if self.config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(health_handler))
            .nest("/faculty", faculty_routes())
            .nest_service("/uploads", ServeDir::new(self.state.photos.dir()))
            .with_state(self.state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(tracing_middleware))
                    .layer(TraceLayer::new_for_http())
                    .layer(cors)
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        self.config.request_timeout_secs,
                    )))
                    .layer(DefaultBodyLimit::max(self.config.max_body_bytes)),
            )
    }

    /// Get the socket address to bind to.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| {
                FacultyError::Config(format!(
                    "Invalid listen address {}:{}: {}",
                    self.config.host, self.config.port, e
                ))
            })
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Gateway server listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

fn faculty_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(faculty::save_faculty))
        .route("/autoSaveFaculty", post(faculty::autosave_faculty))
        .route("/getAutoSavedFaculty", get(faculty::get_autosaved_faculty))
        .route(
            "/deleteAutoSaveFaculty/{staffid}",
            delete(faculty::delete_autosaved_faculty),
        )
        .route("/getAllFaculties", get(faculty::get_all_faculties))
        .route("/confirmed", get(faculty::list_confirmed))
        .route("/pending-approval", get(faculty::list_pending_approval))
        .route("/search/{id}", get(faculty::get_faculty))
        .route("/delete/{id}", delete(faculty::delete_faculty))
        .route("/update/{id}", put(faculty::update_faculty))
        .route("/verifyFaculty/{id}", put(faculty::verify_faculty))
        .route("/approve/{id}", post(faculty::approve_faculty))
        .route(
            "/rejectFacultyVerification/{id}",
            post(faculty::reject_verification),
        )
        .route("/rejectFacultyApproval/{id}", post(faculty::reject_approval))
        .route("/rejected-approvals", get(faculty::rejected_approvals))
        .route("/rejected-verifications", get(faculty::rejected_verifications))
        .route("/notify/{id}", post(faculty::notify_faculty))
        .route("/notifyhoo-false", get(faculty::pending_for_hoo))
        .route("/acknowledge-hoo/{id}", put(faculty::acknowledge_hoo))
        .route("/notify-si-pending", get(faculty::pending_for_si))
        .route("/acknowledge-si/{id}", put(faculty::acknowledge_si))
        .route("/notify-all-true", get(faculty::fully_acknowledged))
        .route("/monthly", get(faculty::monthly_entries))
        .route("/sessions", get(faculty::sessions_handled))
        .route("/filterFaculties", post(faculty::filter_faculties))
}

/// Turn errors raised by the middleware stack into the response envelope.
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::timeout("Request timed out")
    } else {
        tracing::error!("Middleware failure: {}", err);
        ApiError::internal(super::response::INTERNAL_ERROR_MESSAGE)
    }
}

async fn health_handler(State(state): State<AppState>) -> ApiResponse {
    let database = match state.service.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check: database unreachable: {}", e);
            false
        }
    };

    ApiResponse::success(HealthResponse {
        status: if database { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}

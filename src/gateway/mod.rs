pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::logging::trace_request;
use state::AppState;

/// All `/api/v1` routes plus Swagger UI
pub fn build_router(state: Arc<AppState>) -> Router {
    let transfer_routes = Router::new()
        .route("/", post(handlers::create_transfer))
        .route("/{transfer_id}", get(handlers::get_transfer))
        .route("/{transfer_id}/sessions", post(handlers::link_session))
        .route(
            "/{transfer_id}/kyc",
            post(handlers::submit_kyc).get(handlers::get_kyc),
        )
        .route(
            "/{transfer_id}/kyc/upload-config",
            get(handlers::get_kyc_upload_config),
        )
        .route("/{transfer_id}/deposit", post(handlers::deposit))
        .route("/{transfer_id}/withdraw", post(handlers::withdraw))
        .route("/{transfer_id}/settlements", get(handlers::get_settlements));

    let auth_routes = Router::new()
        .route("/challenge", get(handlers::get_challenge))
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{session_id}", get(handlers::get_session))
        .route(
            "/sessions/{session_id}/finalize",
            post(handlers::finalize_session),
        )
        .route(
            "/sessions/{session_id}/challenge",
            post(handlers::submit_signed_challenge),
        );

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/transfers", transfer_routes)
        .nest("/api/v1/auth", auth_routes)
        .route("/api/v1/kyc/requirements", get(handlers::get_kyc_requirements))
        .route("/api/v1/ledger/transactions", post(handlers::send_transaction))
        .with_state(state)
        .layer(middleware::from_fn(trace_request))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until the listener fails
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        );
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}

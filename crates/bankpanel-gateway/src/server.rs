//! HTTP server implementation using Axum.

use axum::Router;
use axum::routing::{get, post, put};
use bankpanel_backend::Backend;
use bankpanel_core::config::{BankPanelConfig, GatewayConfig};
use bankpanel_core::traits::DataStore;
use bankpanel_platform::{AdminDashboard, SessionService, StaffProvisioner};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::routes;

/// Shared state for the gateway server.
pub struct AppState {
    pub gateway_config: GatewayConfig,
    pub sessions: SessionService,
    pub admin: AdminDashboard,
    pub store: Arc<dyn DataStore>,
    pub backend_name: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: &BankPanelConfig, backend: Backend) -> Self {
        let provisioner = Arc::new(StaffProvisioner::with_config(
            backend.identity.clone(),
            backend.store.clone(),
            &config.provisioning,
        ));
        Self {
            gateway_config: config.gateway.clone(),
            sessions: SessionService::new(
                backend.identity.clone(),
                backend.store.clone(),
                config.auth.jwt_secret.clone(),
                config.auth.token_ttl_hours,
            ),
            admin: AdminDashboard::new(backend.store.clone(), provisioner),
            backend_name: backend.identity.name().to_string(),
            store: backend.store,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route(
            "/api/create-staff",
            post(routes::create_staff).fallback(routes::method_not_allowed),
        )
        .route("/api/v1/auth/login", post(routes::login))
        .route("/api/v1/me", get(routes::me))
        .route("/api/v1/admin/staff", get(routes::admin_staff))
        .route("/api/v1/admin/bank-details", get(routes::admin_bank_details))
        .route("/api/v1/admin/overview", get(routes::admin_overview))
        .route(
            "/api/v1/bank-details",
            get(routes::list_bank_details).post(routes::create_bank_detail),
        )
        .route(
            "/api/v1/bank-details/{id}",
            put(routes::update_bank_detail).delete(routes::delete_bank_detail),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server.
pub async fn start(config: &BankPanelConfig) -> anyhow::Result<()> {
    config.validate()?;
    let backend = bankpanel_backend::create_backend(config)?;
    let app = build_router(AppState::new(config, backend));

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Banking panel listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

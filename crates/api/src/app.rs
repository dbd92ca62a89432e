use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::DeviceStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_authenticated, require_privileged,
    security_headers_middleware, trace_id,
};
use crate::routes::{devices, health, landing};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DeviceStore>,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, store: Arc<dyn DeviceStore>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        store,
        config: config.clone(),
    };

    // Readable by any authenticated user
    let authenticated_routes = Router::new()
        .route("/", get(landing::landing))
        .route("/devices", get(devices::list_devices))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authenticated,
        ));

    // Device mutations require the privileged group
    let privileged_routes = Router::new()
        .route(
            "/devices/add",
            get(devices::add_device_form).post(devices::add_device),
        )
        .route(
            "/devices/edit/:mac",
            get(devices::edit_device_form).post(devices::edit_device),
        )
        .route("/devices/delete/:mac", post(devices::delete_device))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_privileged,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(privileged_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state)
}

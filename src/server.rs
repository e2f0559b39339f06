//! Dashboard HTTP server.
//!
//! Serves the embedded single-page UI, the JSON CRUD API, the widget
//! proxies and a health check endpoint. Security headers are added to
//! every response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api;
use crate::auth;
use crate::config::Config;
use crate::proxy;
use crate::store::Store;

/// State shared with route handlers.
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub admin_password: String,
    pub start_time: Instant,
}

/// Starts the dashboard HTTP server.
/// Returns the join handle for the server task.
pub fn start_server(bind_addr: [u8; 4], port: u16, store: Store, config: Config) -> JoinHandle<()> {
    let admin_password = config.admin_password();
    let state = Arc::new(AppState {
        store,
        config,
        admin_password,
        start_time: Instant::now(),
    });

    let app = router(state);

    let addr = std::net::SocketAddr::from((bind_addr, port));

    info!(
        "Dashboard listening on http://{}:{}/",
        if bind_addr == [127, 0, 0, 1] { "localhost" } else { "0.0.0.0" },
        port
    );

    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind dashboard port");
        axum::serve(listener, app)
            .await
            .expect("Dashboard server error");
    })
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/dashboard.js", get(serve_js))
        .route("/dashboard.css", get(serve_css))
        .route("/health", get(health_check))
        .route("/api/status", get(api_status))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/settings",
            get(api::get_settings).put(api::put_settings),
        )
        .route(
            "/api/sections",
            get(api::list_sections)
                .post(api::create_section)
                .put(api::update_section)
                .delete(api::delete_section)
                .patch(api::reorder_sections),
        )
        .route(
            "/api/links",
            get(api::list_sections)
                .post(api::create_link)
                .put(api::update_link)
                .delete(api::delete_link)
                .patch(api::reorder_links),
        )
        .route(
            "/api/widgets",
            get(api::list_sections)
                .post(api::create_widget)
                .delete(api::delete_widget)
                .patch(api::reorder_widgets),
        )
        .route("/api/widgets/ping", post(proxy::ping))
        .route("/api/widgets/caddy", post(proxy::caddy))
        .route("/api/widgets/portainer", post(proxy::portainer))
        .route("/api/widgets/uptime-kuma", post(proxy::uptime_kuma))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// Middleware that adds security headers to all responses.
async fn security_headers(request: axum::extract::Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert(
        "Content-Security-Policy",
        HeaderValue::from_static(
            "default-src 'self'; style-src 'self'; script-src 'self'; img-src 'self' https:; connect-src 'self'",
        ),
    );
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
    response
}

#[derive(Serialize)]
struct ServerStatus {
    version: String,
    uptime_secs: u64,
    title: String,
    sections: usize,
    links: usize,
    widgets: usize,
}

/// JSON API endpoint: returns server status and document counts.
async fn api_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ServerStatus>, (StatusCode, String)> {
    let data = state
        .store
        .load()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(ServerStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        title: data.settings.title.clone(),
        sections: data.sections.len(),
        links: data.link_count(),
        widgets: data.widget_count(),
    }))
}

/// Health check endpoint for Docker.
async fn health_check() -> &'static str {
    "ok"
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("dashboard.html"))
}

async fn serve_js() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("dashboard.js"),
    )
}

async fn serve_css() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css")],
        include_str!("dashboard.css"),
    )
}

//! Outbound widget proxies: ping check, Caddy, Portainer and Uptime Kuma.
//!
//! Straight pass-through HTTP calls with a fixed timeout. Portainer and
//! Uptime Kuma instances in a homelab commonly run behind self-signed
//! certificates, so TLS verification can be disabled for those two.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::server::AppState;

type ProxyResult = Result<Json<Value>, (StatusCode, String)>;

fn require(value: Option<String>, name: &str) -> Result<String, (StatusCode, String)> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err((StatusCode::BAD_REQUEST, format!("{} is required", name))),
    }
}

fn client_error(e: reqwest::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn upstream_error(service: &str, detail: String) -> (StatusCode, String) {
    warn!("{} proxy error: {}", service, detail);
    (StatusCode::BAD_GATEWAY, detail)
}

/// Fetch a URL and wrap the upstream JSON as `{ "success": true, "data": ... }`.
async fn relay_json(
    client: reqwest::Client,
    service: &str,
    url: &str,
    api_key: Option<&str>,
) -> ProxyResult {
    let mut request = client.get(url).header("Accept", "application/json");
    if let Some(key) = api_key {
        request = request.header("X-API-Key", key);
    }

    let resp = request
        .send()
        .await
        .map_err(|e| upstream_error(service, e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| upstream_error(service, e.to_string()))?;

    if !status.is_success() {
        return Err(upstream_error(
            service,
            format!("HTTP {}: {}", status, body),
        ));
    }

    // Some endpoints reply with plain text; pass it through as-is.
    let data = serde_json::from_str(&body).unwrap_or(Value::String(body));
    Ok(Json(json!({ "success": true, "data": data })))
}

// === Ping ===

#[derive(Deserialize)]
pub struct PingRequest {
    pub url: Option<String>,
}

/// HEAD-request a URL to check whether it responds. 2xx/3xx counts as
/// online; transport failures are reported as data, not as an error status.
pub async fn ping(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PingRequest>,
) -> ProxyResult {
    let url = require(body.url, "url")?;

    // Redirects are not followed so 3xx statuses stay observable.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(state.config.proxy.timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(client_error)?;

    match client.head(&url).send().await {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let online = (200..400).contains(&status);
            Ok(Json(json!({ "online": online, "status": status })))
        }
        Err(e) => Ok(Json(json!({ "online": false, "error": e.to_string() }))),
    }
}

// === Caddy ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaddyRequest {
    pub api_url: Option<String>,
    pub endpoint: Option<String>,
}

/// Relay a read-only query to the Caddy admin API.
pub async fn caddy(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CaddyRequest>,
) -> ProxyResult {
    let api_url = require(body.api_url, "apiUrl")?;
    let endpoint = require(body.endpoint, "endpoint")?;
    let url = format!("{}{}", api_url.trim_end_matches('/'), endpoint);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(state.config.proxy.timeout_secs))
        .build()
        .map_err(client_error)?;

    relay_json(client, "Caddy", &url, None).await
}

// === Portainer ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortainerRequest {
    pub api_url: Option<String>,
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
}

/// Relay a read-only query to the Portainer API, authenticated with the
/// X-API-Key header when a token is supplied.
pub async fn portainer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PortainerRequest>,
) -> ProxyResult {
    let api_url = require(body.api_url, "apiUrl")?;
    let endpoint = require(body.endpoint, "endpoint")?;
    let url = format!("{}{}", api_url.trim_end_matches('/'), endpoint);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(state.config.proxy.timeout_secs))
        .danger_accept_invalid_certs(state.config.proxy.accept_invalid_certs)
        .build()
        .map_err(client_error)?;

    relay_json(client, "Portainer", &url, body.api_token.as_deref()).await
}

// === Uptime Kuma ===

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeKumaRequest {
    pub api_url: Option<String>,
    pub slug: Option<String>,
}

/// Fetch a status page from an Uptime Kuma instance.
pub async fn uptime_kuma(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UptimeKumaRequest>,
) -> ProxyResult {
    let api_url = require(body.api_url, "apiUrl")?;
    let slug = require(body.slug, "slug")?;
    let url = format!(
        "{}/api/status-page/{}",
        api_url.trim_end_matches('/'),
        slug
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(state.config.proxy.timeout_secs))
        .danger_accept_invalid_certs(state.config.proxy.accept_invalid_certs)
        .build()
        .map_err(client_error)?;

    relay_json(client, "Uptime Kuma", &url, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        assert!(require(None, "url").is_err());
        assert!(require(Some("  ".to_string()), "url").is_err());
        assert_eq!(require(Some("http://x".to_string()), "url").unwrap(), "http://x");
    }

    #[test]
    fn test_require_reports_field_name() {
        let (status, msg) = require(None, "apiUrl").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "apiUrl is required");
    }

    #[test]
    fn test_portainer_body_accepts_optional_token() {
        let body: PortainerRequest = serde_json::from_str(
            r#"{ "apiUrl": "https://p:9443", "endpoint": "/api/endpoints" }"#,
        )
        .unwrap();
        assert!(body.api_token.is_none());
        assert_eq!(body.endpoint.as_deref(), Some("/api/endpoints"));
    }

    #[test]
    fn test_kuma_url_shape() {
        let api_url = "https://kuma.local/".trim_end_matches('/');
        let url = format!("{}/api/status-page/{}", api_url, "homelab");
        assert_eq!(url, "https://kuma.local/api/status-page/homelab");
    }
}

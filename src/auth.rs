//! Shared-secret admin login.
//!
//! The server holds no session state: a successful login flips a
//! client-side flag that the UI persists in browser storage.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::server::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if check_password(&body.password, &state.admin_password) {
        info!("Admin login succeeded");
        Ok(Json(json!({ "success": true })))
    } else {
        info!("Admin login rejected");
        Err((StatusCode::UNAUTHORIZED, "Invalid password".to_string()))
    }
}

/// Constant-time-ish comparison; the secret is low-value but there is no
/// reason to leak length-prefix timing either.
fn check_password(given: &str, expected: &str) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_password_match() {
        assert!(check_password("admin", "admin"));
    }

    #[test]
    fn test_check_password_mismatch() {
        assert!(!check_password("Admin", "admin"));
        assert!(!check_password("", "admin"));
        assert!(!check_password("adminn", "admin"));
    }
}

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use quotedesk_auth::{AuthError, Principal};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Exchange credentials for a bearer token.
///
/// Unknown usernames and wrong passwords get the same 401.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    if body.username.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password are required",
        );
    }

    let account = match services.users.find_by_username(body.username.trim()).await {
        Ok(Some(account)) => account,
        Ok(None) => return invalid_credentials(),
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match account.check_password(&body.password) {
        Ok(()) => {}
        Err(AuthError::InvalidCredentials) => return invalid_credentials(),
        Err(e) => return errors::service_error_to_response(e.into()),
    }

    let issued = match services.jwt.issue(&account, Utc::now(), services.token_ttl) {
        Ok(t) => t,
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    tracing::info!(user_id = %account.id, username = %account.username, "login succeeded");
    Json(dto::LoginResponse::new(issued, Principal::from_account(&account))).into_response()
}

fn invalid_credentials() -> Response {
    tracing::warn!("login rejected");
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        AuthError::InvalidCredentials.to_string(),
    )
}

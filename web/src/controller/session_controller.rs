//! Session endpoints for the dashboard SPA: credential status and logout.

use crate::controller::ApiResponse;
use crate::cookie::BrowserCookies;
use crate::AppState;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use log::*;
use serde_json::json;

/// GET /tokens
///
/// Status view of the stored credential so the SPA can decide whether to
/// show the connect button. Token material is redacted to a short preview;
/// the full tokens never leave the encrypted cookie.
#[utoipa::path(
    get,
    path = "/tokens",
    responses(
        (status = 200, description = "Credential status for this browser session"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn tokens(State(app_state): State<AppState>, headers: HeaderMap) -> Response {
    let cookies = BrowserCookies::from_headers(&headers);

    match domain::authorization::current_credential(&app_state.config, &cookies) {
        Ok(credential) => {
            let body = json!({
                "authenticated": true,
                "access_token": domain::redact_token(&credential.access_token),
                "refresh_token": credential.refresh_token.as_deref().map(domain::redact_token),
                "expires_at": credential.expires_at,
                "token_type": credential.token_type,
                "scope": credential.scope,
            });
            Json(ApiResponse::new(StatusCode::OK.into(), body)).into_response()
        }
        Err(e) => {
            // An unauthenticated browser polls this too; not an error
            debug!("No readable session for /tokens: {:?}", e.error_kind);
            Json(ApiResponse::new(
                StatusCode::OK.into(),
                json!({ "authenticated": false }),
            ))
            .into_response()
        }
    }
}

/// GET /logout
///
/// Clears the session cookie and sends the browser back to the dashboard.
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 307, description = "Redirect to the dashboard, session cleared"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn logout(State(app_state): State<AppState>, headers: HeaderMap) -> Response {
    let mut cookies = BrowserCookies::from_headers(&headers);
    domain::authorization::clear_session(&mut cookies);

    let target = app_state.config.oauth_success_redirect_path().to_string();
    cookies.apply(Redirect::temporary(&target).into_response())
}

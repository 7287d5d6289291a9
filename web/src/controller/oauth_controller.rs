//! Controller for the Google Fit OAuth authorization flow.
//!
//! Note: both endpoints work via browser redirects. The callback never
//! surfaces an HTTP error status the browser would dead-end on; every
//! failure becomes a redirect to the failure page, and which step aborted
//! is only visible in the server log.

use crate::cookie::BrowserCookies;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use log::*;
use serde::Deserialize;

/// Query parameters Google appends to the callback redirect
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// GET /authorize
///
/// Starts the flow: binds a fresh CSRF state cookie to the browser and
/// redirects it to the Google consent screen.
#[utoipa::path(
    get,
    path = "/authorize",
    responses(
        (status = 307, description = "Redirect to the Google consent screen"),
        (status = 500, description = "Server error (OAuth not configured)"),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    let mut cookies = BrowserCookies::from_headers(&headers);

    let url = domain::authorization::begin_authorization(&app_state.config, &mut cookies)?;

    Ok(cookies.apply(Redirect::temporary(&url).into_response()))
}

/// GET /oauth2callback
///
/// Finishes the flow after Google redirects the browser back. On success
/// the encrypted session cookie is set and the browser lands on the
/// dashboard; on any failure it lands on the failure page with nothing
/// stored. The CSRF state cookie is consumed either way.
#[utoipa::path(
    get,
    path = "/oauth2callback",
    params(
        ("state" = Option<String>, Query, description = "CSRF state echoed back by Google"),
        ("code" = Option<String>, Query, description = "Authorization code to exchange"),
    ),
    responses(
        (status = 307, description = "Redirect to the dashboard or the failure page"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<OAuthCallback>,
    headers: HeaderMap,
) -> Response {
    let config = &app_state.config;
    let mut cookies = BrowserCookies::from_headers(&headers);

    let target = match domain::authorization::complete_authorization(
        config,
        &mut cookies,
        params.state.as_deref(),
        params.code.as_deref(),
    )
    .await
    {
        Ok(target) => target,
        Err(e) => {
            warn!("OAuth callback aborted: {:?}", e.error_kind);
            config.oauth_failure_redirect_path().to_string()
        }
    };

    cookies.apply(Redirect::temporary(&target).into_response())
}

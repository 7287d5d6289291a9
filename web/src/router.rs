use crate::{controller::health_check_controller, AppState};
use axum::{routing::get, Router};
use tower_http::services::ServeDir;

use crate::controller::{oauth_controller, session_controller};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Vitals Platform API"
        ),
        paths(
            health_check_controller::health_check,
            oauth_controller::authorize,
            oauth_controller::callback,
            session_controller::tokens,
            session_controller::logout,
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "vitals_platform", description = "Google Fit vitals dashboard API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "oauth_session",
                    "Encrypted credential cookie set by a successful /oauth2callback",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(oauth_routes(app_state.clone()))
        .merge(session_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Routes for the Google OAuth flow
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/authorize", get(oauth_controller::authorize))
        .route("/oauth2callback", get(oauth_controller::callback))
        .with_state(app_state)
}

/// Routes for inspecting and ending the browser session
fn session_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/tokens", get(session_controller::tokens))
        .route("/logout", get(session_controller::logout))
        .with_state(app_state)
}

// Serves the built dashboard assets for any path the API does not claim
pub fn static_routes() -> Router {
    Router::new().nest_service("/", ServeDir::new("./"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use clap::Parser;
    use mockito::{Matcher, Server, ServerGuard};
    use service::config::Config;
    use tower::ServiceExt;

    const FULL_GRANT: &str =
        "openid email profile https://www.googleapis.com/auth/fitness.activity.read";

    fn test_app_state(token_url: &str) -> AppState {
        let config = Config::parse_from([
            "vitals",
            "--google-client-id",
            "test-client-id",
            "--google-client-secret",
            "test-client-secret",
            "--google-redirect-uri",
            "http://localhost:4000/oauth2callback",
            "--google-token-url",
            token_url,
            "--required-scopes",
            "https://www.googleapis.com/auth/fitness.activity.read",
            "--session-secret",
            "test-session-secret",
        ]);
        AppState::new(config)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    /// Value of the named cookie in the response's Set-Cookie headers.
    fn set_cookie_value(response: &Response, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| {
                let pair = v.split(';').next()?;
                let (n, value) = pair.split_once('=')?;
                (n == name).then(|| value.to_string())
            })
    }

    async fn mock_token_endpoint(server: &mut ServerGuard, granted_scope: &str) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .match_body(Matcher::UrlEncoded("code".into(), "4/auth-code".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "access_token": "ya29.test-access-token",
                    "refresh_token": "1//test-refresh-token",
                    "expires_in": 3600,
                    "token_type": "Bearer",
                    "scope": granted_scope,
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = define_routes(test_app_state("https://oauth2.googleapis.com/token"));
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_authorize_sets_state_cookie_and_redirects_to_consent() {
        let app = define_routes(test_app_state("https://oauth2.googleapis.com/token"));

        let response = app.oneshot(get_request("/authorize")).await.unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        let state = set_cookie_value(&response, "oauth_state").unwrap();
        assert!(!state.is_empty());

        let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(location.contains(&format!("state={state}")));
        assert!(location.contains("response_type=code"));
    }

    #[tokio::test]
    async fn test_authorize_without_client_config_is_500() {
        let config = Config::parse_from(["vitals", "--runtime-env", "staging"]);
        let app = define_routes(AppState::new(config));

        let response = app.oneshot(get_request("/authorize")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_callback_happy_path_stores_session_and_redirects_home() {
        let mut server = Server::new_async().await;
        let app_state = test_app_state(&format!("{}/token", server.url()));
        let app = define_routes(app_state);

        let start = app.clone().oneshot(get_request("/authorize")).await.unwrap();
        let state = set_cookie_value(&start, "oauth_state").unwrap();

        let mock = mock_token_endpoint(&mut server, FULL_GRANT).await;

        let response = app
            .clone()
            .oneshot(get_with_cookie(
                &format!("/oauth2callback?state={state}&code=4%2Fauth-code"),
                &format!("oauth_state={state}"),
            ))
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");

        // The state cookie was consumed and the encrypted session was set
        assert_eq!(set_cookie_value(&response, "oauth_state").as_deref(), Some(""));
        let session = set_cookie_value(&response, "oauth_session").unwrap();
        assert!(!session.is_empty());

        // The SPA can now read a redacted status view
        let tokens = app
            .oneshot(get_with_cookie(
                "/tokens",
                &format!("oauth_session={session}"),
            ))
            .await
            .unwrap();
        assert_eq!(tokens.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(tokens.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["authenticated"], serde_json::json!(true));
        let preview = body["data"]["access_token"].as_str().unwrap();
        assert!(preview.ends_with("..."));
        assert_ne!(preview, "ya29.test-access-token");
        assert_eq!(body["data"]["scope"], serde_json::json!(FULL_GRANT));
    }

    #[tokio::test]
    async fn test_callback_with_wrong_state_fails_without_touching_google() {
        let mut server = Server::new_async().await;
        let app = define_routes(test_app_state(&format!("{}/token", server.url())));

        let mock = server.mock("POST", "/token").expect(0).create_async().await;

        let response = app
            .oneshot(get_with_cookie(
                "/oauth2callback?state=forged-state&code=4%2Fauth-code",
                "oauth_state=the-real-state",
            ))
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/auth/failed");
        assert!(set_cookie_value(&response, "oauth_session").is_none());
        assert_eq!(set_cookie_value(&response, "oauth_state").as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_callback_without_code_fails_without_touching_google() {
        let mut server = Server::new_async().await;
        let app = define_routes(test_app_state(&format!("{}/token", server.url())));

        let mock = server.mock("POST", "/token").expect(0).create_async().await;

        let response = app
            .oneshot(get_with_cookie(
                "/oauth2callback?state=the-real-state",
                "oauth_state=the-real-state",
            ))
            .await
            .unwrap();
        mock.assert_async().await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/auth/failed");
        assert!(set_cookie_value(&response, "oauth_session").is_none());
    }

    #[tokio::test]
    async fn test_callback_with_narrowed_grant_redirects_to_failure() {
        let mut server = Server::new_async().await;
        let app = define_routes(test_app_state(&format!("{}/token", server.url())));

        let start = app.clone().oneshot(get_request("/authorize")).await.unwrap();
        let state = set_cookie_value(&start, "oauth_state").unwrap();

        // Grant lacks the required fitness scope
        let _mock = mock_token_endpoint(&mut server, "openid email profile").await;

        let response = app
            .oneshot(get_with_cookie(
                &format!("/oauth2callback?state={state}&code=4%2Fauth-code"),
                &format!("oauth_state={state}"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/auth/failed");
        assert!(set_cookie_value(&response, "oauth_session").is_none());
    }

    #[tokio::test]
    async fn test_tokens_without_session_reports_unauthenticated() {
        let app = define_routes(test_app_state("https://oauth2.googleapis.com/token"));

        let response = app.oneshot(get_request("/tokens")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["authenticated"], serde_json::json!(false));
        assert!(body["data"]["access_token"].is_null());
    }

    #[tokio::test]
    async fn test_tokens_with_garbled_session_reports_unauthenticated() {
        let app = define_routes(test_app_state("https://oauth2.googleapis.com/token"));

        let response = app
            .oneshot(get_with_cookie("/tokens", "oauth_session=not-a-real-blob"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["authenticated"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_redirects_home() {
        let app = define_routes(test_app_state("https://oauth2.googleapis.com/token"));

        let response = app
            .oneshot(get_with_cookie("/logout", "oauth_session=credential-blob"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/");
        assert_eq!(
            set_cookie_value(&response, "oauth_session").as_deref(),
            Some("")
        );
    }
}

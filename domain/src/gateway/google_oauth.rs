//! Google OAuth client.
//!
//! This module provides an HTTP client for the Google OAuth2 authorization
//! code flow: building the consent URL and exchanging an authorization code
//! for a token credential.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use chrono::{Duration, Utc};
use fitness_auth::credential::TokenCredential;
use fitness_auth::scope::ScopeSet;
use log::*;
use serde::{Deserialize, Serialize};

/// Identity scopes requested alongside the configured fitness scopes.
const IDENTITY_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Ceiling on the token exchange round trip. The exchange is never retried;
/// exceeding this surfaces as a network failure.
const EXCHANGE_TIMEOUT_SECS: u64 = 10;

/// OAuth token response from Google
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

impl TokenResponse {
    /// Convert the relative `expires_in` into an absolute expiry while the
    /// response is fresh. Zero or negative lifetimes leave the expiry unset.
    fn into_credential(self) -> TokenCredential {
        let expires_at = if self.expires_in > 0 {
            Some(Utc::now() + Duration::seconds(self.expires_in))
        } else {
            None
        };

        TokenCredential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            token_type: self.token_type,
            scope: self.scope,
        }
    }
}

/// Request to exchange authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest {
    code: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    grant_type: String,
}

/// Configuration for Google OAuth URLs
#[derive(Debug, Clone)]
pub struct GoogleOAuthUrls {
    pub auth_url: String,
    pub token_url: String,
}

/// Google OAuth client for the authorization code flow
pub struct GoogleOAuthClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: ScopeSet,
    urls: GoogleOAuthUrls,
}

impl GoogleOAuthClient {
    /// Create a new Google OAuth client with configurable URLs
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        scopes: ScopeSet,
        urls: GoogleOAuthUrls,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(std::time::Duration::from_secs(EXCHANGE_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            scopes,
            urls,
        })
    }

    /// Generate the OAuth authorization URL for user consent.
    ///
    /// `access_type=offline` with `prompt=consent` asks Google for a refresh
    /// token; `include_granted_scopes=true` folds previously granted scopes
    /// into the new grant.
    pub fn consent_url(&self, state: &str) -> String {
        let scopes = IDENTITY_SCOPES
            .iter()
            .copied()
            .chain(self.scopes.iter())
            .collect::<Vec<_>>()
            .join(" ");

        format!(
            "{}?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope={}&\
            access_type=offline&\
            include_granted_scopes=true&\
            prompt=consent&\
            state={}",
            self.urls.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for a token credential
    pub async fn exchange_code(&self, code: &str) -> Result<TokenCredential, Error> {
        let request = TokenExchangeRequest {
            code: code.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            grant_type: "authorization_code".to_string(),
        };

        debug!("Exchanging Google OAuth code for tokens");

        let response = self
            .client
            .post(&self.urls.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange Google OAuth code: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        if response.status().is_success() {
            let tokens: TokenResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Google token response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::OAuthExchange),
                }
            })?;
            info!("Successfully exchanged Google OAuth code for tokens");
            Ok(tokens.into_credential())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google OAuth token endpoint returned {status}: {error_text}");
            Err(Error {
                source: Some(error_text.into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::OAuthExchange),
            })
        }
    }
}

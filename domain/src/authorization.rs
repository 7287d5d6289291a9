//! The Google Fit authorization flow.
//!
//! Orchestrates the consent redirect, the OAuth callback and access to the
//! stored credential. All browser state lives in two cookies written through
//! the [`CookieStore`] the web layer hands in: the short-lived `oauth_state`
//! CSRF cookie and the encrypted `oauth_session` credential cookie. There is
//! no server-side session store.

use fitness_auth::credential::TokenCredential;
use fitness_auth::csrf::{CsrfGuard, STATE_COOKIE};
use fitness_auth::scope::ScopeSet;
use fitness_auth::session::{CookieOptions, CookieStore, SessionCodec, SESSION_COOKIE};
use log::*;
use service::config::Config;

use crate::error::{AuthErrorKind, DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::google_oauth::{GoogleOAuthClient, GoogleOAuthUrls};

/// Begin the authorization flow for a browser.
///
/// Binds a fresh CSRF state to the browser via the state cookie and returns
/// the Google consent URL to redirect it to.
pub fn begin_authorization(
    config: &Config,
    cookies: &mut dyn CookieStore,
) -> Result<String, Error> {
    let client = create_google_client(config)?;
    let state = csrf_guard(config).issue(cookies);

    info!("Redirecting browser to Google consent screen");
    Ok(client.consent_url(&state))
}

/// Complete the authorization flow from the provider callback.
///
/// Validates the CSRF state, exchanges the code, verifies the granted scopes
/// and stores the credential in the encrypted session cookie. The state
/// cookie is consumed on every outcome, success or not, so a callback URL
/// can never be replayed. Returns the path the browser should land on.
pub async fn complete_authorization(
    config: &Config,
    cookies: &mut (dyn CookieStore + Send),
    state: Option<&str>,
    code: Option<&str>,
) -> Result<String, Error> {
    let guard = csrf_guard(config);

    let (state, code) = match (state, code) {
        (Some(state), Some(code)) => (state, code),
        _ => {
            // Even an incomplete callback consumes the pending state.
            cookies.clear(STATE_COOKIE);
            warn!("OAuth callback arrived without a state or code parameter");
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Auth(
                    AuthErrorKind::MissingParameter,
                )),
            });
        }
    };

    guard.validate(cookies, state)?;

    // Resolve everything the rest of the flow needs before spending the
    // one-time authorization code on a network call.
    let client = create_google_client(config)?;
    let required = required_scopes(config)?;
    let codec = session_codec(config)?;

    let credential = client.exchange_code(code).await?;

    let check = required.verify(Some(&credential.scope));
    if !check.satisfied() {
        warn!(
            "Google grant is missing required scopes: {:?}",
            check.missing()
        );
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Auth(
                AuthErrorKind::InsufficientScope,
            )),
        });
    }

    codec.store(
        cookies,
        SESSION_COOKIE,
        &credential,
        &CookieOptions::session(config.secure_cookies()),
    )?;

    info!("Google Fit authorization complete; credential stored in session cookie");
    Ok(config.oauth_success_redirect_path().to_string())
}

/// Load the credential stored in the session cookie.
///
/// An absent, corrupted or foreign cookie all surface as the same
/// unreadable-session error; callers treat that as "not authenticated".
pub fn current_credential(
    config: &Config,
    cookies: &dyn CookieStore,
) -> Result<TokenCredential, Error> {
    let codec = session_codec(config)?;
    Ok(codec.load(cookies, SESSION_COOKIE)?)
}

/// Drop the browser's session cookie and any half-finished flow state.
pub fn clear_session(cookies: &mut dyn CookieStore) {
    cookies.clear(SESSION_COOKIE);
    cookies.clear(STATE_COOKIE);
    info!("Cleared session cookies");
}

fn csrf_guard(config: &Config) -> CsrfGuard {
    CsrfGuard::new(config.state_cookie_max_age_secs, config.secure_cookies())
}

fn session_codec(config: &Config) -> Result<SessionCodec, Error> {
    let secret = config.session_secret().ok_or_else(|| {
        warn!("No session secret configured");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })?;

    Ok(SessionCodec::new(secret.as_bytes()))
}

fn required_scopes(config: &Config) -> Result<ScopeSet, Error> {
    ScopeSet::new(config.required_scopes.clone()).ok_or_else(|| {
        warn!("Required scopes configuration is empty");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })
}

/// Create a Google OAuth client from config.
fn create_google_client(config: &Config) -> Result<GoogleOAuthClient, Error> {
    let client_id = config.google_client_id().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;

    let client_secret = config.google_client_secret().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;

    let redirect_uri = config.google_redirect_uri().ok_or_else(|| Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    })?;

    GoogleOAuthClient::new(
        &client_id,
        &client_secret,
        &redirect_uri,
        required_scopes(config)?,
        GoogleOAuthUrls {
            auth_url: config.google_auth_url().to_string(),
            token_url: config.google_token_url().to_string(),
        },
    )
}

use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Default Google OAuth consent endpoint.
pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Default Google OAuth token endpoint used when `GOOGLE_TOKEN_URL` is not set.
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// The Google Fit read scopes the dashboard needs, in consent-request order.
const DEFAULT_REQUIRED_SCOPES: &str = "https://www.googleapis.com/auth/fitness.activity.read,\
    https://www.googleapis.com/auth/fitness.location.read,\
    https://www.googleapis.com/auth/fitness.body.read,\
    https://www.googleapis.com/auth/fitness.heart_rate.read,\
    https://www.googleapis.com/auth/fitness.sleep.read";

/// Fallback session secret for local development only. Production refuses
/// to boot without an explicit `SESSION_SECRET`.
const INSECURE_DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The Google OAuth client ID issued for this backend.
    #[arg(long, env)]
    google_client_id: Option<String>,

    /// The Google OAuth client secret issued for this backend.
    #[arg(long, env)]
    google_client_secret: Option<String>,

    /// The redirect URI registered with Google for the OAuth callback.
    #[arg(long, env)]
    google_redirect_uri: Option<String>,

    /// The Google OAuth consent endpoint.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_GOOGLE_AUTH_URL)]
    google_auth_url: String,

    /// The Google OAuth token endpoint.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_GOOGLE_TOKEN_URL)]
    google_token_url: String,

    /// The Google Fit scopes a user must grant for the dashboard to work.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = DEFAULT_REQUIRED_SCOPES
    )]
    pub required_scopes: Vec<String>,

    /// Secret used to encrypt the session cookie. Required in production;
    /// development falls back to a well-known insecure value.
    #[arg(long, env)]
    session_secret: Option<String>,

    /// Path to a Google-format client_secret.json. Only consulted in
    /// development; values in the file take precedence over env vars.
    #[arg(long, env, default_value = "client_secret.json")]
    client_secrets_file: String,

    /// Lifetime in seconds of the CSRF state cookie.
    #[arg(long, env, default_value_t = 600)]
    pub state_cookie_max_age_secs: i64,

    /// Path the browser is sent to after a successful authorization.
    #[arg(long, env, default_value = "/")]
    oauth_success_redirect_path: String,

    /// Path the browser is sent to when any step of the callback fails.
    #[arg(long, env, default_value = "/auth/failed")]
    oauth_failure_redirect_path: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    #[arg(skip)]
    client_secrets_loaded: bool,
}

/// Google's client_secret.json shape for a "web" application.
#[derive(Debug, Deserialize)]
struct ClientSecrets {
    web: ClientSecretsWeb,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsWeb {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        let mut config = Config::parse();
        config.apply_client_secrets();
        config
    }

    /// Merge credentials from a Google client_secret.json, development only.
    fn apply_client_secrets(&mut self) {
        if self.runtime_env != RustEnv::Development {
            return;
        }

        let raw = match std::fs::read_to_string(&self.client_secrets_file) {
            Ok(raw) => raw,
            Err(_) => return,
        };

        match serde_json::from_str::<ClientSecrets>(&raw) {
            Ok(secrets) => {
                self.google_client_id = Some(secrets.web.client_id);
                self.google_client_secret = Some(secrets.web.client_secret);
                if let Some(uri) = secrets.web.redirect_uris.into_iter().next() {
                    self.google_redirect_uri = Some(uri);
                }
                self.client_secrets_loaded = true;
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unparseable client secrets file {}: {e}",
                    self.client_secrets_file
                );
            }
        }
    }

    pub fn google_client_id(&self) -> Option<String> {
        self.google_client_id.clone()
    }

    pub fn google_client_secret(&self) -> Option<String> {
        self.google_client_secret.clone()
    }

    pub fn google_redirect_uri(&self) -> Option<String> {
        self.google_redirect_uri.clone()
    }

    pub fn google_auth_url(&self) -> &str {
        &self.google_auth_url
    }

    pub fn google_token_url(&self) -> &str {
        &self.google_token_url
    }

    /// Returns the configured session secret, or the insecure development
    /// fallback when running in development without one.
    pub fn session_secret(&self) -> Option<String> {
        self.session_secret.clone().or_else(|| {
            (self.runtime_env == RustEnv::Development)
                .then(|| INSECURE_DEV_SESSION_SECRET.to_string())
        })
    }

    /// True when the session secret in effect is the development fallback.
    pub fn using_dev_session_secret(&self) -> bool {
        self.session_secret.is_none() && self.runtime_env == RustEnv::Development
    }

    /// Returns the path to the development client secrets file.
    pub fn client_secrets_file(&self) -> &str {
        &self.client_secrets_file
    }

    /// True when credentials were loaded from the client secrets file.
    pub fn client_secrets_loaded(&self) -> bool {
        self.client_secrets_loaded
    }

    /// Returns the post-authorization redirect path.
    pub fn oauth_success_redirect_path(&self) -> &str {
        &self.oauth_success_redirect_path
    }

    /// Returns the redirect path used when the callback aborts.
    pub fn oauth_failure_redirect_path(&self) -> &str {
        &self.oauth_failure_redirect_path
    }

    /// Cookies carry the `Secure` attribute everywhere except local development.
    pub fn secure_cookies(&self) -> bool {
        self.runtime_env != RustEnv::Development
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        // This could check an environment variable, or a config field
        self.runtime_env() == RustEnv::Production
    }
}

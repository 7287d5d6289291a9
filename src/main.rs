use log::*;
use service::config::Config;
use service::logging::Logger;
use service::AppState;
use std::process;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::new();

    Logger::init_logger(&config);

    info!("Starting in {} mode", config.runtime_env());
    if config.client_secrets_loaded() {
        info!(
            "Loaded Google OAuth credentials from {}",
            config.client_secrets_file()
        );
    }

    validate_oauth_config(&config);

    let app_state = AppState::new(config);

    web::init_server(app_state).await
}

/// Checks that the settings the authorization flow depends on are present.
///
/// Production refuses to boot with an incomplete OAuth configuration; in
/// development and staging the server starts anyway so the health check and
/// static assets stay reachable, and each missing value is logged.
fn validate_oauth_config(config: &Config) {
    let mut missing: Vec<&str> = Vec::new();

    if config.google_client_id().is_none() {
        missing.push("GOOGLE_CLIENT_ID");
    }
    if config.google_client_secret().is_none() {
        missing.push("GOOGLE_CLIENT_SECRET");
    }
    if config.google_redirect_uri().is_none() {
        missing.push("GOOGLE_REDIRECT_URI");
    }
    if config.session_secret().is_none() {
        missing.push("SESSION_SECRET");
    }

    if !missing.is_empty() {
        if config.is_production() {
            error!(
                "Refusing to start in production without {}",
                missing.join(", ")
            );
            process::exit(1);
        }
        warn!(
            "Missing {}; the authorization flow will fail until these are configured",
            missing.join(", ")
        );
    }

    if config.using_dev_session_secret() {
        warn!("Using the built-in development session secret; set SESSION_SECRET to override");
    }
}

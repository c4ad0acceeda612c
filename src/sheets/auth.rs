use crate::config::{Config, Credentials, GoogleConfig};
use crate::error::{AppError, Result};
use crate::sheets::hub::AUTH_SCOPE;
use hyper_util::client::legacy::connect::HttpConnector;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing::instrument;
use yup_oauth2::{
    ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod,
    ServiceAccountAuthenticator, authenticator::Authenticator, hyper_rustls::HttpsConnector,
};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_CERT_URL: &str = "https://www.googleapis.com/oauth2/v1/certs";
const GOOGLE_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

const INSTALLED_TOKENS_FILE: &str = "google_tokens.json";
const SERVICE_ACCOUNT_TOKENS_FILE: &str = "service_account_tokens.json";

type AuthType = Authenticator<HttpsConnector<HttpConnector>>;

/// Create and verify authenticator by fetching a token
pub(super) async fn create_and_verify_authenticator(config: &GoogleConfig) -> Result<AuthType> {
    let auth = match config.credentials()? {
        Credentials::ServiceAccount { key_path, subject } => {
            from_service_account(&key_path, subject).await?
        }
        Credentials::InstalledApp {
            client_id,
            client_secret,
        } => from_installed_flow(client_id, client_secret).await?,
    };

    // Trigger authentication by requesting a token
    let _token = auth
        .token(&[AUTH_SCOPE])
        .await
        .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

    Ok(auth)
}

async fn from_service_account(key_path: &Path, subject: Option<String>) -> Result<AuthType> {
    let key = yup_oauth2::read_service_account_key(key_path)
        .await
        .map_err(|e| {
            AppError::Auth(format!(
                "Failed to read service account key {:?}: {}",
                key_path, e
            ))
        })?;

    let token_cache_path = token_cache_path(SERVICE_ACCOUNT_TOKENS_FILE)?;

    let mut builder = ServiceAccountAuthenticator::builder(key);
    if let Some(subject) = subject {
        builder = builder.subject(subject);
    }

    let auth = builder
        .persist_tokens_to_disk(token_cache_path)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))?;

    Ok(auth)
}

async fn from_installed_flow(client_id: String, client_secret: String) -> Result<AuthType> {
    // Build the OAuth application secret from config values
    let secret = ApplicationSecret {
        client_id,
        client_secret,
        auth_uri: GOOGLE_AUTH_URL.to_string(),
        token_uri: GOOGLE_TOKEN_URL.to_string(),
        auth_provider_x509_cert_url: Some(GOOGLE_CERT_URL.to_string()),
        redirect_uris: vec![GOOGLE_REDIRECT_URI.to_string()],
        project_id: None,
        client_email: None,
        client_x509_cert_url: None,
    };

    let token_cache_path = token_cache_path(INSTALLED_TOKENS_FILE)?;

    // User will copy/paste the authorization code from the browser
    let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::Interactive)
        .persist_tokens_to_disk(token_cache_path)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))?;

    Ok(auth)
}

/// Clear cached Google tokens by deleting the token cache files
#[instrument(name = "Clearing auth tokens for Google Sheets", skip_all)]
pub fn clear_tokens() -> Result<()> {
    for filename in [INSTALLED_TOKENS_FILE, SERVICE_ACCOUNT_TOKENS_FILE] {
        let token_path = token_cache_path(filename)?;

        if !token_path.exists() {
            debug!(file = filename, "No cached tokens to clear");
            continue;
        }

        fs::remove_file(&token_path)
            .map_err(|e| AppError::Auth(format!("Failed to delete tokens file: {}", e)))?;
        debug!(file = filename, "Cleared cached tokens");
    }

    Ok(())
}

// Creates the cache directory as a side effect
fn token_cache_path(filename: &str) -> Result<PathBuf> {
    Config::cache_file(filename)
}

//! The Firebase application instance.
//!
//! A [`FirebaseApp`] represents "this process is registered with Firebase under
//! these options". Apps are only created through an [`AppRegistry`], which keeps
//! at most one alive. The service handles hanging off an app are derived lazily,
//! once, and shared by every caller.

pub mod registry;


pub use registry::AppRegistry;

use crate::auth::provider::{AuthFlow, ProviderError};
use crate::auth::{FirebaseAuth, GoogleAuthProvider};
use crate::config::FirebaseOptions;
use crate::core::build_client;
use crate::core::middleware::ApiKeyMiddleware;
use crate::firestore::FirebaseFirestore;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Name of the single app managed by a registry.
pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

const PROJECT_ID_MIN_LEN: usize = 6;
const PROJECT_ID_MAX_LEN: usize = 30;

/// The options were structurally complete but could not produce an app.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("projectId is required to create a Firebase app")]
    MissingProjectId,
    #[error("invalid projectId {0:?}: expected 6-30 lowercase letters, digits or hyphens, starting with a letter")]
    InvalidProjectId(String),
    #[error("apiKey is required to create a Firebase app")]
    MissingApiKey,
    #[error("apiKey must not contain whitespace")]
    InvalidApiKey,
    #[error("invalid authDomain {0:?}: expected a bare host name")]
    InvalidAuthDomain(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub struct FirebaseApp {
    options: FirebaseOptions,
    project_id: String,
    client: ClientWithMiddleware,
    auth: OnceLock<FirebaseAuth>,
    firestore: OnceLock<FirebaseFirestore>,
    google_provider: OnceLock<GoogleAuthProvider>,
}

impl FirebaseApp {
    pub(crate) fn new(options: FirebaseOptions) -> Result<Self, AppError> {
        let project_id = options.project_id.clone().ok_or(AppError::MissingProjectId)?;
        check_project_id(&project_id)?;

        let api_key = options.api_key.as_deref().ok_or(AppError::MissingApiKey)?;
        if api_key.chars().any(char::is_whitespace) {
            return Err(AppError::InvalidApiKey);
        }

        if let Some(domain) = options.auth_domain.as_deref() {
            check_auth_domain(domain)?;
        }

        let client = build_client(ApiKeyMiddleware::new(api_key, options.app_id.clone()))?;

        Ok(Self {
            options,
            project_id,
            client,
            auth: OnceLock::new(),
            firestore: OnceLock::new(),
            google_provider: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        DEFAULT_APP_NAME
    }

    pub fn options(&self) -> &FirebaseOptions {
        &self.options
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The app's Authentication handle. Every call returns the same instance.
    pub fn auth(&self) -> &FirebaseAuth {
        self.auth.get_or_init(|| FirebaseAuth::new(self.client.clone()))
    }

    /// The app's default Firestore database. Every call returns the same instance.
    pub fn firestore(&self) -> &FirebaseFirestore {
        self.firestore
            .get_or_init(|| FirebaseFirestore::new(self.client.clone(), &self.project_id))
    }

    /// The Google sign-in provider descriptor. Every call returns the same instance.
    pub fn google_provider(&self) -> &GoogleAuthProvider {
        self.google_provider.get_or_init(GoogleAuthProvider::new)
    }

    /// URL of the hosted Google sign-in page for this app.
    pub fn google_sign_in_url(&self, flow: AuthFlow, redirect_url: Option<&str>) -> Result<Url, ProviderError> {
        self.google_provider()
            .auth_handler_url(&self.options, self.name(), flow, redirect_url)
    }
}

impl fmt::Debug for FirebaseApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseApp")
            .field("name", &self.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn check_project_id(project_id: &str) -> Result<(), AppError> {
    let len = project_id.len();
    let well_formed = (PROJECT_ID_MIN_LEN..=PROJECT_ID_MAX_LEN).contains(&len)
        && project_id.starts_with(|c: char| c.is_ascii_lowercase())
        && !project_id.ends_with('-')
        && project_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(AppError::InvalidProjectId(project_id.to_string()))
    }
}

fn check_auth_domain(domain: &str) -> Result<(), AppError> {
    let invalid = || AppError::InvalidAuthDomain(domain.to_string());

    let url = Url::parse(&format!("https://{}", domain)).map_err(|_| invalid())?;
    // Hosts come back lowercased.
    let bare_host = url.host_str() == Some(domain.to_ascii_lowercase().as_str())
        && url.port().is_none()
        && url.path() == "/"
        && url.username().is_empty();

    if bare_host {
        Ok(())
    } else {
        Err(invalid())
    }
}

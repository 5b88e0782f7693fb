//! Firebase web-app configuration.
//!
//! The configuration is the same set of values the Firebase console shows for a
//! registered web app. It is normally read from environment variables through an
//! [`EnvSource`], but the console's JSON snippet can be parsed directly too.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use firebase_bootstrap::config::{FirebaseOptions, OptionField};
//!
//! let mut env = HashMap::new();
//! env.insert("FIREBASE_API_KEY", " demo-key ");
//! env.insert("FIREBASE_PROJECT_ID", "demo-project");
//!
//! let options = FirebaseOptions::from_source(&env);
//! assert_eq!(options.api_key.as_deref(), Some("demo-key"));
//! assert!(options.validate(&[OptionField::ApiKey, OptionField::ProjectId]).is_ok());
//! ```

pub mod source;
pub mod validate;


pub use source::{EnvSource, ProcessEnv};
pub use validate::{redact, MissingConfigurationError, PREVIEW_MAX_CHARS};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the environment keys read by [`FirebaseOptions::from_source`].
pub const DEFAULT_ENV_PREFIX: &str = "FIREBASE_";

/// Identifies one field of [`FirebaseOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionField {
    ApiKey,
    AuthDomain,
    ProjectId,
    StorageBucket,
    MessagingSenderId,
    AppId,
    MeasurementId,
}

impl OptionField {
    pub const ALL: [OptionField; 7] = [
        OptionField::ApiKey,
        OptionField::AuthDomain,
        OptionField::ProjectId,
        OptionField::StorageBucket,
        OptionField::MessagingSenderId,
        OptionField::AppId,
        OptionField::MeasurementId,
    ];

    /// Fields that must be present before an app is created, unless overridden
    /// through `InitSettings`.
    pub const REQUIRED: [OptionField; 4] = [
        OptionField::ApiKey,
        OptionField::AuthDomain,
        OptionField::ProjectId,
        OptionField::AppId,
    ];

    /// The field name as it appears in the console's configuration object.
    pub fn name(self) -> &'static str {
        match self {
            OptionField::ApiKey => "apiKey",
            OptionField::AuthDomain => "authDomain",
            OptionField::ProjectId => "projectId",
            OptionField::StorageBucket => "storageBucket",
            OptionField::MessagingSenderId => "messagingSenderId",
            OptionField::AppId => "appId",
            OptionField::MeasurementId => "measurementId",
        }
    }

    /// The environment key for this field, without prefix.
    pub fn env_suffix(self) -> &'static str {
        match self {
            OptionField::ApiKey => "API_KEY",
            OptionField::AuthDomain => "AUTH_DOMAIN",
            OptionField::ProjectId => "PROJECT_ID",
            OptionField::StorageBucket => "STORAGE_BUCKET",
            OptionField::MessagingSenderId => "MESSAGING_SENDER_ID",
            OptionField::AppId => "APP_ID",
            OptionField::MeasurementId => "MEASUREMENT_ID",
        }
    }

    /// Whether the value may only be logged in redacted form.
    pub fn is_sensitive(self) -> bool {
        matches!(self, OptionField::ApiKey | OptionField::AppId)
    }
}

impl fmt::Display for OptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration of a Firebase web app.
///
/// Empty strings never appear in a loaded record: blank values are stored as `None`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl FirebaseOptions {
    /// Reads `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID`, ... from `source`.
    pub fn from_source(source: &impl EnvSource) -> Self {
        Self::from_source_with_prefix(source, DEFAULT_ENV_PREFIX)
    }

    /// Like [`from_source`](Self::from_source), with a different key prefix
    /// (e.g. `NEXT_PUBLIC_FIREBASE_`).
    pub fn from_source_with_prefix(source: &impl EnvSource, prefix: &str) -> Self {
        let read = |field: OptionField| -> Option<String> {
            let key = format!("{}{}", prefix, field.env_suffix());
            source.get(&key).and_then(clean)
        };

        Self {
            api_key: read(OptionField::ApiKey),
            auth_domain: read(OptionField::AuthDomain),
            project_id: read(OptionField::ProjectId),
            storage_bucket: read(OptionField::StorageBucket),
            messaging_sender_id: read(OptionField::MessagingSenderId),
            app_id: read(OptionField::AppId),
            measurement_id: read(OptionField::MeasurementId),
        }
    }

    /// Parses the configuration object copied from the Firebase console.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: FirebaseOptions = serde_json::from_str(json)?;
        Ok(Self {
            api_key: raw.api_key.and_then(clean),
            auth_domain: raw.auth_domain.and_then(clean),
            project_id: raw.project_id.and_then(clean),
            storage_bucket: raw.storage_bucket.and_then(clean),
            messaging_sender_id: raw.messaging_sender_id.and_then(clean),
            app_id: raw.app_id.and_then(clean),
            measurement_id: raw.measurement_id.and_then(clean),
        })
    }

    pub fn get(&self, field: OptionField) -> Option<&str> {
        let value = match field {
            OptionField::ApiKey => &self.api_key,
            OptionField::AuthDomain => &self.auth_domain,
            OptionField::ProjectId => &self.project_id,
            OptionField::StorageBucket => &self.storage_bucket,
            OptionField::MessagingSenderId => &self.messaging_sender_id,
            OptionField::AppId => &self.app_id,
            OptionField::MeasurementId => &self.measurement_id,
        };
        value.as_deref()
    }
}

// Secrets stay out of `{:?}` output.
impl fmt::Debug for FirebaseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseOptions")
            .field("api_key", &self.api_key.as_deref().map(redact))
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id.as_deref().map(redact))
            .field("measurement_id", &self.measurement_id)
            .finish()
    }
}

fn clean(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

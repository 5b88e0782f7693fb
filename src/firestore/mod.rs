//! Cloud Firestore for web clients.
//!
//! Documents are read and written through the Firestore REST API with the app's
//! web API key, so access is governed by the project's security rules. The handle
//! comes from [`FirebaseApp::firestore`](crate::FirebaseApp::firestore).
//!
//! # Examples
//!
//! ```rust,ignore
//! # use firebase_bootstrap::FirebaseApp;
//! # async fn run(app: &FirebaseApp) {
//! let db = app.firestore();
//! let snapshot = db.doc("classifications/run-1").get().await.unwrap();
//! if snapshot.exists() {
//!     let label: Option<String> = snapshot.get_field("result.label").unwrap();
//! }
//! # }
//! ```

pub mod models;
pub mod reference;
pub mod snapshot;

#[cfg(test)]
mod tests;

use self::reference::{CollectionReference, DocumentReference};
use crate::core::{strip_middleware_url, strip_url};
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[source] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[source] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// A document path did not form a valid URL.
    #[error("Invalid document URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// Transport errors lose their URL on the way in, so the `key` query parameter
// never reaches `Display` or `Debug`.
impl From<reqwest::Error> for FirestoreError {
    fn from(error: reqwest::Error) -> Self {
        FirestoreError::RequestError(strip_url(error))
    }
}

impl From<reqwest_middleware::Error> for FirestoreError {
    fn from(error: reqwest_middleware::Error) -> Self {
        FirestoreError::MiddlewareError(strip_middleware_url(error))
    }
}

/// Client for the app's default Firestore database.
#[derive(Clone)]
pub struct FirebaseFirestore {
    client: ClientWithMiddleware,
    base_url: String,
    project_id: String,
}

impl FirebaseFirestore {
    pub(crate) fn new(client: ClientWithMiddleware, project_id: &str) -> Self {
        Self {
            client,
            base_url: FIRESTORE_V1_API.replace("{project_id}", project_id),
            project_id: project_id.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self {
            client,
            base_url,
            project_id: "test-project".to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Gets a `CollectionReference` for the collection at `collection_path`
    /// (e.g. `"users"` or `"users/alice/posts"`).
    pub fn collection(&self, collection_path: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, collection_path.trim_matches('/')),
        }
    }

    /// Gets a `DocumentReference` for the slash-separated `document_path` (e.g. `"users/alice"`).
    pub fn doc(&self, document_path: &str) -> DocumentReference<'_> {
        DocumentReference {
            client: &self.client,
            path: format!("{}/{}", self.base_url, document_path.trim_matches('/')),
        }
    }
}

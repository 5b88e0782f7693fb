//! Firebase Authentication for web clients.
//!
//! Talks to the Identity Toolkit REST API with the app's web API key, the same
//! endpoints the JavaScript client SDK uses. The handle is obtained from
//! [`FirebaseApp::auth`](crate::FirebaseApp::auth) and is shared by every caller.

pub mod models;
pub mod provider;
pub mod token;

#[cfg(test)]
mod tests;

use crate::auth::models::{
    EmailPasswordRequest, LookupRequest, LookupResponse, SendOobCodeRequest, SignInWithIdpRequest,
    UserCredential, UserInfo,
};
use crate::auth::provider::OAuthCredential;
use crate::core::{parse_error_response, strip_middleware_url, strip_url};
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use provider::{AuthFlow, GoogleAuthProvider};

const IDENTITY_TOOLKIT_V1_API: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[source] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[source] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

// Transport errors lose their URL on the way in, so the `key` query parameter
// never reaches `Display` or `Debug`.
impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        AuthError::RequestError(strip_url(error))
    }
}

impl From<reqwest_middleware::Error> for AuthError {
    fn from(error: reqwest_middleware::Error) -> Self {
        AuthError::MiddlewareError(strip_middleware_url(error))
    }
}

#[derive(Clone)]
pub struct FirebaseAuth {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseAuth {
    pub(crate) fn new(client: ClientWithMiddleware) -> Self {
        Self {
            client,
            base_url: IDENTITY_TOOLKIT_V1_API.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn new_with_client(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn call<Req, Resp>(&self, endpoint: &str, request: &Req, failure: &str) -> Result<Resp, AuthError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self.client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::ApiError(parse_error_response(response, failure).await));
        }

        Ok(response.json().await?)
    }

    /// Creates an email/password account and signs it in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<UserCredential, AuthError> {
        let request = EmailPasswordRequest { email, password, return_secure_token: true };
        let credential: UserCredential = self.call("accounts:signUp", &request, "Sign up failed").await?;
        debug!(uid = %credential.local_id, "account created");
        Ok(credential)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserCredential, AuthError> {
        let request = EmailPasswordRequest { email, password, return_secure_token: true };
        self.call("accounts:signInWithPassword", &request, "Sign in failed").await
    }

    /// Exchanges a federated credential (e.g. from [`GoogleAuthProvider::credential`])
    /// for a Firebase session.
    ///
    /// # Arguments
    ///
    /// * `credential` - Tokens issued by the identity provider.
    /// * `request_uri` - The URI the provider redirected back to; `http://localhost` for native apps.
    pub async fn sign_in_with_credential(
        &self,
        credential: &OAuthCredential,
        request_uri: &str,
    ) -> Result<UserCredential, AuthError> {
        let request = SignInWithIdpRequest {
            post_body: credential.post_body(),
            request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        self.call("accounts:signInWithIdp", &request, "Sign in with credential failed").await
    }

    pub async fn send_password_reset_email(&self, email: &str) -> Result<(), AuthError> {
        let request = SendOobCodeRequest { request_type: "PASSWORD_RESET", email };
        let _: serde_json::Value = self
            .call("accounts:sendOobCode", &request, "Send password reset email failed")
            .await?;
        Ok(())
    }

    /// Looks up the account the given ID token belongs to.
    pub async fn get_account_info(&self, id_token: &str) -> Result<UserInfo, AuthError> {
        let request = LookupRequest { id_token };
        let result: LookupResponse = self.call("accounts:lookup", &request, "Get account info failed").await?;

        result.users
            .into_iter()
            .next()
            .ok_or(AuthError::UserNotFound)
    }
}

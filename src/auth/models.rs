use crate::auth::token::{IdTokenClaims, TokenDecodeError};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmailPasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInWithIdpRequest<'a> {
    pub post_body: String,
    pub request_uri: &'a str,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendOobCodeRequest<'a> {
    pub request_type: &'static str,
    pub email: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LookupRequest<'a> {
    pub id_token: &'a str,
}

/// The result of a successful sign-up or sign-in.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds, sent as a decimal string.
    pub expires_in: String,
    pub registered: Option<bool>,
    pub provider_id: Option<String>,
    pub is_new_user: Option<bool>,
}

impl UserCredential {
    /// Lifetime of `id_token` in seconds, if the server sent a parsable value.
    pub fn expires_in_secs(&self) -> Option<i64> {
        self.expires_in.parse().ok()
    }

    /// Decodes the claims carried by `id_token`. The signature is not checked.
    pub fn claims(&self) -> Result<IdTokenClaims, TokenDecodeError> {
        IdTokenClaims::decode(&self.id_token)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct LookupResponse {
    #[serde(default)]
    pub users: Vec<UserInfo>,
}

/// Account data returned by `accounts:lookup`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub local_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub provider_user_info: Vec<ProviderUserInfo>,
    pub created_at: Option<String>,
    pub last_login_at: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUserInfo {
    pub provider_id: String,
    pub federated_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

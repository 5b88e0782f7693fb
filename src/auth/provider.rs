use crate::config::FirebaseOptions;
use std::collections::BTreeMap;
use thiserror::Error;
use url::form_urlencoded;
use url::Url;

pub const GOOGLE_PROVIDER_ID: &str = "google.com";

const DEFAULT_SCOPE: &str = "profile";

// Parameters the OAuth flow sets itself; callers cannot override them.
const RESERVED_PARAMETERS: [&str; 6] = [
    "client_id",
    "response_type",
    "scope",
    "redirect_uri",
    "state",
    "nonce",
];

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authDomain is not configured")]
    MissingAuthDomain,
    #[error("apiKey is not configured")]
    MissingApiKey,
    #[error("Invalid auth handler URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// How the hosted sign-in page hands the result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    Popup,
    Redirect,
}

impl AuthFlow {
    fn as_str(self) -> &'static str {
        match self {
            AuthFlow::Popup => "signInViaPopup",
            AuthFlow::Redirect => "signInViaRedirect",
        }
    }
}

/// Descriptor of the Google federated sign-in provider.
///
/// The descriptor holds no connection; it only describes what to ask Google for
/// and turns Google's tokens into an [`OAuthCredential`] for
/// [`FirebaseAuth::sign_in_with_credential`](crate::auth::FirebaseAuth::sign_in_with_credential).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleAuthProvider {
    scopes: Vec<String>,
    custom_parameters: BTreeMap<String, String>,
}

impl Default for GoogleAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleAuthProvider {
    pub fn new() -> Self {
        Self {
            scopes: vec![DEFAULT_SCOPE.to_string()],
            custom_parameters: BTreeMap::new(),
        }
    }

    pub fn provider_id(&self) -> &'static str {
        GOOGLE_PROVIDER_ID
    }

    /// Requests an additional OAuth scope. Duplicates are ignored.
    pub fn add_scope(&mut self, scope: impl Into<String>) -> &mut Self {
        let scope = scope.into();
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
        self
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Replaces the custom OAuth parameters (e.g. `prompt`, `login_hint`).
    ///
    /// Reserved OAuth parameters are dropped.
    pub fn set_custom_parameters<K, V, I>(&mut self, parameters: I) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.custom_parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| {
                !RESERVED_PARAMETERS
                    .iter()
                    .any(|reserved| reserved.eq_ignore_ascii_case(k))
            })
            .collect();
        self
    }

    pub fn custom_parameters(&self) -> &BTreeMap<String, String> {
        &self.custom_parameters
    }

    /// Wraps tokens obtained from Google into a Firebase credential.
    pub fn credential(id_token: Option<&str>, access_token: Option<&str>) -> OAuthCredential {
        OAuthCredential {
            provider_id: GOOGLE_PROVIDER_ID.to_string(),
            id_token: id_token.map(str::to_string),
            access_token: access_token.map(str::to_string),
        }
    }

    /// Builds the URL of the hosted sign-in handler on the app's auth domain.
    pub fn auth_handler_url(
        &self,
        options: &FirebaseOptions,
        app_name: &str,
        flow: AuthFlow,
        redirect_url: Option<&str>,
    ) -> Result<Url, ProviderError> {
        let auth_domain = options
            .auth_domain
            .as_deref()
            .ok_or(ProviderError::MissingAuthDomain)?;
        let api_key = options.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;

        let mut url = Url::parse(&format!("https://{}/__/auth/handler", auth_domain))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("apiKey", api_key)
                .append_pair("appName", app_name)
                .append_pair("authType", flow.as_str())
                .append_pair("providerId", GOOGLE_PROVIDER_ID)
                .append_pair("scopes", &self.scopes.join(","));

            if let Some(redirect) = redirect_url {
                query.append_pair("redirectUrl", redirect);
            }

            if !self.custom_parameters.is_empty() {
                let params: serde_json::Map<String, serde_json::Value> = self
                    .custom_parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                query.append_pair(
                    "customParameters",
                    &serde_json::Value::Object(params).to_string(),
                );
            }
        }

        Ok(url)
    }
}

/// Tokens from a federated provider, ready to exchange for a Firebase session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredential {
    pub provider_id: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

impl OAuthCredential {
    /// The form-encoded `postBody` expected by `accounts:signInWithIdp`.
    pub fn post_body(&self) -> String {
        let mut body = form_urlencoded::Serializer::new(String::new());
        if let Some(id_token) = &self.id_token {
            body.append_pair("id_token", id_token);
        }
        if let Some(access_token) = &self.access_token {
            body.append_pair("access_token", access_token);
        }
        body.append_pair("providerId", &self.provider_id);
        body.finish()
    }
}

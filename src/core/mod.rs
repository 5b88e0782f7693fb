pub mod middleware;

use middleware::ApiKeyMiddleware;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        format!("{} (code: {})", self.error.message, self.error.code)
    }
}

pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    match response.json::<FirebaseErrorResponse>().await {
        Ok(error_resp) => error_resp.display_message(),
        Err(_) => format!("{}: {}", default_msg, status),
    }
}

/// Drops the request URL from a transport error. Request URLs carry the API key.
pub(crate) fn strip_url(error: reqwest::Error) -> reqwest::Error {
    error.without_url()
}

/// Like [`strip_url`] for errors surfacing through the middleware stack.
pub(crate) fn strip_middleware_url(error: reqwest_middleware::Error) -> reqwest_middleware::Error {
    match error {
        reqwest_middleware::Error::Reqwest(e) => reqwest_middleware::Error::Reqwest(strip_url(e)),
        other => other,
    }
}

/// Builds the retrying, key-stamping HTTP client shared by every handle of one app.
pub(crate) fn build_client(middleware: ApiKeyMiddleware) -> Result<ClientWithMiddleware, reqwest::Error> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);

    let client = ClientBuilder::new(Client::builder().build()?)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .with(middleware)
        .build();

    Ok(client)
}

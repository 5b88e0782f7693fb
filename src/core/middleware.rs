use http::Extensions;
use reqwest::header::HeaderValue;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

const GMPID_HEADER: &str = "x-firebase-gmpid";

/// Attaches the web API key (and the app id, when known) to every outgoing request.
///
/// Firebase web clients authenticate the *project* with the `key` query parameter;
/// user identity, if any, travels separately in request bodies or bearer tokens.
#[derive(Clone)]
pub struct ApiKeyMiddleware {
    api_key: String,
    app_id: Option<String>,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: impl Into<String>, app_id: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_id,
        }
    }
}

#[async_trait::async_trait]
impl Middleware for ApiKeyMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let has_key = req.url().query_pairs().any(|(name, _)| name == "key");
        if !has_key {
            req.url_mut()
                .query_pairs_mut()
                .append_pair("key", &self.api_key);
        }

        if let Some(app_id) = &self.app_id {
            let value = HeaderValue::from_str(app_id).map_err(|e| {
                reqwest_middleware::Error::Middleware(anyhow::anyhow!("Invalid app id header: {}", e))
            })?;
            req.headers_mut().insert(GMPID_HEADER, value);
        }

        next.run(req, extensions).await
    }
}

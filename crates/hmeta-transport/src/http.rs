use std::fmt;

use hmeta_config::GatewayConfig;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::{classify_response, Transport, TransportError};

pub const ADMIN_SECRET_HEADER: &str = "X-Hasura-Admin-Secret";

/// reqwest-backed [`Transport`] for a single metadata endpoint.
///
/// The admin secret is read from config by the caller and passed in; it is
/// never logged.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    admin_secret: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("admin_secret", &"<REDACTED>")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(cfg: &GatewayConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| TransportError::Request(format!("build http client: {e}")))?;

        Ok(Self {
            http,
            url: cfg.url().to_string(),
            admin_secret: cfg.admin_secret().to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post(&self, payload: &Value) -> Result<Vec<u8>, TransportError> {
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        let body = serde_json::to_vec(payload).map_err(|e| TransportError::Encode(e.to_string()))?;

        debug!(request = kind, url = %self.url, "metadata request");

        let resp = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .header(ADMIN_SECRET_HEADER, &self.admin_secret)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("send {kind}: {e}")))?;

        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Request(format!("read {kind} response: {e}")))?;

        let out = classify_response(status, &bytes);
        if let Err(err) = &out {
            debug!(request = kind, status, error = %err, "metadata request rejected");
        }
        out
    }
}

// Palo Alto XML API client (type=op commands, key passed as query parameter).

pub mod commands;
pub mod parse;

use crate::error::{ProbeError, Result};
use crate::version;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct ApplianceClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl ApplianceClient {
    /// Client for `https://<host>`.
    pub fn for_host(host: &str, token: &str, timeout: Duration, verify_tls: bool) -> Result<Self> {
        Self::new(&format!("https://{}", host), token, timeout, verify_tls)
    }

    /// Client for an explicit base URL (scheme + authority, no path).
    pub fn new(base_url: &str, token: &str, timeout: Duration, verify_tls: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .user_agent(format!("{}/{}", version::NAME, version::VERSION))
            .build()
            .map_err(|e| ProbeError::Network(format!("building HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
        })
    }

    /// Runs one operational command and returns the response body once the
    /// `<response status="success">` envelope has been verified.
    #[instrument(skip(self), fields(repo = "appliance", operation = "fetch"))]
    pub async fn fetch(&self, command: &str) -> Result<String> {
        let url = format!("{}/api/", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("type", "op"),
                ("cmd", command),
                ("key", self.token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.network_error(e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "appliance response");

        if !status.is_success() {
            let detail = match parse::response_error(&body) {
                Ok(Some(msg)) => msg,
                _ => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            return Err(ProbeError::ApiRejected(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }
        if let Some(msg) = parse::response_error(&body)? {
            return Err(ProbeError::ApiRejected(msg));
        }
        Ok(body)
    }

    /// The request URL carries the API key, so it is stripped from every message.
    fn network_error(&self, e: reqwest::Error) -> ProbeError {
        if e.is_timeout() {
            ProbeError::Network(format!(
                "no answer from {} within {}s",
                self.base_url,
                self.timeout.as_secs_f64()
            ))
        } else if e.is_connect() {
            ProbeError::Network(format!(
                "cannot connect to {}: {}",
                self.base_url,
                e.without_url()
            ))
        } else {
            ProbeError::Network(e.without_url().to_string())
        }
    }
}

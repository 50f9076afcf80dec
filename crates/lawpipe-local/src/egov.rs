use lawpipe_core::{
    ApiRequest, Error, GatewayFailure, GatewayResponse, LawsGateway, Result, NO_RESULTS_CODE,
};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://laws.e-gov.go.jp/api/2";
pub const CLIENT_USER_AGENT: &str = "LawsAIMCP/1.0";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub fn api_base_from_env() -> Option<String> {
    std::env::var("LAWPIPE_API_BASE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn timeout_ms_from_env() -> u64 {
    // Without an explicit cap a stuck gateway would hang the tool call forever.
    std::env::var("LAWPIPE_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_MS)
        .clamp(1_000, 120_000)
}

/// e-Gov 法令API v2 over HTTP.
#[derive(Debug, Clone)]
pub struct EgovGateway {
    client: reqwest::Client,
    base: String,
    timeout: Duration,
}

impl EgovGateway {
    pub fn new(client: reqwest::Client, base: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client,
            base: base.into(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    pub fn from_env(client: reqwest::Client) -> Self {
        let base = api_base_from_env().unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::new(client, base, timeout_ms_from_env())
    }

    pub fn default_client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| Error::NotConfigured(e.to_string()))
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn timeout_ms(&self) -> u128 {
        self.timeout.as_millis()
    }
}

/// Maps a non-2xx response onto the gateway's error vocabulary.
pub(crate) fn classify_error_status(status: u16, body: Option<&serde_json::Value>) -> GatewayResponse {
    let field = |k: &str| -> Option<String> {
        match body?.get(k)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    if status == 404 && field("code").as_deref() == Some(NO_RESULTS_CODE) {
        return GatewayResponse::NoResults;
    }
    GatewayResponse::Failed(GatewayFailure::http(status, field("message")))
}

#[async_trait::async_trait]
impl LawsGateway for EgovGateway {
    fn name(&self) -> &'static str {
        "egov"
    }

    async fn call(&self, req: &ApiRequest) -> GatewayResponse {
        let url = match req.url(&self.base) {
            Ok(u) => u,
            Err(e) => return GatewayResponse::Failed(GatewayFailure::request_failed(e)),
        };
        tracing::debug!(endpoint = req.endpoint.as_str(), %url, "laws api request");

        let resp = match self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, CLIENT_USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(endpoint = req.endpoint.as_str(), error = %e, "laws api request failed");
                return GatewayResponse::Failed(GatewayFailure::request_failed(e));
            }
        };

        let status = resp.status();
        if status.is_success() {
            return match resp.json::<serde_json::Value>().await {
                Ok(v) => GatewayResponse::Data(v),
                Err(e) => {
                    tracing::warn!(endpoint = req.endpoint.as_str(), error = %e, "laws api body was not json");
                    GatewayResponse::Failed(GatewayFailure::request_failed(e))
                }
            };
        }

        // Error bodies are JSON when the gateway produced them, arbitrary otherwise.
        let body = resp.json::<serde_json::Value>().await.ok();
        let out = classify_error_status(status.as_u16(), body.as_ref());
        if let GatewayResponse::Failed(f) = &out {
            tracing::warn!(
                endpoint = req.endpoint.as_str(),
                code = %f.code,
                detail = f.display_message(),
                "laws api returned an error"
            );
        }
        out
    }
}

//! Backend-agnostic types for lawpipe.
//!
//! This crate contains no IO. It defines the request descriptors sent to the e-Gov
//! law API, the typed shapes returned to tool callers, and the `LawsGateway` trait
//! that concrete HTTP backends implement.

use serde::{Deserialize, Serialize};

pub mod lenient;
pub mod model;
pub mod request;

pub use model::*;
pub use request::{
    encode_path_segment, ApiRequest, KeywordSearchParams, LawDataParams, TitleSearchParams,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("gateway failed: {0}")]
    Gateway(String),
    #[error("analysis failed: {0}")]
    Analysis(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Gateway error code for "search matched nothing" (delivered as HTTP 404).
pub const NO_RESULTS_CODE: &str = "404001";

/// What the gateway handed back for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResponse {
    /// Decoded JSON body. May still carry an `error` marker.
    Data(serde_json::Value),
    /// The gateway reported zero matches (404 + `404001`).
    NoResults,
    Failed(GatewayFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayFailure {
    /// `http_error_<status>` or `request_failed`.
    pub code: String,
    pub message: Option<String>,
}

impl GatewayFailure {
    pub fn http(status: u16, message: Option<String>) -> Self {
        Self {
            code: format!("http_error_{status}"),
            message,
        }
    }

    pub fn request_failed(message: impl ToString) -> Self {
        Self {
            code: "request_failed".to_string(),
            message: Some(message.to_string()),
        }
    }

    /// Message preferred, raw code otherwise.
    pub fn display_message(&self) -> &str {
        self.message.as_deref().unwrap_or(&self.code)
    }
}

impl GatewayResponse {
    /// Returns the failure carried by this response, if any.
    ///
    /// A `Data` body with a top-level `error` key counts as a failure too.
    pub fn error_marker(&self) -> Option<GatewayFailure> {
        match self {
            Self::Failed(f) => Some(f.clone()),
            Self::NoResults => None,
            Self::Data(v) => {
                let err = v.get("error")?;
                let code = match err {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let message = v
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string);
                Some(GatewayFailure { code, message })
            }
        }
    }
}

#[async_trait::async_trait]
pub trait LawsGateway: Send + Sync {
    fn name(&self) -> &'static str;
    async fn call(&self, req: &ApiRequest) -> GatewayResponse;
}

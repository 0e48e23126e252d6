//! HTTP gateway to the analysis backend (`POST /query`).

use crate::error::GatewayError;
use crate::model::{Query, ResultModel, RunConfig};
use crate::presenter::clean;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Anything that can turn a query into a result. The controller only sees this trait.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn send(&self, query: &Query, timeout: Duration) -> Result<ResultModel, GatewayError>;
}

pub struct RequestGateway {
    http: reqwest::Client,
    base_url: String,
}

impl RequestGateway {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }

    async fn exchange(&self, query: &Query) -> Result<ResultModel, GatewayError> {
        let resp = self
            .http
            .post(self.query_url())
            .json(query)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout { timeout_ms: 0 }
            } else {
                GatewayError::Unknown {
                    message: format!("failed to read response body: {e}"),
                }
            }
        })?;

        if !status.is_success() {
            let detail = extract_detail(&body).unwrap_or_else(|| {
                format!("Request failed with status code {}", status.as_u16())
            });
            return Err(GatewayError::Server {
                status_code: status.as_u16(),
                detail,
            });
        }

        serde_json::from_slice::<ResultModel>(&body).map_err(|e| GatewayError::Unknown {
            message: format!("invalid response from backend: {e}"),
        })
    }

    /// Errors from `send()` mean no response was received at all.
    fn classify_send_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout { timeout_ms: 0 }
        } else if e.is_builder() {
            GatewayError::Unknown {
                message: e.to_string(),
            }
        } else {
            GatewayError::Network {
                base_url: self.base_url.clone(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl AnalysisBackend for RequestGateway {
    async fn send(&self, query: &Query, timeout: Duration) -> Result<ResultModel, GatewayError> {
        let timeout_ms = timeout.as_millis() as u64;
        let res = match tokio::time::timeout(timeout, self.exchange(query)).await {
            Ok(res) => res,
            Err(_) => Err(GatewayError::Timeout { timeout_ms }),
        };
        // Inner timeouts don't know the configured bound.
        let res = res.map_err(|e| match e {
            GatewayError::Timeout { .. } => GatewayError::Timeout { timeout_ms },
            GatewayError::Unknown { message } => GatewayError::Unknown {
                message: clean(&message),
            },
            GatewayError::Network { base_url, message } => GatewayError::Network {
                base_url,
                message: clean(&message),
            },
            other => other,
        });
        if let Err(e) = &res {
            tracing::warn!(kind = ?e.kind(), error = %e, "analysis request failed");
        }
        res
    }
}

/// Pull `detail` out of an error body. Non-string details are shown as compact JSON.
fn extract_detail(body: &[u8]) -> Option<String> {
    let v: serde_json::Value = serde_json::from_slice(body).ok()?;
    match v.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(clean(s)),
        other => Some(clean(&other.to_string())),
    }
}

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracker_logging::tracker_trace;

use crate::gate::{augment, ParameterGate};
use crate::{Route, RpcError};

#[derive(Debug, Clone)]
pub struct RpcSettings {
    /// Calculation endpoint, e.g. `https://host/api/RoadNetwork`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl RpcSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Request/response channel to the calculation server.
///
/// Implementations attach the current parameters to `body`; with
/// `api_key_only` only the api key is attached.
#[async_trait::async_trait]
pub trait RpcClient: Send + Sync {
    async fn send(
        &self,
        route: Route,
        body: Option<Value>,
        api_key_only: bool,
    ) -> Result<Value, RpcError>;
}

pub struct ReqwestRpcClient {
    settings: RpcSettings,
    base: reqwest::Url,
    client: reqwest::Client,
    gate: Arc<dyn ParameterGate>,
}

impl ReqwestRpcClient {
    pub fn new(settings: RpcSettings, gate: Arc<dyn ParameterGate>) -> Result<Self, RpcError> {
        let base = reqwest::Url::parse(settings.base_url.trim_end_matches('/'))
            .map_err(|err| RpcError::InvalidUrl(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RpcError::InvalidUrl(settings.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RpcError::Network(err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
            gate,
        })
    }

    pub fn settings(&self) -> &RpcSettings {
        &self.settings
    }

    fn route_url(&self, route: Route) -> reqwest::Url {
        let mut url = self.base.clone();
        if !route.path().is_empty() {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty();
                if route.is_sibling() {
                    segments.pop();
                }
                segments.push(route.path());
            }
        }
        url
    }
}

#[async_trait::async_trait]
impl RpcClient for ReqwestRpcClient {
    async fn send(
        &self,
        route: Route,
        body: Option<Value>,
        api_key_only: bool,
    ) -> Result<Value, RpcError> {
        let params = self.gate.snapshot();
        let payload = augment(body, &params, api_key_only);
        let url = self.route_url(route);
        tracker_trace!("POST {} route={}", url, route);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let text = String::from_utf8_lossy(&bytes);
        classify_response(status.as_u16(), status.is_success(), &text)
    }
}

/// Server errors win over the HTTP status: a 500 carrying `{ "error": .. }`
/// is reported as the server's message.
fn classify_response(status: u16, success: bool, text: &str) -> Result<Value, RpcError> {
    let parsed = if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(text)
    };

    if let Ok(Value::Object(map)) = &parsed {
        if let Some(message) = map.get("error").and_then(Value::as_str) {
            return Err(RpcError::Server(message.to_string()));
        }
    }

    if !success {
        return Err(RpcError::HttpStatus(status));
    }

    parsed.map_err(|err| RpcError::Decode(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> RpcError {
    if err.is_timeout() {
        return RpcError::Timeout;
    }
    RpcError::Network(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::classify_response;
    use crate::RpcError;
    use serde_json::json;

    #[test]
    fn error_body_wins_over_status() {
        assert_eq!(
            classify_response(500, false, r#"{"error":"bad key"}"#),
            Err(RpcError::Server("bad key".to_string()))
        );
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(classify_response(200, true, "  "), Ok(json!(null)));
    }

    #[test]
    fn garbage_body_is_decode_error() {
        assert!(matches!(
            classify_response(200, true, "<html>"),
            Err(RpcError::Decode(_))
        ));
    }

    #[test]
    fn failed_status_without_error_body() {
        assert_eq!(
            classify_response(404, false, "not found"),
            Err(RpcError::HttpStatus(404))
        );
    }
}

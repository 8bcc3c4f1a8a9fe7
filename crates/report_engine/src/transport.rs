use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use report_core::RequestEnvelope;
use report_logging::{report_debug, report_warn};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Url;
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::decode::decode_body;
use crate::{TextReply, TransportError, TransportFailure};

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// Value of the `session_id` cookie, when the session is not carried otherwise.
    pub session_id: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8069".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_bytes: 10 * 1024 * 1024,
            session_id: None,
        }
    }
}

/// Server routes used by the dispatch workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub capability: String,
    pub check: String,
    pub print: String,
    pub workstation_lookup: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            capability: "/report/check_wkhtmltopdf".to_string(),
            check: "/report/check".to_string(),
            print: "/report/print".to_string(),
            workstation_lookup: "/web/dataset/call_kw/printnode.workstation/search_count"
                .to_string(),
        }
    }
}

/// HTTP surface the workflow talks to. Failures are opaque and never retried.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// JSON-RPC style call returning the `result` member.
    async fn rpc(&self, route: &str, params: Value) -> Result<Value, TransportError>;

    /// Form POST whose reply is JSON.
    async fn post_json(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<Value, TransportError>;

    /// Form POST whose reply is kept as text, whatever the status code.
    async fn post_text(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<TextReply, TransportError>;
}

#[derive(Debug)]
pub struct ReqwestTransport {
    settings: TransportSettings,
    base_url: Url,
    client: reqwest::Client,
    next_rpc_id: AtomicU64,
}

struct RawBody {
    status: u16,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| TransportError::new(TransportFailure::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(TransportFailure::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base_url,
            client,
            next_rpc_id: AtomicU64::new(1),
        })
    }

    fn endpoint(&self, route: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(route)
            .map_err(|err| TransportError::new(TransportFailure::InvalidUrl, err.to_string()))
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.post(url);
        match self.settings.session_id.as_deref() {
            Some(session_id) => request.header(COOKIE, format!("session_id={session_id}")),
            None => request,
        }
    }

    fn form_request(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = self.endpoint(route)?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(envelope.form_pairs())
            .finish();
        Ok(self
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<RawBody, TransportError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(Some(content_len)));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(RawBody {
            status,
            content_type,
            bytes,
        })
    }

    fn too_large(&self, actual: Option<u64>) -> TransportError {
        TransportError::new(
            TransportFailure::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual,
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn rpc(&self, route: &str, params: Value) -> Result<Value, TransportError> {
        let id = self.next_rpc_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": params,
            "id": id,
        });
        let request = self
            .post(self.endpoint(route)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());

        report_debug!("rpc id={} route={}", id, route);
        let raw = self.execute(request).await?;
        let mut reply = parse_json_body(&raw)?;

        if let Some(error) = reply.get("error") {
            let message = error
                .pointer("/data/message")
                .or_else(|| error.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("remote call failed");
            return Err(TransportError::new(TransportFailure::Rpc, message));
        }
        Ok(reply
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    async fn post_json(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<Value, TransportError> {
        let raw = self.execute(self.form_request(route, envelope)?).await?;
        parse_json_body(&raw)
    }

    async fn post_text(
        &self,
        route: &str,
        envelope: &RequestEnvelope,
    ) -> Result<TextReply, TransportError> {
        let raw = self.execute(self.form_request(route, envelope)?).await?;
        let body = match decode_body(&raw.bytes, raw.content_type.as_deref()) {
            Ok(decoded) => decoded.text,
            Err(err) => {
                report_warn!("print reply from {} not decodable ({}); using lossy utf-8", route, err);
                String::from_utf8_lossy(&raw.bytes).into_owned()
            }
        };
        Ok(TextReply {
            status: raw.status,
            body,
        })
    }
}

fn parse_json_body(raw: &RawBody) -> Result<Value, TransportError> {
    if !(200..300).contains(&raw.status) {
        return Err(TransportError::new(
            TransportFailure::HttpStatus(raw.status),
            format!("unexpected status {}", raw.status),
        ));
    }
    serde_json::from_slice(&raw.bytes)
        .map_err(|err| TransportError::new(TransportFailure::InvalidResponse, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(TransportFailure::Timeout, err.to_string());
    }
    if err.is_builder() {
        return TransportError::new(TransportFailure::InvalidUrl, err.to_string());
    }
    TransportError::new(TransportFailure::Network, err.to_string())
}

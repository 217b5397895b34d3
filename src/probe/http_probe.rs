use std::time::Instant;

use anyhow::Context;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::config::Config;

/// A single request against the backend.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

impl ProbeRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), token: None, body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a bearer token, if any. `None` leaves the request unauthenticated.
    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Response body as received: JSON when it parses, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return ResponseBody::Empty;
        }
        match serde_json::from_slice::<Value>(bytes) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            ResponseBody::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
            ResponseBody::Text(t) => t.clone(),
            ResponseBody::Empty => "<empty body>".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub method: Method,
    pub url: String,
    pub status: u16,
    pub body: ResponseBody,
    pub elapsed_ms: u64,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Number of items when the body is a JSON array.
    pub fn json_array_len(&self) -> Option<usize> {
        match self.body.as_json() {
            Some(Value::Array(items)) => Some(items.len()),
            _ => None,
        }
    }

    pub fn print(&self) {
        let marker = if self.is_success() { "[+]" } else { "[!]" };
        println!("{} {} {} -> {} ({}ms)", marker, self.method, self.url, self.status, self.elapsed_ms);
        println!("{}", self.body.render());
    }
}

/// Build the outgoing request without sending it.
pub fn build_request(client: &Client, config: &Config, request: &ProbeRequest) -> anyhow::Result<reqwest::Request> {
    let url = config.endpoint(&request.path)?;
    let mut builder = client.request(request.method.clone(), url);
    if let Some(token) = &request.token {
        builder = builder.bearer_auth(token);
    }
    if let Some(body) = &request.body {
        builder = builder.json(body);
    }
    builder.build().context("failed to build request")
}

/// Issue exactly one request and report what came back.
///
/// HTTP error statuses are part of the outcome; only transport failures are `Err`.
pub async fn send(client: &Client, config: &Config, request: &ProbeRequest) -> anyhow::Result<ProbeOutcome> {
    let req = build_request(client, config, request)?;
    let url = req.url().to_string();
    tracing::debug!(method = %request.method, url = %url, auth = request.token.is_some(), "sending probe");

    let start = Instant::now();
    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("request to {} failed", url))?;
    let status = resp.status().as_u16();
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("failed to read response body from {}", url))?;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    tracing::info!(status, url = %url, elapsed_ms, "probe finished");

    Ok(ProbeOutcome {
        method: request.method.clone(),
        url,
        status,
        body: ResponseBody::parse(&bytes),
        elapsed_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> Client {
        crate::http_client::create_client(5).unwrap()
    }

    #[test]
    fn test_bearer_attached_only_when_present() {
        let cfg = Config::default();
        let with = build_request(&client(), &cfg, &ProbeRequest::get("/notifications").bearer(Some("tok"))).unwrap();
        assert_eq!(with.headers().get("authorization").unwrap(), "Bearer tok");

        let without = build_request(&client(), &cfg, &ProbeRequest::get("/notifications").bearer(None)).unwrap();
        assert!(without.headers().get("authorization").is_none());
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let cfg = Config::default();
        let req = build_request(&client(), &cfg, &ProbeRequest::post("/reports").json(json!({"postId": "1"}))).unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.url().as_str(), "http://localhost:3000/reports");
        assert_eq!(req.headers().get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(ResponseBody::parse(b"{\"a\":1}"), ResponseBody::Json(json!({"a": 1})));
        assert_eq!(ResponseBody::parse(b"Unauthorized"), ResponseBody::Text("Unauthorized".into()));
        assert_eq!(ResponseBody::parse(b""), ResponseBody::Empty);
        assert_eq!(ResponseBody::parse(b" \n"), ResponseBody::Empty);
    }
}

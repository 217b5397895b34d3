use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::http_probe::{send, ProbeOutcome, ProbeRequest, ResponseBody};
use crate::config::Config;
use crate::http_client::create_client;

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentBody<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportBody<'a> {
    post_id: &'a str,
    reason: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmitBody<'a> {
    to_user_id: &'a str,
    payload: &'a Value,
}

/// Pull the session token out of a login response body.
///
/// Accepts `token`, `accessToken`, `access_token` at the top level or under `data`.
pub fn extract_token(body: &Value) -> Option<&str> {
    fn lookup(v: &Value) -> Option<&Value> {
        ["token", "accessToken", "access_token"].iter().find_map(|k| v.get(*k))
    }
    lookup(body)
        .or_else(|| body.get("data").and_then(lookup))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

/// Decoded `/admin/posts/public` response.
#[derive(Debug, Clone, PartialEq)]
pub enum PostsShape {
    Posts(Vec<Value>),
    /// Anything that is not a JSON array of posts, kept raw for display.
    Unexpected(ResponseBody),
}

impl PostsShape {
    pub fn decode(body: &ResponseBody) -> Self {
        match body {
            ResponseBody::Json(Value::Array(items)) => PostsShape::Posts(items.clone()),
            other => PostsShape::Unexpected(other.clone()),
        }
    }
}

/// Typed probes for the backend endpoints. Each call issues exactly one request.
pub struct Backend {
    client: Client,
    config: Config,
}

impl Backend {
    pub fn new(config: Config) -> Result<Self> {
        let client = create_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    pub fn with_client(client: Client, config: Config) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn request(&self, request: &ProbeRequest) -> Result<ProbeOutcome> {
        send(&self.client, &self.config, request).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<ProbeOutcome> {
        let body = serde_json::to_value(LoginBody { username, password })?;
        self.request(&ProbeRequest::post("/auth/login").json(body)).await
    }

    pub async fn notifications(&self, token: &str) -> Result<ProbeOutcome> {
        self.request(&ProbeRequest::get("/notifications").bearer(Some(token))).await
    }

    pub async fn all_notifications(&self) -> Result<ProbeOutcome> {
        self.request(&ProbeRequest::get("/notifications/all")).await
    }

    pub async fn comment(&self, post_id: &str, content: &str, token: Option<&str>) -> Result<ProbeOutcome> {
        let body = serde_json::to_value(CommentBody { content })?;
        let path = format!("/posts/{}/comments", urlencoding::encode(post_id));
        self.request(&ProbeRequest::post(path).bearer(token).json(body)).await
    }

    pub async fn like(&self, post_id: &str, token: Option<&str>) -> Result<ProbeOutcome> {
        let path = format!("/posts/{}/like", urlencoding::encode(post_id));
        self.request(&ProbeRequest::post(path).bearer(token)).await
    }

    pub async fn public_posts(&self, token: Option<&str>) -> Result<(ProbeOutcome, PostsShape)> {
        let outcome = self.request(&ProbeRequest::get("/admin/posts/public").bearer(token)).await?;
        let shape = PostsShape::decode(&outcome.body);
        Ok((outcome, shape))
    }

    pub async fn report(&self, post_id: &str, reason: &str, token: Option<&str>) -> Result<ProbeOutcome> {
        let body = serde_json::to_value(ReportBody { post_id, reason })?;
        self.request(&ProbeRequest::post("/reports").bearer(token).json(body)).await
    }

    /// Hit the development-only emitter route. Never authenticated.
    pub async fn emit_notification(&self, to_user_id: &str, payload: &Value) -> Result<ProbeOutcome> {
        let body = serde_json::to_value(EmitBody { to_user_id, payload })?;
        self.request(&ProbeRequest::post("/debug/emit-notif").json(body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_token_variants() {
        assert_eq!(extract_token(&json!({"token": "a"})), Some("a"));
        assert_eq!(extract_token(&json!({"accessToken": "b"})), Some("b"));
        assert_eq!(extract_token(&json!({"data": {"access_token": "c"}})), Some("c"));
        assert_eq!(extract_token(&json!({"token": ""})), None);
        assert_eq!(extract_token(&json!({"error": "bad credentials"})), None);
    }

    #[test]
    fn test_posts_shape_only_accepts_array() {
        let arr = ResponseBody::Json(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(PostsShape::decode(&arr), PostsShape::Posts(vec![json!({"id": 1}), json!({"id": 2})]));

        let wrapped = ResponseBody::Json(json!({"data": [{"id": 1}]}));
        assert!(matches!(PostsShape::decode(&wrapped), PostsShape::Unexpected(_)));
    }

    #[test]
    fn test_report_body_is_camel_case() {
        let v = serde_json::to_value(ReportBody { post_id: "p1", reason: "spam" }).unwrap();
        assert_eq!(v, json!({"postId": "p1", "reason": "spam"}));
    }
}

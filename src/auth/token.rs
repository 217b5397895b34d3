use serde_json::Value;

/// Show only the edges of a bearer token so it can be logged.
pub fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{} ({} chars)", head, tail, chars.len())
}

/// What can be read from a JWT without verifying it.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSummary {
    pub algorithm: String,
    pub subject: Option<String>,
    pub expires_at: Option<i64>,
}

impl TokenSummary {
    /// Decode header and claims of a JWT. Returns `None` for opaque tokens.
    pub fn inspect(token: &str) -> Option<Self> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        let header = decode_segment(parts[0])?;
        let payload = decode_segment(parts[1])?;

        let algorithm = header["alg"].as_str().unwrap_or("unknown").to_string();
        // Backends put the user id under `sub`, `id` or `userId`
        let subject = ["sub", "id", "userId"].iter().find_map(|k| match &payload[*k] {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        Some(Self { algorithm, subject, expires_at: payload["exp"].as_i64() })
    }

    pub fn is_expired(&self, now_unix: i64) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now_unix)
    }
}

fn decode_segment(input: &str) -> Option<Value> {
    use base64::{engine::general_purpose, Engine as _};

    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(input.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

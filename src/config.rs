use anyhow::Context;
use url::Url;

pub const ENV_BASE_URL: &str = "SOCIAL_PROBE_BASE_URL";
pub const ENV_TOKEN: &str = "SOCIAL_PROBE_TOKEN";
pub const ENV_USERNAME: &str = "SOCIAL_PROBE_USERNAME";
pub const ENV_PASSWORD: &str = "SOCIAL_PROBE_PASSWORD";
pub const ENV_TIMEOUT: &str = "SOCIAL_PROBE_TIMEOUT_SECS";

/// Connection settings and secrets for talking to the backend.
///
/// Secrets only ever come from the environment (or an explicit CLI flag),
/// never from literals.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            token: None,
            username: None,
            password: None,
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout_secs = match get(ENV_TIMEOUT).map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => secs,
            Some(_) => {
                tracing::warn!(var = ENV_TIMEOUT, "ignoring invalid timeout, using default");
                defaults.timeout_secs
            }
            None => defaults.timeout_secs,
        };

        Self {
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            token: get(ENV_TOKEN),
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
            timeout_secs,
        }
    }

    pub fn with_overrides(mut self, base_url: Option<String>, token: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        if let Some(secs) = timeout_secs.filter(|s| *s > 0) {
            self.timeout_secs = secs;
        }
        self
    }

    /// Join the base URL and an endpoint path, tolerating slashes on either side.
    pub fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let joined = format!("{}/{}", base, path);
        Url::parse(&joined).with_context(|| format!("invalid endpoint URL: {}", joined))
    }

    pub fn require_token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no bearer token configured (set {} or pass --token)", ENV_TOKEN))
    }

    pub fn require_credentials(&self) -> anyhow::Result<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no username configured (set {})", ENV_USERNAME))?;
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no password configured (set {})", ENV_PASSWORD))?;
        Ok((username, password))
    }
}

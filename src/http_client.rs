use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const USER_AGENT: &str = concat!("social_probe/", env!("CARGO_PKG_VERSION"));

/// Create the HTTP client shared by all probes in one invocation
pub fn create_client(timeout_secs: u64) -> anyhow::Result<Client> {
    let client = ClientBuilder::new()
        // Connection pooling
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_nodelay(true)

        // Timeouts
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_timeout(Duration::from_secs(5))

        .gzip(true)
        .use_rustls_tls()

        // Redirects
        .redirect(reqwest::redirect::Policy::limited(5))

        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(create_client(10).is_ok());
        assert!(create_client(0).is_ok());
    }
}

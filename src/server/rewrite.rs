//! `/public/` prefix stripping for the dev server.
//!
//! The rewrite wraps the whole router so it runs before routing and before
//! every other middleware.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
    Router,
};
use tower::{
    util::{MapRequest, MapRequestLayer},
    Layer,
};

pub const PUBLIC_PREFIX: &str = "/public/";

/// Strip `prefix` from the start of `path`, keeping the leading slash.
///
/// Returns `None` when the path does not start with the prefix.
pub fn strip_prefix_path(path: &str, prefix: &str) -> Option<String> {
    let base = prefix.trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(base)?;
    rest.starts_with('/').then(|| rest.to_string())
}

fn rewritten_uri(uri: &Uri, prefix: &str) -> anyhow::Result<Option<Uri>> {
    let Some(path) = strip_prefix_path(uri.path(), prefix) else {
        return Ok(None);
    };
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Some(Uri::from_parts(parts)?))
}

/// Apply `rewrite` to the request URI. Errors leave the request untouched.
fn rewrite_or_passthrough<B, F>(mut req: Request<B>, rewrite: F) -> Request<B>
where
    F: FnOnce(&Uri) -> anyhow::Result<Option<Uri>>,
{
    match rewrite(req.uri()) {
        Ok(Some(uri)) => {
            tracing::debug!(from = %req.uri(), to = %uri, "rewrote request path");
            *req.uri_mut() = uri;
        }
        Ok(None) => {}
        Err(e) => tracing::debug!(uri = %req.uri(), error = %e, "path rewrite failed, passing request through"),
    }
    req
}

#[derive(Debug, Clone)]
pub struct PrefixRewrite {
    prefix: Arc<str>,
}

impl PrefixRewrite {
    pub fn new(prefix: &str) -> Self {
        Self { prefix: Arc::from(prefix) }
    }

    pub fn apply<B>(&self, req: Request<B>) -> Request<B> {
        rewrite_or_passthrough(req, |uri| rewritten_uri(uri, &self.prefix))
    }
}

impl Default for PrefixRewrite {
    fn default() -> Self {
        Self::new(PUBLIC_PREFIX)
    }
}

/// Wrap `router` so every request passes through the prefix rewrite first.
pub fn with_rewrite(router: Router, prefix: &str) -> MapRequest<Router, impl Fn(Request) -> Request + Clone> {
    let rewrite = PrefixRewrite::new(prefix);
    MapRequestLayer::new(move |req: Request| rewrite.apply(req)).layer(router)
}

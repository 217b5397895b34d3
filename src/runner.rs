use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use crate::cli::{Cli, Commands};
use social_probe::auth::{mask, TokenSummary};
use social_probe::config::Config;
use social_probe::emoji;
use social_probe::probe::{extract_token, Backend, PostsShape, ProbeOutcome, ProbeRequest};
use social_probe::server::{self, NotificationChannel, RealtimeHub, ServerConfig};

fn init_logging(debug: bool, verbose: bool) {
    // Keep external crates (reqwest/hyper) at INFO to avoid flooding the console.
    use tracing_subscriber::EnvFilter;
    let crate_level = if debug { "debug" } else if verbose { "info" } else { "warn" };
    let filter_str = format!(
        "social_probe={level},reqwest=info,hyper=info,h2=info,tower_http={level}",
        level = crate_level
    );
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&filter_str))
        .unwrap_or_else(|_| EnvFilter::new(crate_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_target(false)
        .init();
}

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.debug, cli.verbose);

    let config = Config::from_env().with_overrides(cli.base_url, None, cli.timeout);

    match cli.command {
        Commands::Login => {
            let backend = connect(config)?;
            let (username, password) = backend.config().require_credentials()?;
            let outcome = backend.login(username, password).await?;
            report_login(&outcome);
        }
        Commands::Notifications { token } => {
            let backend = connect(config.with_overrides(None, token, None))?;
            let token = backend.config().require_token()?;
            backend.notifications(token).await?.print();
        }
        Commands::NotificationsAll => {
            let outcome = connect(config)?.all_notifications().await?;
            outcome.print();
            if let Some(count) = outcome.json_array_len() {
                println!("[+] {} notifications", count);
            }
        }
        Commands::Comment { post_id, content, auth } => {
            let backend = connect(config)?;
            let token = optional_token(&backend, auth)?;
            report_content(&backend.comment(&post_id, &content, token).await?, token.is_some());
        }
        Commands::Like { post_id, auth } => {
            let backend = connect(config)?;
            let token = optional_token(&backend, auth)?;
            report_content(&backend.like(&post_id, token).await?, token.is_some());
        }
        Commands::Report { post_id, reason, auth } => {
            let backend = connect(config)?;
            let token = optional_token(&backend, auth)?;
            report_content(&backend.report(&post_id, &reason, token).await?, token.is_some());
        }
        Commands::PublicPosts { auth } => {
            let backend = connect(config)?;
            let token = optional_token(&backend, auth)?;
            let (outcome, shape) = backend.public_posts(token).await?;
            println!("[*] {} {} -> {} ({}ms)", outcome.method, outcome.url, outcome.status, outcome.elapsed_ms);
            match shape {
                PostsShape::Posts(posts) => {
                    println!("[+] {} public posts", posts.len());
                    for post in posts.iter().take(5) {
                        println!("    {}", post);
                    }
                }
                PostsShape::Unexpected(body) => {
                    println!("[!] Response is not a JSON array of posts:");
                    println!("{}", body.render());
                }
            }
        }
        Commands::Emit { to_user_id, payload } => {
            // Plain text is sent as a JSON string rather than rejected.
            let payload = serde_json::from_str::<Value>(&payload).unwrap_or(Value::String(payload));
            connect(config)?.emit_notification(&to_user_id, &payload).await?.print();
        }
        Commands::Request { method, path, body, auth } => {
            let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method: {}", method))?;
            let backend = connect(config)?;
            let token = optional_token(&backend, auth)?;
            let mut request = ProbeRequest::new(method, path).bearer(token);
            if let Some(raw) = body {
                let value: Value = serde_json::from_str(&raw).context("--body must be valid JSON")?;
                request = request.json(value);
            }
            backend.request(&request).await?.print();
        }
        Commands::Emoji { text } => {
            if text.is_empty() {
                emoji::print_matches(emoji::SAMPLES);
            } else {
                let inputs: Vec<&str> = text.iter().map(String::as_str).collect();
                emoji::print_matches(&inputs);
            }
        }
        Commands::Serve { listen, static_dir, no_realtime } => {
            run_server(listen, static_dir, no_realtime).await?;
        }
    }
    Ok(())
}

fn connect(config: Config) -> anyhow::Result<Backend> {
    println!("[*] Backend: {}", config.base_url);
    Backend::new(config)
}

fn optional_token(backend: &Backend, auth: bool) -> anyhow::Result<Option<&str>> {
    if auth {
        backend.config().require_token().map(Some)
    } else {
        Ok(None)
    }
}

fn report_login(outcome: &ProbeOutcome) {
    outcome.print();
    let Some(token) = outcome.body.as_json().and_then(extract_token) else {
        println!("[!] No token in login response");
        return;
    };

    println!("[+] Token: {}", mask(token));
    if let Some(summary) = TokenSummary::inspect(token) {
        println!("    alg: {}", summary.algorithm);
        if let Some(sub) = &summary.subject {
            println!("    subject: {}", sub);
        }
        if let Some(exp) = summary.expires_at {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default();
            let state = if summary.is_expired(now) { "expired" } else { "valid" };
            println!("    exp: {} ({})", exp, state);
        }
    }
}

fn report_content(outcome: &ProbeOutcome, authenticated: bool) {
    outcome.print();
    if outcome.is_auth_failure() {
        let mode = if authenticated { "with" } else { "without" };
        println!("[!] Authorization rejected {} bearer token", mode);
    }
}

async fn run_server(listen: String, static_dir: Option<String>, no_realtime: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        listen_address: listen,
        static_dir: static_dir.map(PathBuf::from),
        ..ServerConfig::default()
    };

    let channel: Option<Arc<dyn NotificationChannel>> = if no_realtime {
        tracing::warn!("starting without a real-time channel");
        None
    } else {
        Some(Arc::new(RealtimeHub::new()))
    };

    println!("[*] Dev server on http://{} (debug routes enabled, do not expose)", config.listen_address);
    server::serve(config, channel).await
}

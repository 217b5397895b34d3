use clap::Parser;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed debug logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Enable verbose logging (global)
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Backend base URL (overrides SOCIAL_PROBE_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides SOCIAL_PROBE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// POST /auth/login with credentials from SOCIAL_PROBE_USERNAME / SOCIAL_PROBE_PASSWORD
    Login,

    /// GET /notifications with the bearer token
    Notifications {
        /// Bearer token (defaults to SOCIAL_PROBE_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// GET /notifications/all
    NotificationsAll,

    /// POST /posts/{id}/comments
    Comment {
        post_id: String,
        content: String,

        /// Attach the configured bearer token
        #[arg(long, default_value_t = false)]
        auth: bool,
    },

    /// POST /posts/{id}/like
    Like {
        post_id: String,

        /// Attach the configured bearer token
        #[arg(long, default_value_t = false)]
        auth: bool,
    },

    /// GET /admin/posts/public
    PublicPosts {
        /// Attach the configured bearer token
        #[arg(long, default_value_t = false)]
        auth: bool,
    },

    /// POST /reports
    Report {
        post_id: String,
        reason: String,

        /// Attach the configured bearer token
        #[arg(long, default_value_t = false)]
        auth: bool,
    },

    /// POST /debug/emit-notif (development servers only, unauthenticated)
    Emit {
        /// Target user id
        to_user_id: String,

        /// Payload as JSON (plain strings are sent as JSON strings)
        payload: String,
    },

    /// Send an arbitrary request and print status and body
    Request {
        /// HTTP method (GET, POST, ...)
        method: String,

        /// Path relative to the base URL, e.g. /notifications
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Attach the configured bearer token
        #[arg(long, default_value_t = false)]
        auth: bool,
    },

    /// Print the first emoji match for each input (or the built-in samples)
    Emoji {
        text: Vec<String>,
    },

    /// Run the development server with the debug emitter and /public/ rewrite
    Serve {
        /// Listen address
        #[arg(short = 'l', long, default_value = "127.0.0.1:5173")]
        listen: String,

        /// Directory served for paths no route handles
        #[arg(long)]
        static_dir: Option<String>,

        /// Start without a real-time channel (emit requests then fail with 500)
        #[arg(long, default_value_t = false)]
        no_realtime: bool,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

pub mod auth;
pub mod config;
pub mod emoji;
pub mod http_client;
pub mod probe;
pub mod server;

// re-export modules used in tests
pub use crate::config::Config;
pub use crate::emoji::{all_emoji, first_emoji};

pub mod endpoints;
pub mod http_probe;

pub use endpoints::{extract_token, Backend, PostsShape};
pub use http_probe::{send, ProbeOutcome, ProbeRequest, ResponseBody};

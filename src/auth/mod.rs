pub mod token;

pub use token::{mask, TokenSummary};

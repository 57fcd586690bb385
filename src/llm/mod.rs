pub mod client;
pub mod oracle;
pub mod prompts;

pub use client::*;
pub use oracle::*;

//! Slack Web API surface: transport, wire types, listing pagination and
//! name resolution.

pub mod client;
pub mod error;
pub mod files;
pub mod resolver;
pub mod types;

pub use client::SlackClient;
pub use error::ApiError;
pub use files::FileListing;
pub use resolver::NameResolver;

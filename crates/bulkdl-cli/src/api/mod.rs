//! API client module
//!
//! REST and GraphQL access to the platform, behind the
//! [`BulkDownloadBackend`] trait the download flow is written against.

pub mod backend;
pub mod client;
pub mod endpoints;
pub mod graphql;
pub mod types;

pub use backend::BulkDownloadBackend;
pub use client::ApiClient;
pub use types::*;

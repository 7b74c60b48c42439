//! bulkdl common library
//!
//! Shared types, logging and error handling for the bulkdl workspace.
//!
//! - **Types**: workflow kinds, workflow entities and entity identifiers
//! - **Logging**: one `tracing` subscriber setup for every binary
//! - **Errors**: parse errors for the shared types
//!
//! # Example
//!
//! ```
//! use bulkdl_common::types::{WorkflowEntity, WorkflowKind};
//!
//! let workflow: WorkflowKind = "consensus-genome".parse().unwrap();
//! let entity: WorkflowEntity = "workflow-runs".parse().unwrap();
//! assert_eq!(workflow.as_str(), "consensus-genome");
//! assert_eq!(entity, WorkflowEntity::WorkflowRuns);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod types;

pub use error::{BulkdlError, Result};
pub use types::{EntityId, WorkflowEntity, WorkflowKind};

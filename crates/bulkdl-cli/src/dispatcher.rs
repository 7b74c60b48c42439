//! Creation dispatcher
//!
//! Turns an assembled request into exactly one platform action, chosen by
//! download type. Failures come back as the message the dialog displays.

use crate::api::backend::BulkDownloadBackend;
use crate::api::types::{ConsensusGenomeOverviewInput, CreateAsyncBulkDownloadInput};
use crate::assembly::AssembledDownloadRequest;
use crate::error::CliError;
use crate::fields::FieldValue;
use crate::registry::strategy_for;
use crate::selection::EntitySelection;
use crate::sinks::{AnalyticsEvent, AnalyticsSink, CsvSink};
use bulkdl_common::WorkflowEntity;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

/// Shown whenever the platform gives no usable message
pub const DEFAULT_CREATION_ERROR: &str = "An unknown error occurred. Please contact us for help.";

pub const CREATION_SUCCESSFUL_EVENT: &str = "BULK_DOWNLOAD_MODAL_BULK_DOWNLOAD_CREATION_SUCCESSFUL";

pub const CONSENSUS_GENOME: &str = "consensus_genome";
pub const CONSENSUS_GENOME_INTERMEDIATE_OUTPUT_FILES: &str = "consensus_genome_intermediate_output_files";
pub const CONSENSUS_GENOME_OVERVIEW: &str = "consensus_genome_overview";
pub const SAMPLE_METADATA: &str = "sample_metadata";

/// Which creation path a download type takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// Generated asynchronously by the federated service
    AsyncConsensusGenome,
    /// Overview rows fetched and saved locally
    ConsensusGenomeOverview,
    /// Sample metadata fetched and saved locally
    SampleMetadata,
    /// Everything else, created through the bulk downloads endpoint
    Generic,
}

impl DownloadKind {
    pub fn classify(download_type: &str) -> Self {
        match download_type {
            CONSENSUS_GENOME | CONSENSUS_GENOME_INTERMEDIATE_OUTPUT_FILES => {
                DownloadKind::AsyncConsensusGenome
            }
            CONSENSUS_GENOME_OVERVIEW => DownloadKind::ConsensusGenomeOverview,
            SAMPLE_METADATA => DownloadKind::SampleMetadata,
            _ => DownloadKind::Generic,
        }
    }
}

/// What a successful creation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    /// The platform is generating the download
    GenerationStarted { download_id: Option<String> },
    /// Rows were saved locally; nothing is generated server-side
    Saved { path: PathBuf },
}

/// A failed creation, carrying the message to display
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CreationError {
    pub message: String,
}

impl CreationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The generic fallback message
    pub fn unknown() -> Self {
        Self::new(DEFAULT_CREATION_ERROR)
    }

    /// The platform's message when it sent one, the fallback otherwise
    pub fn from_server(err: &CliError) -> Self {
        match err.server_message() {
            Some(message) => Self::new(message),
            None => Self::unknown(),
        }
    }
}

pub type CreationResult = std::result::Result<CreationOutcome, CreationError>;

/// Platform and local collaborators used to create downloads
pub struct CreationDispatcher<'a> {
    backend: &'a dyn BulkDownloadBackend,
    csv: &'a dyn CsvSink,
    analytics: &'a dyn AnalyticsSink,
    authenticity_token: String,
}

impl<'a> CreationDispatcher<'a> {
    pub fn new(
        backend: &'a dyn BulkDownloadBackend,
        csv: &'a dyn CsvSink,
        analytics: &'a dyn AnalyticsSink,
    ) -> Self {
        Self {
            backend,
            csv,
            analytics,
            authenticity_token: String::new(),
        }
    }

    pub fn with_authenticity_token(mut self, token: impl Into<String>) -> Self {
        self.authenticity_token = token.into();
        self
    }

    pub async fn dispatch(
        &self,
        request: &AssembledDownloadRequest,
        selection: &EntitySelection,
    ) -> CreationResult {
        let Some(download_type) = request.download_type.as_deref() else {
            return Err(CreationError::unknown());
        };

        let kind = DownloadKind::classify(download_type);
        info!(download_type, ?kind, objects = request.valid_object_ids.len(), "Creating bulk download");

        match kind {
            DownloadKind::AsyncConsensusGenome => self.create_async(request, download_type).await,
            DownloadKind::ConsensusGenomeOverview => {
                self.save_overview(request, download_type).await
            }
            DownloadKind::SampleMetadata => self.save_sample_metadata(request, selection).await,
            DownloadKind::Generic => self.create_generic(request).await,
        }
    }

    async fn create_async(
        &self,
        request: &AssembledDownloadRequest,
        download_type: &str,
    ) -> CreationResult {
        let input = CreateAsyncBulkDownloadInput {
            workflow_run_ids_strings: request.valid_object_ids.clone(),
            download_format: request
                .field_value("download_format")
                .map(ToString::to_string),
            download_type: download_type.to_string(),
            workflow: request.workflow.to_string(),
            authenticity_token: self.authenticity_token.clone(),
        };

        match self.backend.create_async_bulk_download(&input).await {
            Ok(Some(id)) => Ok(CreationOutcome::GenerationStarted {
                download_id: Some(id),
            }),
            Ok(None) => {
                warn!("Async bulk download was not created");
                Err(CreationError::unknown())
            }
            Err(e) => {
                error!(error = %e, "Async bulk download creation failed");
                Err(CreationError::unknown())
            }
        }
    }

    async fn save_overview(
        &self,
        request: &AssembledDownloadRequest,
        download_type: &str,
    ) -> CreationResult {
        let include_metadata = request
            .field_value("include_metadata")
            .and_then(FieldValue::as_bool)
            .unwrap_or(false);

        let input = ConsensusGenomeOverviewInput {
            workflow_run_ids_strings: request.valid_object_ids.clone(),
            include_metadata,
            download_type: download_type.to_string(),
            workflow: request.workflow.to_string(),
            authenticity_token: self.authenticity_token.clone(),
        };

        let rows = match self.backend.consensus_genome_overview(&input).await {
            Ok(Some(rows)) => rows,
            Ok(None) => return Err(CreationError::unknown()),
            Err(e) => {
                error!(error = %e, "Consensus genome overview failed");
                return Err(CreationError::from_server(&e));
            }
        };

        self.save_rows(CONSENSUS_GENOME_OVERVIEW, &rows)
    }

    async fn save_sample_metadata(
        &self,
        request: &AssembledDownloadRequest,
        selection: &EntitySelection,
    ) -> CreationResult {
        let sample_ids = strategy_for(request.workflow)
            .sample_ids_for_metadata(selection, &request.valid_object_ids);

        let response = match self.backend.sample_metadata(&sample_ids).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Sample metadata request failed");
                return Err(CreationError::from_server(&e));
            }
        };

        match response.sample_metadata {
            Some(rows) => self.save_rows(SAMPLE_METADATA, &rows),
            None => {
                let message = response.error.filter(|m| !m.is_empty());
                error!(error = ?message, "Sample metadata missing from response");
                Err(message.map(CreationError::new).unwrap_or_else(CreationError::unknown))
            }
        }
    }

    fn save_rows(&self, stem: &str, rows: &[crate::api::types::CsvRow]) -> CreationResult {
        match self.csv.save(stem, rows) {
            Ok(path) => Ok(CreationOutcome::Saved { path }),
            Err(e) => {
                error!(error = %e, stem, "Saving CSV failed");
                Err(CreationError::new(e.to_string()))
            }
        }
    }

    async fn create_generic(&self, request: &AssembledDownloadRequest) -> CreationResult {
        if let Err(e) = self.backend.create_bulk_download(request).await {
            error!(error = %e, "Bulk download creation failed");
            return Err(CreationError::from_server(&e));
        }

        let ids: Vec<String> = request
            .valid_object_ids
            .iter()
            .map(ToString::to_string)
            .collect();
        let (sample_ids, workflow_run_ids) = match request.workflow_entity {
            WorkflowEntity::Samples => (Some(ids), None),
            WorkflowEntity::WorkflowRuns => (None, Some(ids)),
        };

        self.analytics.track(&AnalyticsEvent {
            name: CREATION_SUCCESSFUL_EVENT,
            workflow: request.workflow.to_string(),
            download_type: request.download_type.clone(),
            sample_ids,
            workflow_run_ids,
        });

        Ok(CreationOutcome::GenerationStarted { download_id: None })
    }
}

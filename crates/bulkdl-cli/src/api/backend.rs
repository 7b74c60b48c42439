//! Platform operations the download flow depends on
//!
//! [`ApiClient`](crate::api::ApiClient) is the production implementation;
//! tests substitute in-memory fakes.

use crate::api::types::*;
use crate::assembly::AssembledDownloadRequest;
use crate::error::Result;
use async_trait::async_trait;
use bulkdl_common::{EntityId, WorkflowKind};

#[async_trait]
pub trait BulkDownloadBackend: Send + Sync {
    /// Download types offered for a workflow
    async fn bulk_download_types(&self, workflow: WorkflowKind)
        -> Result<Vec<DownloadTypeCatalogEntry>>;

    /// Metrics selectable for metric-based downloads
    async fn bulk_download_metrics(&self, workflow: WorkflowKind) -> Result<Vec<MetricOption>>;

    /// Background models the current user can use
    async fn backgrounds(&self) -> Result<Vec<BackgroundOption>>;

    async fn validate_sample_ids(
        &self,
        sample_ids: &[EntityId],
        workflow: WorkflowKind,
    ) -> Result<LegacyValidationResponse>;

    async fn validate_workflow_run_ids(
        &self,
        workflow_run_ids: &[EntityId],
        workflow: WorkflowKind,
    ) -> Result<LegacyValidationResponse>;

    /// Federated `fedWorkflowRuns` lookup
    async fn fed_workflow_runs(&self, workflow_run_ids: &[EntityId])
        -> Result<FederatedValidationResponse>;

    async fn samples_uploaded_by_current_user(&self, sample_ids: &[EntityId])
        -> Result<Option<bool>>;

    async fn workflow_runs_created_by_current_user(
        &self,
        workflow_run_ids: &[EntityId],
    ) -> Result<Option<bool>>;

    async fn user_is_collaborator_on_all_samples(&self, sample_ids: &[EntityId]) -> Result<bool>;

    async fn mass_normalized_backgrounds_available(&self, sample_ids: &[EntityId])
        -> Result<bool>;

    /// `createAsyncBulkDownload` mutation; returns the created download ID if any
    async fn create_async_bulk_download(
        &self,
        input: &CreateAsyncBulkDownloadInput,
    ) -> Result<Option<String>>;

    /// `BulkDownloadCGOverview` query; returns the overview rows if any
    async fn consensus_genome_overview(
        &self,
        input: &ConsensusGenomeOverviewInput,
    ) -> Result<Option<Vec<CsvRow>>>;

    async fn sample_metadata(&self, sample_ids: &[EntityId]) -> Result<SampleMetadataResponse>;

    /// Generic bulk download creation
    async fn create_bulk_download(&self, request: &AssembledDownloadRequest) -> Result<()>;
}

//! In-memory backend for unit tests

use crate::api::backend::BulkDownloadBackend;
use crate::api::types::*;
use crate::assembly::AssembledDownloadRequest;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use bulkdl_common::{EntityId, WorkflowKind};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    pub download_types: Vec<DownloadTypeCatalogEntry>,
    pub legacy_validation: LegacyValidationResponse,
    pub fed_validation: FederatedValidationResponse,
    pub backgrounds: Vec<BackgroundOption>,
    pub metrics: Vec<MetricOption>,
    pub uploaded_by_current_user: Option<bool>,
    pub created_by_current_user: Option<bool>,
    pub collaborator: bool,
    pub mass_normalized: bool,
    pub backgrounds_error: Option<String>,
    pub async_download_id: Option<String>,
    pub async_error: Option<String>,
    pub overview_rows: Option<Vec<CsvRow>>,
    pub overview_error: Option<String>,
    pub sample_metadata: SampleMetadataResponse,
    pub create_error: Option<String>,
    /// Delay applied to the catalog fetch
    pub catalog_delay: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
    pub id_arguments: Mutex<Vec<(String, Vec<EntityId>)>>,
}

impl FakeBackend {
    fn record(&self, call: &str, ids: &[EntityId]) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
        if let Ok(mut args) = self.id_arguments.lock() {
            args.push((call.to_string(), ids.to_vec()));
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    pub fn ids_for(&self, call: &str) -> Option<Vec<EntityId>> {
        self.id_arguments
            .lock()
            .ok()?
            .iter()
            .find(|(c, _)| c == call)
            .map(|(_, ids)| ids.clone())
    }
}

fn server_error(message: &str) -> CliError {
    CliError::Server {
        status: 422,
        message: message.to_string(),
    }
}

#[async_trait]
impl BulkDownloadBackend for FakeBackend {
    async fn bulk_download_types(&self, _workflow: WorkflowKind) -> Result<Vec<DownloadTypeCatalogEntry>> {
        self.record("bulk_download_types", &[]);
        if let Some(delay) = self.catalog_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.download_types.clone())
    }

    async fn bulk_download_metrics(&self, _workflow: WorkflowKind) -> Result<Vec<MetricOption>> {
        self.record("bulk_download_metrics", &[]);
        Ok(self.metrics.clone())
    }

    async fn backgrounds(&self) -> Result<Vec<BackgroundOption>> {
        self.record("backgrounds", &[]);
        match &self.backgrounds_error {
            Some(message) => Err(server_error(message)),
            None => Ok(self.backgrounds.clone()),
        }
    }

    async fn validate_sample_ids(&self, ids: &[EntityId], _workflow: WorkflowKind) -> Result<LegacyValidationResponse> {
        self.record("validate_sample_ids", ids);
        Ok(self.legacy_validation.clone())
    }

    async fn validate_workflow_run_ids(
        &self,
        ids: &[EntityId],
        _workflow: WorkflowKind,
    ) -> Result<LegacyValidationResponse> {
        self.record("validate_workflow_run_ids", ids);
        Ok(self.legacy_validation.clone())
    }

    async fn fed_workflow_runs(&self, ids: &[EntityId]) -> Result<FederatedValidationResponse> {
        self.record("fed_workflow_runs", ids);
        Ok(self.fed_validation.clone())
    }

    async fn samples_uploaded_by_current_user(&self, ids: &[EntityId]) -> Result<Option<bool>> {
        self.record("samples_uploaded_by_current_user", ids);
        Ok(self.uploaded_by_current_user)
    }

    async fn workflow_runs_created_by_current_user(&self, ids: &[EntityId]) -> Result<Option<bool>> {
        self.record("workflow_runs_created_by_current_user", ids);
        Ok(self.created_by_current_user)
    }

    async fn user_is_collaborator_on_all_samples(&self, ids: &[EntityId]) -> Result<bool> {
        self.record("user_is_collaborator_on_all_samples", ids);
        Ok(self.collaborator)
    }

    async fn mass_normalized_backgrounds_available(&self, ids: &[EntityId]) -> Result<bool> {
        self.record("mass_normalized_backgrounds_available", ids);
        Ok(self.mass_normalized)
    }

    async fn create_async_bulk_download(&self, input: &CreateAsyncBulkDownloadInput) -> Result<Option<String>> {
        self.record("create_async_bulk_download", &input.workflow_run_ids_strings);
        match &self.async_error {
            Some(message) => Err(CliError::Graphql(message.clone())),
            None => Ok(self.async_download_id.clone()),
        }
    }

    async fn consensus_genome_overview(&self, input: &ConsensusGenomeOverviewInput) -> Result<Option<Vec<CsvRow>>> {
        self.record("consensus_genome_overview", &input.workflow_run_ids_strings);
        match &self.overview_error {
            Some(message) => Err(CliError::Graphql(message.clone())),
            None => Ok(self.overview_rows.clone()),
        }
    }

    async fn sample_metadata(&self, ids: &[EntityId]) -> Result<SampleMetadataResponse> {
        self.record("sample_metadata", ids);
        Ok(self.sample_metadata.clone())
    }

    async fn create_bulk_download(&self, request: &AssembledDownloadRequest) -> Result<()> {
        self.record("create_bulk_download", &request.valid_object_ids);
        match &self.create_error {
            Some(message) => Err(server_error(message)),
            None => Ok(()),
        }
    }
}

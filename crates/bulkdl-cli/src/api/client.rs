//! HTTP client for the platform's REST and GraphQL endpoints

use crate::api::backend::BulkDownloadBackend;
use crate::api::{endpoints, graphql, types::*};
use crate::assembly::AssembledDownloadRequest;
use crate::config::Config;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use bulkdl_common::{EntityId, WorkflowKind};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Default platform URL when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Default path of the federated GraphQL endpoint.
pub const DEFAULT_GRAPHQL_PATH: &str = "/graphqlfed";

const CSRF_HEADER: &str = "X-CSRF-Token";

/// API client for the platform
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    graphql_path: String,
    auth_token: Option<String>,
}

impl ApiClient {
    /// Create a client with the default timeout and GraphQL path
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::build(
            base_url.into(),
            DEFAULT_GRAPHQL_PATH.to_string(),
            None,
            DEFAULT_API_TIMEOUT_SECS,
        )
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(
            config.server_url.clone(),
            config.graphql_path.clone(),
            config.auth_token.clone(),
            config.timeout_secs,
        )
    }

    fn build(
        base_url: String,
        graphql_path: String,
        auth_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            graphql_path,
            auth_token,
        })
    }

    /// Attach the authenticity token sent with every request
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> &str {
        self.auth_token.as_deref().unwrap_or_default()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(reqwest::header::ACCEPT, "application/json");
        match &self.auth_token {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self.authorize(self.client.get(url)).send().await?;
        read_json(response, url).await
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(url = %url, "POST");
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await?;
        read_json(response, url).await
    }

    /// Run a GraphQL document and return its `data`.
    async fn graphql<V, T>(&self, operation: &str, query: &str, variables: V) -> Result<T>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let url = endpoints::graphql_url(&self.base_url, &self.graphql_path);
        debug!(url = %url, operation, "GraphQL");

        let response = self
            .authorize(self.client.post(&url))
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;
        let envelope: GraphqlResponse<T> = read_json(response, &url).await?;

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            warn!(operation, error = %message, "GraphQL operation returned errors");
            return Err(CliError::Graphql(message));
        }

        envelope
            .data
            .ok_or_else(|| CliError::unexpected_response(operation, "missing data"))
    }
}

/// Decode a JSON body, turning non-2xx statuses into [`CliError::Server`].
async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.trim().to_string()
            }
        });

    warn!(url = %url, status = status.as_u16(), error = %message, "Request failed");
    Err(CliError::Server {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FedWorkflowRunsData {
    fed_workflow_runs: Option<Vec<FedWorkflowRun>>,
}

#[derive(Deserialize)]
struct CreatedDownload {
    id: Option<EntityId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAsyncBulkDownloadData {
    create_async_bulk_download: Option<CreatedDownload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CgOverview {
    cg_overview_rows: Option<Vec<CsvRow>>,
}

#[derive(Deserialize)]
struct CgOverviewData {
    #[serde(rename = "BulkDownloadCGOverview")]
    overview: Option<CgOverview>,
}

#[async_trait]
impl BulkDownloadBackend for ApiClient {
    #[instrument(skip(self))]
    async fn bulk_download_types(
        &self,
        workflow: WorkflowKind,
    ) -> Result<Vec<DownloadTypeCatalogEntry>> {
        let url = endpoints::bulk_download_types_url(&self.base_url, workflow);
        self.get_json(&url).await
    }

    #[instrument(skip(self))]
    async fn bulk_download_metrics(&self, workflow: WorkflowKind) -> Result<Vec<MetricOption>> {
        let url = endpoints::bulk_download_metrics_url(&self.base_url, workflow);
        self.get_json(&url).await
    }

    #[instrument(skip(self))]
    async fn backgrounds(&self) -> Result<Vec<BackgroundOption>> {
        let url = endpoints::backgrounds_url(&self.base_url);
        let response: BackgroundsResponse = self.get_json(&url).await?;

        Ok(response
            .backgrounds
            .unwrap_or_default()
            .into_iter()
            .map(BackgroundOption::from)
            .collect())
    }

    #[instrument(skip(self, sample_ids), fields(count = sample_ids.len()))]
    async fn validate_sample_ids(
        &self,
        sample_ids: &[EntityId],
        workflow: WorkflowKind,
    ) -> Result<LegacyValidationResponse> {
        let url = endpoints::validate_sample_ids_url(&self.base_url);
        let body = ValidateSampleIdsRequest {
            sample_ids,
            workflow: workflow.as_str(),
        };
        self.post_json(&url, &body).await
    }

    #[instrument(skip(self, workflow_run_ids), fields(count = workflow_run_ids.len()))]
    async fn validate_workflow_run_ids(
        &self,
        workflow_run_ids: &[EntityId],
        workflow: WorkflowKind,
    ) -> Result<LegacyValidationResponse> {
        let url = endpoints::validate_workflow_run_ids_url(&self.base_url);
        let body = ValidateWorkflowRunIdsRequest {
            workflow_run_ids,
            workflow: workflow.as_str(),
        };
        self.post_json(&url, &body).await
    }

    #[instrument(skip(self, workflow_run_ids), fields(count = workflow_run_ids.len()))]
    async fn fed_workflow_runs(
        &self,
        workflow_run_ids: &[EntityId],
    ) -> Result<FederatedValidationResponse> {
        let variables = json!({
            "workflowRunIds": workflow_run_ids,
            "authenticityToken": self.auth_token(),
        });
        let data: FedWorkflowRunsData = self
            .graphql(
                "fedWorkflowRuns",
                graphql::VALID_CONSENSUS_GENOME_WORKFLOW_RUNS_QUERY,
                variables,
            )
            .await?;

        Ok(FederatedValidationResponse {
            fed_workflow_runs: data.fed_workflow_runs,
            error: None,
        })
    }

    async fn samples_uploaded_by_current_user(
        &self,
        sample_ids: &[EntityId],
    ) -> Result<Option<bool>> {
        let url = endpoints::uploaded_by_current_user_url(&self.base_url);
        let response: UploadedByCurrentUserResponse =
            self.post_json(&url, &SampleIdsRequest { sample_ids }).await?;
        Ok(response.uploaded_by_current_user)
    }

    async fn workflow_runs_created_by_current_user(
        &self,
        workflow_run_ids: &[EntityId],
    ) -> Result<Option<bool>> {
        let url = endpoints::created_by_current_user_url(&self.base_url);
        let response: CreatedByCurrentUserResponse = self
            .post_json(&url, &WorkflowRunIdsRequest { workflow_run_ids })
            .await?;
        Ok(response.created_by_current_user)
    }

    async fn user_is_collaborator_on_all_samples(&self, sample_ids: &[EntityId]) -> Result<bool> {
        let url = endpoints::user_is_collaborator_url(&self.base_url);
        let response: UserIsCollaboratorResponse =
            self.post_json(&url, &SampleIdsRequest { sample_ids }).await?;
        Ok(response.user_is_collaborator)
    }

    async fn mass_normalized_backgrounds_available(
        &self,
        sample_ids: &[EntityId],
    ) -> Result<bool> {
        let url = endpoints::mass_normalized_availability_url(&self.base_url);
        let response: MassNormalizedAvailabilityResponse =
            self.post_json(&url, &SampleIdsRequest { sample_ids }).await?;
        Ok(response.mass_normalized_backgrounds_available)
    }

    #[instrument(skip(self, input), fields(download_type = %input.download_type))]
    async fn create_async_bulk_download(
        &self,
        input: &CreateAsyncBulkDownloadInput,
    ) -> Result<Option<String>> {
        let data: CreateAsyncBulkDownloadData = self
            .graphql(
                "createAsyncBulkDownload",
                graphql::CREATE_ASYNC_BULK_DOWNLOAD_MUTATION,
                input,
            )
            .await?;

        Ok(data
            .create_async_bulk_download
            .and_then(|created| created.id)
            .map(|id| id.to_string()))
    }

    #[instrument(skip(self, input), fields(count = input.workflow_run_ids_strings.len()))]
    async fn consensus_genome_overview(
        &self,
        input: &ConsensusGenomeOverviewInput,
    ) -> Result<Option<Vec<CsvRow>>> {
        let data: CgOverviewData = self
            .graphql(
                "BulkDownloadCGOverview",
                graphql::CONSENSUS_GENOME_OVERVIEW_QUERY,
                input,
            )
            .await?;

        Ok(data.overview.and_then(|o| o.cg_overview_rows))
    }

    #[instrument(skip(self, sample_ids), fields(count = sample_ids.len()))]
    async fn sample_metadata(&self, sample_ids: &[EntityId]) -> Result<SampleMetadataResponse> {
        let url = endpoints::sample_metadata_url(&self.base_url);
        self.post_json(&url, &SampleIdsRequest { sample_ids }).await
    }

    #[instrument(skip(self, request), fields(download_type = ?request.download_type))]
    async fn create_bulk_download(&self, request: &AssembledDownloadRequest) -> Result<()> {
        let url = endpoints::bulk_downloads_url(&self.base_url);
        let _created: serde_json::Value = self.post_json(&url, request).await?;
        Ok(())
    }
}

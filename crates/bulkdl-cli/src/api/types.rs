//! API request and response types
//!
//! Mirrors the JSON the platform's REST and GraphQL endpoints exchange.

use crate::fields::FieldValue;
use bulkdl_common::EntityId;
use serde::{Deserialize, Serialize};

/// One downloadable artifact kind as returned by the types endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadTypeCatalogEntry {
    #[serde(rename = "type")]
    pub type_name: String,

    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type_display: Option<String>,

    /// Configurable fields in display order
    #[serde(default)]
    pub fields: Vec<CatalogField>,

    /// Only the uploader of every selected object may request it
    #[serde(default)]
    pub uploader_only: bool,

    #[serde(default)]
    pub admin_only: bool,

    #[serde(default)]
    pub hide_in_creation_modal: bool,
}

impl DownloadTypeCatalogEntry {
    pub fn field(&self, field_type: &str) -> Option<&CatalogField> {
        self.fields.iter().find(|f| f.field_type == field_type)
    }
}

/// A configurable field of a download type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogField {
    #[serde(rename = "type")]
    pub field_type: String,

    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldDefault>,
}

/// Default value pre-selected for a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefault {
    pub value: FieldValue,
    pub display_name: String,
}

/// Metric selectable for metric-based downloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricOption {
    pub text: String,
    pub value: String,
}

/// Background model as stored by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Background {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub mass_normalized: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackgroundsResponse {
    #[serde(default)]
    pub backgrounds: Option<Vec<Background>>,
}

/// Background model as offered in the download options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundOption {
    pub text: String,
    pub value: u64,
    pub mass_normalized: bool,
}

impl From<Background> for BackgroundOption {
    fn from(background: Background) -> Self {
        Self {
            text: background.name,
            value: background.id,
            mass_normalized: background.mass_normalized,
        }
    }
}

/// Response of the legacy sample / workflow-run validation endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyValidationResponse {
    #[serde(default)]
    pub valid_ids: Vec<EntityId>,

    #[serde(default)]
    pub invalid_sample_names: Vec<String>,

    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSampleIdsRequest<'a> {
    pub sample_ids: &'a [EntityId],
    pub workflow: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateWorkflowRunIdsRequest<'a> {
    pub workflow_run_ids: &'a [EntityId],
    pub workflow: &'a str,
}

/// Lifecycle status of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowRunStatus {
    Created,
    Running,
    Succeeded,
    SucceededWithIssue,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Workflow run as returned by the federated `fedWorkflowRuns` query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FedWorkflowRun {
    pub id: EntityId,

    #[serde(default)]
    pub owner_user_id: Option<u64>,

    pub status: WorkflowRunStatus,
}

/// Federated validation payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedValidationResponse {
    #[serde(default)]
    pub fed_workflow_runs: Option<Vec<FedWorkflowRun>>,

    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleIdsRequest<'a> {
    pub sample_ids: &'a [EntityId],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRunIdsRequest<'a> {
    pub workflow_run_ids: &'a [EntityId],
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedByCurrentUserResponse {
    pub uploaded_by_current_user: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedByCurrentUserResponse {
    pub created_by_current_user: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserIsCollaboratorResponse {
    pub user_is_collaborator: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MassNormalizedAvailabilityResponse {
    pub mass_normalized_backgrounds_available: bool,
}

/// One row of tabular data returned for client-side CSV materialization
pub type CsvRow = Vec<serde_json::Value>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleMetadataResponse {
    #[serde(default)]
    pub sample_metadata: Option<Vec<CsvRow>>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Variables of the `createAsyncBulkDownload` mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsyncBulkDownloadInput {
    pub workflow_run_ids_strings: Vec<EntityId>,
    pub download_format: Option<String>,
    pub download_type: String,
    pub workflow: String,
    pub authenticity_token: String,
}

/// Variables of the `BulkDownloadCGOverview` query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusGenomeOverviewInput {
    pub workflow_run_ids_strings: Vec<EntityId>,
    pub include_metadata: bool,
    pub download_type: String,
    pub workflow: String,
    pub authenticity_token: String,
}

/// Standard GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

/// Error body the REST endpoints send with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

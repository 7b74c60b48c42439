//! Initial fetch-and-validate pass of a download dialog
//!
//! Six independent requests run concurrently. Either all of them succeed and
//! the dialog receives one [`LoadedOptions`], or the first failure is
//! returned and nothing is applied.

use crate::api::backend::BulkDownloadBackend;
use crate::api::types::{BackgroundOption, DownloadTypeCatalogEntry, MetricOption};
use crate::error::Result;
use crate::fields::SelectedFields;
use crate::registry::{strategy_for, ValidationRequest, ValidationResult};
use crate::selection::EntitySelection;
use bulkdl_common::WorkflowEntity;
use tracing::{debug, info};

/// Everything the options view needs, resolved at once
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedOptions {
    pub download_types: Vec<DownloadTypeCatalogEntry>,
    pub validation: ValidationResult,
    pub backgrounds: Vec<BackgroundOption>,
    pub metrics: Vec<MetricOption>,
    /// Current user uploaded (or created) every selected object
    pub all_objects_owned_by_current_user: bool,
    pub collaborator_on_all_samples: bool,
    /// Incoming selections with catalog defaults seeded in
    pub selected_fields: SelectedFields,
}

/// Collaborator status only applies to sample selections.
async fn check_collaborator_on_all_samples(
    backend: &dyn BulkDownloadBackend,
    selection: &EntitySelection,
) -> Result<bool> {
    if selection.is_empty() || selection.workflow_entity == WorkflowEntity::WorkflowRuns {
        return Ok(false);
    }
    backend.user_is_collaborator_on_all_samples(&selection.ids).await
}

pub async fn fetch_options_and_validate(
    backend: &dyn BulkDownloadBackend,
    selection: &EntitySelection,
    selected_fields: &SelectedFields,
) -> Result<LoadedOptions> {
    let strategy = strategy_for(selection.workflow);
    debug!(
        workflow = %selection.workflow,
        entity = %selection.workflow_entity,
        objects = selection.ids.len(),
        strategy = strategy.name(),
        "Fetching download options"
    );

    let request = ValidationRequest {
        entity_ids: &selection.ids,
        workflow: selection.workflow,
        workflow_entity: selection.workflow_entity,
    };

    let (download_types, raw_validation, backgrounds, metrics, uploaded_by_current_user, collaborator) = tokio::try_join!(
        backend.bulk_download_types(selection.workflow),
        strategy.fetch_validation_info(backend, request),
        backend.backgrounds(),
        backend.bulk_download_metrics(selection.workflow),
        strategy.fetch_are_all_objects_uploaded_by_current_user(backend, &selection.ids),
        check_collaborator_on_all_samples(backend, selection),
    )?;

    let validation = strategy.parse_validation(&raw_validation, selection);
    let owner = strategy.parse_is_user_owner(
        &raw_validation,
        selection.current_user_id,
        uploaded_by_current_user,
    );

    info!(
        download_types = download_types.len(),
        valid = validation.valid_ids.len(),
        invalid = validation.invalid_sample_names.len(),
        "Download options loaded"
    );

    Ok(LoadedOptions {
        selected_fields: selected_fields.with_defaults(&download_types),
        download_types,
        validation,
        backgrounds,
        metrics,
        all_objects_owned_by_current_user: owner,
        collaborator_on_all_samples: collaborator,
    })
}

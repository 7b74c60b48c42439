//! Download dialog session
//!
//! [`BulkDownloadDialog`] holds everything one dialog session knows: the
//! selection it was opened with, the options resolved by the initial load,
//! the user's field choices and the creation status. It is driven by one
//! task through `&mut self`; only the initial load fans out.
//!
//! Dropping a pending [`BulkDownloadDialog::load`] or
//! [`BulkDownloadDialog::submit`] future drops its in-flight requests. The
//! dialog is borrowed for as long as the future lives, so no late result can
//! be applied after the caller gave up on it.

use crate::api::backend::BulkDownloadBackend;
use crate::api::types::DownloadTypeCatalogEntry;
use crate::assembly::{AssembledDownloadRequest, AssemblyCache};
use crate::dispatcher::{CreationDispatcher, CreationOutcome};
use crate::error::Result;
use crate::fields::{FieldValue, SelectedFields};
use crate::heatmap;
use crate::options::{self, Permissions, HOST_GENE_COUNTS};
use crate::orchestrator::{fetch_options_and_validate, LoadedOptions};
use crate::selection::EntitySelection;
use crate::sinks::UrlOpener;
use bulkdl_common::EntityId;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Loading state of the options
#[derive(Debug, Clone, PartialEq)]
pub enum DialogPhase {
    Loading,
    Ready,
    /// The initial load failed; nothing was applied
    Failed(String),
}

/// Status of the start-download action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CreateStatus {
    #[default]
    Idle,
    WaitingForCreate,
    /// The dialog is done and can close
    Success(CreationOutcome),
    /// Shown to the user; submitting again is allowed
    Error(String),
}

/// Account facts not returned by the load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserContext {
    pub is_admin: bool,
    pub max_samples_original_files: Option<usize>,
}

#[derive(Debug)]
pub struct BulkDownloadDialog {
    session_id: Uuid,
    selection: EntitySelection,
    user: UserContext,
    phase: DialogPhase,
    options: Option<LoadedOptions>,
    selected_fields: SelectedFields,
    selected_download_type: Option<String>,
    mass_normalized_available: Option<bool>,
    create_status: CreateStatus,
    assembly: AssemblyCache,
}

impl BulkDownloadDialog {
    pub fn new(selection: EntitySelection) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            selection,
            user: UserContext::default(),
            phase: DialogPhase::Loading,
            options: None,
            selected_fields: SelectedFields::new(),
            selected_download_type: None,
            mass_normalized_available: None,
            create_status: CreateStatus::Idle,
            assembly: AssemblyCache::new(),
        }
    }

    pub fn with_user(mut self, user: UserContext) -> Self {
        self.user = user;
        self
    }

    /// Start from earlier choices; catalog defaults never replace them.
    pub fn with_selected_fields(mut self, selected_fields: SelectedFields) -> Self {
        self.selected_fields = selected_fields;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn selection(&self) -> &EntitySelection {
        &self.selection
    }

    pub fn phase(&self) -> &DialogPhase {
        &self.phase
    }

    pub fn options(&self) -> Option<&LoadedOptions> {
        self.options.as_ref()
    }

    pub fn selected_fields(&self) -> &SelectedFields {
        &self.selected_fields
    }

    pub fn selected_download_type(&self) -> Option<&str> {
        self.selected_download_type.as_deref()
    }

    pub fn mass_normalized_available(&self) -> Option<bool> {
        self.mass_normalized_available
    }

    pub fn create_status(&self) -> &CreateStatus {
        &self.create_status
    }

    /// Run the initial fetch-and-validate pass.
    ///
    /// Only the first completed call does anything; later calls return the
    /// phase as it is.
    pub async fn load(&mut self, backend: &dyn BulkDownloadBackend) -> &DialogPhase {
        if self.phase != DialogPhase::Loading {
            debug!(session = %self.session_id, "Options already loaded");
            return &self.phase;
        }

        match fetch_options_and_validate(backend, &self.selection, &self.selected_fields).await {
            Ok(mut loaded) => {
                self.selected_fields = std::mem::take(&mut loaded.selected_fields);
                self.options = Some(loaded);
                self.phase = DialogPhase::Ready;
            }
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "Loading download options failed");
                let message = e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string());
                self.phase = DialogPhase::Failed(message);
            }
        }

        &self.phase
    }

    /// Whether mass-normalized backgrounds can be offered for the selection.
    ///
    /// Independent of [`load`](Self::load); may run before or after it.
    pub async fn refresh_background_availability(
        &mut self,
        backend: &dyn BulkDownloadBackend,
    ) -> Result<Option<bool>> {
        if self.selection.is_empty() {
            return Ok(None);
        }
        let available = backend
            .mass_normalized_backgrounds_available(&self.selection.ids)
            .await?;
        self.mass_normalized_available = Some(available);
        Ok(self.mass_normalized_available)
    }

    pub fn download_types(&self) -> &[DownloadTypeCatalogEntry] {
        self.options
            .as_ref()
            .map(|o| o.download_types.as_slice())
            .unwrap_or_default()
    }

    pub fn selected_entry(&self) -> Option<&DownloadTypeCatalogEntry> {
        let selected = self.selected_download_type.as_deref()?;
        self.download_types().iter().find(|t| t.type_name == selected)
    }

    pub fn valid_ids(&self) -> &[EntityId] {
        self.options
            .as_ref()
            .map(|o| o.validation.valid_ids.as_slice())
            .unwrap_or_default()
    }

    pub fn invalid_sample_names(&self) -> Vec<&str> {
        self.options
            .as_ref()
            .map(|o| options::trimmed_invalid_sample_names(&o.validation.invalid_sample_names))
            .unwrap_or_default()
    }

    /// Error reported by the validator itself, if any
    pub fn validation_error(&self) -> Option<&str> {
        self.options.as_ref()?.validation.error.as_deref()
    }

    /// Valid objects whose host is human
    pub fn human_host_ids(&self) -> Vec<EntityId> {
        let valid = self.valid_ids();
        self.selection
            .objects
            .iter()
            .filter(|o| valid.contains(&o.id) && o.has_human_host())
            .map(|o| o.id.clone())
            .collect()
    }

    /// IDs the download is created for
    pub fn submission_ids(&self) -> Vec<EntityId> {
        if self.selected_download_type.as_deref() == Some(HOST_GENE_COUNTS) {
            self.human_host_ids()
        } else {
            self.valid_ids().to_vec()
        }
    }

    pub fn permissions(&self) -> Permissions {
        let loaded = self.options.as_ref();
        Permissions {
            is_admin: self.user.is_admin,
            uploaded_all_objects: loaded.is_some_and(|o| o.all_objects_owned_by_current_user),
            collaborator_on_all_samples: loaded.is_some_and(|o| o.collaborator_on_all_samples),
            max_samples_original_files: self.user.max_samples_original_files,
        }
    }

    pub fn disabled_reason(&self, entry: &DownloadTypeCatalogEntry) -> Option<String> {
        options::disabled_reason(
            entry,
            &self.permissions(),
            self.valid_ids().len(),
            self.selection.workflow.object_label(),
        )
    }

    /// Select a download type.
    ///
    /// Picking a different type clears a previous creation error. Types the
    /// user may not request are refused with the reason.
    pub fn select_download_type(&mut self, download_type: &str) -> std::result::Result<(), String> {
        if self.selected_download_type.as_deref() == Some(download_type) {
            return Ok(());
        }
        if let Some(entry) = self.download_types().iter().find(|t| t.type_name == download_type) {
            if let Some(reason) = self.disabled_reason(entry) {
                return Err(reason);
            }
        }

        debug!(session = %self.session_id, download_type, "Download type selected");
        self.create_status = CreateStatus::Idle;
        self.selected_download_type = Some(download_type.to_string());
        Ok(())
    }

    /// Apply a field-select event. `None` unsets the field.
    ///
    /// Conditional fields that depend on this one are unset when the new
    /// value no longer requires them.
    pub fn select_field(
        &mut self,
        download_type: &str,
        field: &str,
        value: Option<FieldValue>,
        display_name: Option<String>,
    ) {
        let resets = options::conditional_fields_to_reset(download_type, field, value.as_ref());
        let mut next = self
            .selected_fields
            .apply_selection(download_type, field, value, display_name);
        for reset in resets {
            next = next.without_field(download_type, reset);
        }
        self.selected_fields = next;
    }

    /// Request for the current state; equal state yields the same `Arc`.
    pub fn assembled_request(&mut self) -> Arc<AssembledDownloadRequest> {
        let ids = self.submission_ids();
        self.assembly.assemble(
            self.selected_download_type.as_deref(),
            &self.selected_fields,
            &ids,
            self.selection.workflow,
            self.selection.workflow_entity,
        )
    }

    /// Whether the start button is enabled
    pub fn can_submit(&self) -> bool {
        if self.phase != DialogPhase::Ready {
            return false;
        }
        if matches!(
            self.create_status,
            CreateStatus::WaitingForCreate | CreateStatus::Error(_)
        ) {
            return false;
        }
        let download_type = self.selected_download_type.as_deref();
        options::is_selected_download_valid(
            self.selected_entry(),
            download_type.and_then(|t| self.selected_fields.for_type(t)),
            self.valid_ids().len(),
            self.human_host_ids().len(),
        )
    }

    /// Create the selected download.
    ///
    /// Types missing from the loaded catalog are refused without contacting
    /// the platform. After an error the status stays `Error` until the user
    /// submits again or picks another type.
    pub async fn submit(&mut self, dispatcher: &CreationDispatcher<'_>) -> &CreateStatus {
        if self.create_status == CreateStatus::WaitingForCreate {
            return &self.create_status;
        }

        let Some(download_type) = self.selected_download_type.clone() else {
            self.create_status = CreateStatus::Error("Select a download type first.".to_string());
            return &self.create_status;
        };
        if self.selected_entry().is_none() {
            warn!(session = %self.session_id, %download_type, "Refusing unknown download type");
            self.create_status = CreateStatus::Error(format!(
                "Unknown download type '{}' for this selection.",
                download_type
            ));
            return &self.create_status;
        }

        // a failed attempt may be retried as is
        if matches!(self.create_status, CreateStatus::Error(_)) {
            self.create_status = CreateStatus::Idle;
        }
        if !self.can_submit() {
            self.create_status = CreateStatus::Error(
                "The selected download is missing required options or has no valid objects."
                    .to_string(),
            );
            return &self.create_status;
        }

        self.create_status = CreateStatus::WaitingForCreate;
        let request = self.assembled_request();

        self.create_status = match dispatcher.dispatch(&request, &self.selection).await {
            Ok(outcome) => {
                info!(session = %self.session_id, %download_type, ?outcome, "Bulk download created");
                CreateStatus::Success(outcome)
            }
            Err(e) => CreateStatus::Error(e.message),
        };
        &self.create_status
    }

    /// Heatmap link for the current BIOM selections
    pub fn heatmap_url(&self, base_url: &str) -> String {
        heatmap::heatmap_url(base_url, &self.selected_fields, self.valid_ids())
    }

    pub fn open_heatmap(&self, base_url: &str, opener: &dyn UrlOpener) -> Result<()> {
        opener.open_url(&self.heatmap_url(base_url))
    }
}

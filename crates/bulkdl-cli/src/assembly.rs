//! Assembly of the final download request from the dialog state

use crate::fields::{FieldValue, SelectedFields};
use bulkdl_common::{EntityId, WorkflowEntity, WorkflowKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Field as sent to the creation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    pub value: FieldValue,
    pub display_name: FieldValue,
}

/// Request built when the user starts a download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledDownloadRequest {
    pub download_type: Option<String>,
    pub fields: BTreeMap<String, ResolvedField>,
    pub valid_object_ids: Vec<EntityId>,
    pub workflow: WorkflowKind,
    pub workflow_entity: WorkflowEntity,
}

impl AssembledDownloadRequest {
    pub fn field_value(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).map(|f| &f.value)
    }
}

/// Build the request for `download_type` from the current selections.
///
/// Without a download type the field map is empty. A field without a display
/// name (or with an empty one) displays as its value.
pub fn assemble_selected_download(
    download_type: Option<&str>,
    selected: &SelectedFields,
    object_ids: &[EntityId],
    workflow: WorkflowKind,
    workflow_entity: WorkflowEntity,
) -> AssembledDownloadRequest {
    let fields = download_type
        .and_then(|t| selected.for_type(t))
        .map(|for_type| {
            for_type
                .iter()
                .map(|(name, selection)| {
                    let display_name = match selection.display_name.as_deref() {
                        Some(display) if !display.is_empty() => FieldValue::Text(display.to_string()),
                        _ => selection.value.clone(),
                    };
                    let resolved = ResolvedField {
                        value: selection.value.clone(),
                        display_name,
                    };
                    (name.clone(), resolved)
                })
                .collect()
        })
        .unwrap_or_default();

    AssembledDownloadRequest {
        download_type: download_type.map(str::to_string),
        fields,
        valid_object_ids: object_ids.to_vec(),
        workflow,
        workflow_entity,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct AssemblyKey {
    download_type: Option<String>,
    selected: SelectedFields,
    object_ids: Vec<EntityId>,
    workflow: WorkflowKind,
    workflow_entity: WorkflowEntity,
}

/// Remembers the most recent assembly.
///
/// Equal arguments return the same `Arc` without rebuilding; any change
/// replaces the single cached entry.
#[derive(Debug, Default)]
pub struct AssemblyCache {
    last: Option<(AssemblyKey, Arc<AssembledDownloadRequest>)>,
    computations: usize,
}

impl AssemblyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assemble(
        &mut self,
        download_type: Option<&str>,
        selected: &SelectedFields,
        object_ids: &[EntityId],
        workflow: WorkflowKind,
        workflow_entity: WorkflowEntity,
    ) -> Arc<AssembledDownloadRequest> {
        if let Some((key, request)) = &self.last {
            if key.download_type.as_deref() == download_type
                && &key.selected == selected
                && key.object_ids == object_ids
                && key.workflow == workflow
                && key.workflow_entity == workflow_entity
            {
                return Arc::clone(request);
            }
        }

        let request = Arc::new(assemble_selected_download(
            download_type,
            selected,
            object_ids,
            workflow,
            workflow_entity,
        ));
        self.computations += 1;
        self.last = Some((
            AssemblyKey {
                download_type: download_type.map(str::to_string),
                selected: selected.clone(),
                object_ids: object_ids.to_vec(),
                workflow,
                workflow_entity,
            },
            Arc::clone(&request),
        ));
        request
    }

    /// How many times the request was actually rebuilt
    pub fn computations(&self) -> usize {
        self.computations
    }
}

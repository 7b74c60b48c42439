//! The objects a user selected before opening the download dialog

use bulkdl_common::{EntityId, WorkflowEntity, WorkflowKind};
use serde::{Deserialize, Serialize};

/// Host genome name that qualifies a sample for host gene counts
pub const HUMAN_HOST_GENOME: &str = "Human";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRef {
    pub id: EntityId,
    pub name: String,
}

/// A selected row: a sample, or a workflow run together with its sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedObject {
    pub id: EntityId,
    pub sample: SampleRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_genome: Option<String>,
}

impl SelectedObject {
    pub fn new(id: impl Into<EntityId>, sample_id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sample: SampleRef {
                id: sample_id.into(),
                name: name.into(),
            },
            host_genome: None,
        }
    }

    pub fn with_host_genome(mut self, host_genome: impl Into<String>) -> Self {
        self.host_genome = Some(host_genome.into());
        self
    }

    pub fn has_human_host(&self) -> bool {
        self.host_genome.as_deref() == Some(HUMAN_HOST_GENOME)
    }
}

/// Everything the dialog is opened with. Read-only for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySelection {
    pub workflow: WorkflowKind,
    #[serde(default)]
    pub workflow_entity: WorkflowEntity,
    /// Selected IDs in selection order, without duplicates
    pub ids: Vec<EntityId>,
    /// Row details for the selected IDs, when known
    #[serde(default)]
    pub objects: Vec<SelectedObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<u64>,
}

impl EntitySelection {
    pub fn new(workflow: WorkflowKind, workflow_entity: WorkflowEntity) -> Self {
        Self {
            workflow,
            workflow_entity,
            ids: Vec::new(),
            objects: Vec::new(),
            current_user_id: None,
        }
    }

    pub fn with_ids<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        for id in ids {
            let id = id.into();
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self
    }

    /// Add row details; their IDs join the selection too.
    pub fn with_objects(mut self, objects: impl IntoIterator<Item = SelectedObject>) -> Self {
        for object in objects {
            if !self.ids.contains(&object.id) {
                self.ids.push(object.id.clone());
            }
            self.objects.push(object);
        }
        self
    }

    pub fn with_current_user(mut self, user_id: Option<u64>) -> Self {
        self.current_user_id = user_id;
        self
    }

    pub fn object(&self, id: &EntityId) -> Option<&SelectedObject> {
        self.objects.iter().find(|o| &o.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

//! Domain types shared by every bulkdl crate

use crate::error::BulkdlError;
use serde::{Deserialize, Serialize};

/// Analysis pipeline a sample or workflow run belongs to.
///
/// The wire names match the identifiers the platform API expects in the
/// `workflow` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowKind {
    #[serde(rename = "short-read-mngs")]
    ShortReadMngs,
    #[serde(rename = "long-read-mngs")]
    LongReadMngs,
    #[serde(rename = "consensus-genome")]
    ConsensusGenome,
    #[serde(rename = "amr")]
    Amr,
    #[serde(rename = "amr-deprecated")]
    AmrDeprecated,
    #[serde(rename = "benchmark")]
    Benchmark,
}

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 6] = [
        WorkflowKind::ShortReadMngs,
        WorkflowKind::LongReadMngs,
        WorkflowKind::ConsensusGenome,
        WorkflowKind::Amr,
        WorkflowKind::AmrDeprecated,
        WorkflowKind::Benchmark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowKind::ShortReadMngs => "short-read-mngs",
            WorkflowKind::LongReadMngs => "long-read-mngs",
            WorkflowKind::ConsensusGenome => "consensus-genome",
            WorkflowKind::Amr => "amr",
            WorkflowKind::AmrDeprecated => "amr-deprecated",
            WorkflowKind::Benchmark => "benchmark",
        }
    }

    /// Human label for the objects a download of this workflow is made of.
    pub fn object_label(&self) -> &'static str {
        match self {
            WorkflowKind::ConsensusGenome => "consensus genome",
            WorkflowKind::Benchmark => "benchmark",
            _ => "sample",
        }
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowKind {
    type Err = BulkdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        WorkflowKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| BulkdlError::UnknownWorkflow(s.to_string()))
    }
}

/// Whether the selected objects are samples or workflow runs.
///
/// Decides which ID space the selection lives in and which validation
/// endpoint applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkflowEntity {
    #[default]
    #[serde(rename = "Samples")]
    Samples,
    #[serde(rename = "Workflow Runs")]
    WorkflowRuns,
}

impl WorkflowEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowEntity::Samples => "Samples",
            WorkflowEntity::WorkflowRuns => "Workflow Runs",
        }
    }
}

impl std::fmt::Display for WorkflowEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowEntity {
    type Err = BulkdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "samples" | "sample" => Ok(WorkflowEntity::Samples),
            "workflow runs" | "workflow run" | "runs" => Ok(WorkflowEntity::WorkflowRuns),
            _ => Err(BulkdlError::UnknownWorkflowEntity(s.to_string())),
        }
    }
}

/// Opaque identifier of a sample or workflow run.
///
/// The API sends these as numbers in some responses and strings in others;
/// both deserialize into the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(id) => EntityId(id),
            Raw::Number(id) => EntityId(id.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_kind_parsing() {
        assert_eq!(
            "consensus-genome".parse::<WorkflowKind>().unwrap(),
            WorkflowKind::ConsensusGenome
        );
        assert_eq!(
            "short_read_mngs".parse::<WorkflowKind>().unwrap(),
            WorkflowKind::ShortReadMngs
        );
        assert!("metagenomics".parse::<WorkflowKind>().is_err());
    }

    #[test]
    fn test_workflow_kind_wire_name() {
        let json = serde_json::to_string(&WorkflowKind::AmrDeprecated).unwrap();
        assert_eq!(json, "\"amr-deprecated\"");
        for kind in WorkflowKind::ALL {
            assert_eq!(kind.as_str().parse::<WorkflowKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_workflow_entity_parsing() {
        assert_eq!(
            "workflow-runs".parse::<WorkflowEntity>().unwrap(),
            WorkflowEntity::WorkflowRuns
        );
        assert_eq!("Samples".parse::<WorkflowEntity>().unwrap(), WorkflowEntity::Samples);
        assert_eq!(
            serde_json::to_string(&WorkflowEntity::WorkflowRuns).unwrap(),
            "\"Workflow Runs\""
        );
    }

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[12, "34"]"#).unwrap();
        assert_eq!(ids, vec![EntityId::from(12u64), EntityId::new("34")]);
        assert_eq!(serde_json::to_string(&ids[0]).unwrap(), "\"12\"");
    }
}

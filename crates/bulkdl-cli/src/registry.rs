//! Workflow config registry
//!
//! Each workflow validates its selection through one [`ValidationStrategy`].
//! Legacy workflows ask the REST validators, which already split the
//! selection into valid IDs and invalid sample names. Consensus genome runs
//! live in the federated service: the client receives raw run records and
//! decides validity and ownership itself.
//!
//! Call sites never branch on the workflow; they go through [`strategy_for`].

use crate::api::backend::BulkDownloadBackend;
use crate::api::types::{
    FederatedValidationResponse, LegacyValidationResponse, WorkflowRunStatus,
};
use crate::error::Result;
use crate::selection::EntitySelection;
use async_trait::async_trait;
use bulkdl_common::{EntityId, WorkflowEntity, WorkflowKind};
use serde::{Deserialize, Serialize};

/// Arguments of a validation fetch
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub entity_ids: &'a [EntityId],
    pub workflow: WorkflowKind,
    pub workflow_entity: WorkflowEntity,
}

/// Validation payload in whichever shape the strategy fetched it
#[derive(Debug, Clone, PartialEq)]
pub enum RawValidationResponse {
    /// Nothing was selected, nothing was asked
    Empty,
    Legacy(LegacyValidationResponse),
    Federated(FederatedValidationResponse),
}

/// Canonical validation outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid_ids: Vec<EntityId>,
    pub invalid_sample_names: Vec<String>,
    pub error: Option<String>,
}

impl ValidationResult {
    fn unexpected(strategy: &str) -> Self {
        Self {
            error: Some(format!("Unexpected validation response for the {} strategy", strategy)),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait ValidationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the current user uploaded (or created) every selected object.
    async fn fetch_are_all_objects_uploaded_by_current_user(
        &self,
        backend: &dyn BulkDownloadBackend,
        entity_ids: &[EntityId],
    ) -> Result<Option<bool>>;

    async fn fetch_validation_info(
        &self,
        backend: &dyn BulkDownloadBackend,
        request: ValidationRequest<'_>,
    ) -> Result<RawValidationResponse>;

    fn parse_validation(
        &self,
        raw: &RawValidationResponse,
        selection: &EntitySelection,
    ) -> ValidationResult;

    fn parse_is_user_owner(
        &self,
        raw: &RawValidationResponse,
        current_user_id: Option<u64>,
        all_uploaded_by_current_user: Option<bool>,
    ) -> bool;

    /// Sample IDs behind the validated objects, for sample metadata downloads.
    fn sample_ids_for_metadata(
        &self,
        selection: &EntitySelection,
        valid_ids: &[EntityId],
    ) -> Vec<EntityId>;
}

/// REST validators that return the canonical shape directly
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyValidationStrategy;

#[async_trait]
impl ValidationStrategy for LegacyValidationStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn fetch_are_all_objects_uploaded_by_current_user(
        &self,
        backend: &dyn BulkDownloadBackend,
        entity_ids: &[EntityId],
    ) -> Result<Option<bool>> {
        if entity_ids.is_empty() {
            return Ok(None);
        }
        backend.samples_uploaded_by_current_user(entity_ids).await
    }

    async fn fetch_validation_info(
        &self,
        backend: &dyn BulkDownloadBackend,
        request: ValidationRequest<'_>,
    ) -> Result<RawValidationResponse> {
        if request.entity_ids.is_empty() {
            return Ok(RawValidationResponse::Empty);
        }

        let response = match request.workflow_entity {
            WorkflowEntity::WorkflowRuns => {
                backend
                    .validate_workflow_run_ids(request.entity_ids, request.workflow)
                    .await?
            }
            WorkflowEntity::Samples => {
                backend
                    .validate_sample_ids(request.entity_ids, request.workflow)
                    .await?
            }
        };

        Ok(RawValidationResponse::Legacy(response))
    }

    fn parse_validation(
        &self,
        raw: &RawValidationResponse,
        _selection: &EntitySelection,
    ) -> ValidationResult {
        match raw {
            RawValidationResponse::Empty => ValidationResult::default(),
            RawValidationResponse::Legacy(response) => ValidationResult {
                valid_ids: response.valid_ids.clone(),
                invalid_sample_names: response.invalid_sample_names.clone(),
                error: response.error.clone(),
            },
            RawValidationResponse::Federated(_) => ValidationResult::unexpected(self.name()),
        }
    }

    fn parse_is_user_owner(
        &self,
        _raw: &RawValidationResponse,
        _current_user_id: Option<u64>,
        all_uploaded_by_current_user: Option<bool>,
    ) -> bool {
        all_uploaded_by_current_user.unwrap_or(false)
    }

    fn sample_ids_for_metadata(
        &self,
        _selection: &EntitySelection,
        valid_ids: &[EntityId],
    ) -> Vec<EntityId> {
        valid_ids.to_vec()
    }
}

/// Federated run lookup; validity and ownership are decided client-side
#[derive(Debug, Default, Clone, Copy)]
pub struct FederatedValidationStrategy;

#[async_trait]
impl ValidationStrategy for FederatedValidationStrategy {
    fn name(&self) -> &'static str {
        "federated"
    }

    async fn fetch_are_all_objects_uploaded_by_current_user(
        &self,
        backend: &dyn BulkDownloadBackend,
        entity_ids: &[EntityId],
    ) -> Result<Option<bool>> {
        if entity_ids.is_empty() {
            return Ok(None);
        }
        backend.workflow_runs_created_by_current_user(entity_ids).await
    }

    async fn fetch_validation_info(
        &self,
        backend: &dyn BulkDownloadBackend,
        request: ValidationRequest<'_>,
    ) -> Result<RawValidationResponse> {
        let response = backend.fed_workflow_runs(request.entity_ids).await?;
        Ok(RawValidationResponse::Federated(response))
    }

    fn parse_validation(
        &self,
        raw: &RawValidationResponse,
        selection: &EntitySelection,
    ) -> ValidationResult {
        let response = match raw {
            RawValidationResponse::Federated(response) => response,
            RawValidationResponse::Empty => return ValidationResult::default(),
            RawValidationResponse::Legacy(_) => return ValidationResult::unexpected(self.name()),
        };

        let runs = response.fed_workflow_runs.as_deref().unwrap_or_default();
        let (valid, invalid): (Vec<_>, Vec<_>) = runs
            .iter()
            .partition(|run| run.status == WorkflowRunStatus::Succeeded);

        ValidationResult {
            valid_ids: valid.into_iter().map(|run| run.id.clone()).collect(),
            invalid_sample_names: invalid
                .into_iter()
                .map(|run| {
                    selection
                        .object(&run.id)
                        .map(|o| o.sample.name.clone())
                        .unwrap_or_default()
                })
                .collect(),
            error: response.error.clone(),
        }
    }

    fn parse_is_user_owner(
        &self,
        raw: &RawValidationResponse,
        current_user_id: Option<u64>,
        _all_uploaded_by_current_user: Option<bool>,
    ) -> bool {
        let Some(user_id) = current_user_id else {
            return false;
        };
        let RawValidationResponse::Federated(response) = raw else {
            return false;
        };
        let Some(runs) = &response.fed_workflow_runs else {
            return false;
        };

        runs.iter().all(|run| run.owner_user_id == Some(user_id))
    }

    fn sample_ids_for_metadata(
        &self,
        selection: &EntitySelection,
        valid_ids: &[EntityId],
    ) -> Vec<EntityId> {
        selection
            .objects
            .iter()
            .filter(|o| valid_ids.contains(&o.id))
            .map(|o| o.sample.id.clone())
            .collect()
    }
}

static LEGACY: LegacyValidationStrategy = LegacyValidationStrategy;
static FEDERATED: FederatedValidationStrategy = FederatedValidationStrategy;

static REGISTRY: [(WorkflowKind, &dyn ValidationStrategy); 6] = [
    (WorkflowKind::ShortReadMngs, &LEGACY),
    (WorkflowKind::LongReadMngs, &LEGACY),
    (WorkflowKind::ConsensusGenome, &FEDERATED),
    (WorkflowKind::Amr, &LEGACY),
    (WorkflowKind::AmrDeprecated, &LEGACY),
    (WorkflowKind::Benchmark, &LEGACY),
];

/// Strategy registered for a workflow
pub fn strategy_for(workflow: WorkflowKind) -> &'static dyn ValidationStrategy {
    REGISTRY
        .iter()
        .find(|(kind, _)| *kind == workflow)
        .map(|(_, strategy)| *strategy)
        .unwrap_or(&LEGACY)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::types::FedWorkflowRun;
    use crate::selection::SelectedObject;

    fn run(id: &str, status: WorkflowRunStatus, owner: Option<u64>) -> FedWorkflowRun {
        FedWorkflowRun {
            id: EntityId::new(id),
            owner_user_id: owner,
            status,
        }
    }

    fn federated(runs: Vec<FedWorkflowRun>) -> RawValidationResponse {
        RawValidationResponse::Federated(FederatedValidationResponse {
            fed_workflow_runs: Some(runs),
            error: None,
        })
    }

    fn cg_selection() -> EntitySelection {
        EntitySelection::new(WorkflowKind::ConsensusGenome, WorkflowEntity::WorkflowRuns)
            .with_objects([
                SelectedObject::new("r1", "s1", "sample one"),
                SelectedObject::new("r2", "s2", "sample two"),
                SelectedObject::new("r3", "s3", "sample three"),
            ])
    }

    #[test]
    fn test_registry_dispatch() {
        assert_eq!(strategy_for(WorkflowKind::ConsensusGenome).name(), "federated");
        for kind in WorkflowKind::ALL {
            if kind != WorkflowKind::ConsensusGenome {
                assert_eq!(strategy_for(kind).name(), "legacy", "{kind}");
            }
        }
    }

    #[test]
    fn test_federated_counts_succeeded_runs() {
        let raw = federated(vec![
            run("r1", WorkflowRunStatus::Succeeded, Some(1)),
            run("r2", WorkflowRunStatus::Failed, Some(1)),
            run("r3", WorkflowRunStatus::Running, Some(1)),
        ]);

        let result = FederatedValidationStrategy.parse_validation(&raw, &cg_selection());
        assert_eq!(result.valid_ids, vec![EntityId::new("r1")]);
        assert_eq!(result.invalid_sample_names, vec!["sample two", "sample three"]);
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_federated_unknown_run_has_empty_name() {
        let raw = federated(vec![run("r9", WorkflowRunStatus::Failed, None)]);
        let result = FederatedValidationStrategy.parse_validation(&raw, &cg_selection());
        assert_eq!(result.invalid_sample_names, vec![String::new()]);
    }

    #[test]
    fn test_valid_and_invalid_are_disjoint() {
        let raw = federated(vec![
            run("r1", WorkflowRunStatus::Succeeded, Some(1)),
            run("r2", WorkflowRunStatus::SucceededWithIssue, Some(1)),
            run("r3", WorkflowRunStatus::Succeeded, Some(1)),
        ]);
        let selection = cg_selection();
        let result = FederatedValidationStrategy.parse_validation(&raw, &selection);

        for id in &result.valid_ids {
            let name = &selection.object(id).unwrap().sample.name;
            assert!(!result.invalid_sample_names.contains(name));
        }
        assert_eq!(result.valid_ids.len() + result.invalid_sample_names.len(), 3);
    }

    #[test]
    fn test_federated_ownership() {
        let raw = federated(vec![
            run("r1", WorkflowRunStatus::Succeeded, Some(42)),
            run("r2", WorkflowRunStatus::Failed, Some(42)),
        ]);
        let strategy = FederatedValidationStrategy;

        assert!(strategy.parse_is_user_owner(&raw, Some(42), None));
        assert!(!strategy.parse_is_user_owner(&raw, Some(7), Some(true)));
        assert!(!strategy.parse_is_user_owner(&raw, None, Some(true)));

        let mixed = federated(vec![
            run("r1", WorkflowRunStatus::Succeeded, Some(42)),
            run("r2", WorkflowRunStatus::Succeeded, None),
        ]);
        assert!(!strategy.parse_is_user_owner(&mixed, Some(42), None));
    }

    #[test]
    fn test_legacy_parsing_and_ownership() {
        let raw = RawValidationResponse::Legacy(LegacyValidationResponse {
            valid_ids: vec![EntityId::from(1u64), EntityId::from(2u64)],
            invalid_sample_names: vec!["still running".to_string()],
            error: None,
        });
        let selection = EntitySelection::new(WorkflowKind::ShortReadMngs, WorkflowEntity::Samples);
        let strategy = LegacyValidationStrategy;

        let result = strategy.parse_validation(&raw, &selection);
        assert_eq!(result.valid_ids.len(), 2);
        assert_eq!(result.invalid_sample_names, vec!["still running"]);

        assert!(strategy.parse_is_user_owner(&raw, None, Some(true)));
        assert!(!strategy.parse_is_user_owner(&raw, Some(1), None));
        assert_eq!(
            strategy.parse_validation(&RawValidationResponse::Empty, &selection),
            ValidationResult::default()
        );
    }

    #[test]
    fn test_mismatched_payload_reports_error() {
        let selection = cg_selection();
        let legacy = RawValidationResponse::Legacy(LegacyValidationResponse::default());
        let result = FederatedValidationStrategy.parse_validation(&legacy, &selection);
        assert!(result.error.is_some());
        assert!(result.valid_ids.is_empty());
    }

    #[test]
    fn test_sample_ids_for_metadata() {
        let selection = cg_selection();
        let valid = vec![EntityId::new("r1"), EntityId::new("r3")];

        assert_eq!(
            FederatedValidationStrategy.sample_ids_for_metadata(&selection, &valid),
            vec![EntityId::new("s1"), EntityId::new("s3")]
        );
        assert_eq!(LegacyValidationStrategy.sample_ids_for_metadata(&selection, &valid), valid);
    }
}

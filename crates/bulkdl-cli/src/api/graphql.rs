//! GraphQL documents sent to the federated endpoint

pub const VALID_CONSENSUS_GENOME_WORKFLOW_RUNS_QUERY: &str = r#"
query BulkDownloadModalValidConsensusGenomeWorkflowRunsQuery(
  $workflowRunIds: [String]
  $authenticityToken: String
) {
  fedWorkflowRuns(
    input: {
      where: { id: { _in: $workflowRunIds } }
      todoRemove: { authenticityToken: $authenticityToken }
    }
  ) {
    id
    ownerUserId
    status
  }
}
"#;

pub const CREATE_ASYNC_BULK_DOWNLOAD_MUTATION: &str = r#"
mutation BulkDownloadModalMutation(
  $workflowRunIdsStrings: [String]
  $downloadFormat: String
  $downloadType: String!
  $workflow: String!
  $authenticityToken: String!
) {
  createAsyncBulkDownload(
    input: {
      workflowRunIdsStrings: $workflowRunIdsStrings
      downloadFormat: $downloadFormat
      downloadType: $downloadType
      workflow: $workflow
      authenticityToken: $authenticityToken
    }
  ) {
    id
  }
}
"#;

pub const CONSENSUS_GENOME_OVERVIEW_QUERY: &str = r#"
query BulkDownloadModalQuery(
  $workflowRunIdsStrings: [String]
  $includeMetadata: Boolean!
  $downloadType: String!
  $workflow: String!
  $authenticityToken: String!
) {
  BulkDownloadCGOverview(
    input: {
      workflowRunIdsStrings: $workflowRunIdsStrings
      includeMetadata: $includeMetadata
      downloadType: $downloadType
      workflow: $workflow
      authenticityToken: $authenticityToken
    }
  ) {
    cgOverviewRows
  }
}
"#;

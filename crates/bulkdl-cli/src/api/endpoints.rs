//! API endpoint URL builders

use bulkdl_common::WorkflowKind;

pub fn bulk_download_types_url(base_url: &str, workflow: WorkflowKind) -> String {
    format!(
        "{}/bulk_downloads/types.json?workflow={}",
        base_url,
        urlencoding::encode(workflow.as_str())
    )
}

pub fn bulk_download_metrics_url(base_url: &str, workflow: WorkflowKind) -> String {
    format!(
        "{}/bulk_downloads/metrics.json?workflow={}",
        base_url,
        urlencoding::encode(workflow.as_str())
    )
}

pub fn bulk_downloads_url(base_url: &str) -> String {
    format!("{}/bulk_downloads", base_url)
}

pub fn sample_metadata_url(base_url: &str) -> String {
    format!("{}/bulk_downloads/sample_metadata", base_url)
}

pub fn backgrounds_url(base_url: &str) -> String {
    format!("{}/backgrounds.json", base_url)
}

pub fn validate_sample_ids_url(base_url: &str) -> String {
    format!("{}/samples/validate_sample_ids", base_url)
}

pub fn validate_workflow_run_ids_url(base_url: &str) -> String {
    format!("{}/workflow_runs/validate_workflow_run_ids", base_url)
}

pub fn uploaded_by_current_user_url(base_url: &str) -> String {
    format!("{}/samples/uploaded_by_current_user", base_url)
}

pub fn created_by_current_user_url(base_url: &str) -> String {
    format!("{}/workflow_runs/created_by_current_user", base_url)
}

pub fn user_is_collaborator_url(base_url: &str) -> String {
    format!("{}/samples/user_is_collaborator.json", base_url)
}

pub fn mass_normalized_availability_url(base_url: &str) -> String {
    format!("{}/samples/enable_mass_normalized_backgrounds.json", base_url)
}

/// GraphQL endpoint; `path` comes from configuration and may omit the slash.
pub fn graphql_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_urls_carry_workflow() {
        assert_eq!(
            bulk_download_types_url("http://localhost:3000", WorkflowKind::ConsensusGenome),
            "http://localhost:3000/bulk_downloads/types.json?workflow=consensus-genome"
        );
        assert_eq!(
            bulk_download_metrics_url("http://localhost:3000", WorkflowKind::ShortReadMngs),
            "http://localhost:3000/bulk_downloads/metrics.json?workflow=short-read-mngs"
        );
    }

    #[test]
    fn test_graphql_url_normalizes_slash() {
        assert_eq!(
            graphql_url("http://localhost:3000", "/graphqlfed"),
            "http://localhost:3000/graphqlfed"
        );
        assert_eq!(
            graphql_url("http://localhost:3000", "graphqlfed"),
            "http://localhost:3000/graphqlfed"
        );
    }

    #[test]
    fn test_validation_urls() {
        assert_eq!(
            validate_sample_ids_url("http://x"),
            "http://x/samples/validate_sample_ids"
        );
        assert_eq!(
            validate_workflow_run_ids_url("http://x"),
            "http://x/workflow_runs/validate_workflow_run_ids"
        );
    }

    #[test]
    fn test_sample_flag_urls() {
        assert_eq!(
            user_is_collaborator_url("http://x"),
            "http://x/samples/user_is_collaborator.json"
        );
        assert_eq!(
            mass_normalized_availability_url("http://x"),
            "http://x/samples/enable_mass_normalized_backgrounds.json"
        );
    }
}

//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Shared setup
//! (configuration, client, selection and the loaded dialog) lives here.

pub mod config;
pub mod download;
pub mod heatmap_link;
pub mod types;
pub mod validate;

use crate::api::ApiClient;
use crate::config::Config;
use crate::dialog::{BulkDownloadDialog, DialogPhase, UserContext};
use crate::error::{CliError, Result};
use crate::fields::{FieldValue, ThresholdFilter};
use crate::selection::EntitySelection;
use crate::SelectionArgs;
use bulkdl_common::WorkflowKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Global options every command receives
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub server_url: Option<String>,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, server_url: Option<String>) -> Self {
        Self {
            config_path,
            server_url,
        }
    }

    /// Effective configuration, with `--server-url` applied last
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::load(self.config_path.as_deref())?;
        if let Some(url) = &self.server_url {
            config.server_url = url.clone();
        }
        Ok(config)
    }
}

/// Build the selection from a selection file or from `--workflow/--entity/--ids`.
pub fn build_selection(args: &SelectionArgs, config: &Config) -> Result<EntitySelection> {
    let mut selection = match &args.selection {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                CliError::invalid_input(format!("Cannot read selection file '{}': {}", path.display(), e))
            })?;
            let file: EntitySelection = serde_json::from_str(&content)?;

            // objects listed without their ID in `ids` still count as selected
            EntitySelection::new(
                args.workflow.unwrap_or(file.workflow),
                args.entity.unwrap_or(file.workflow_entity),
            )
            .with_ids(file.ids)
            .with_objects(file.objects)
            .with_current_user(file.current_user_id)
        }
        None => {
            let workflow = args.workflow.unwrap_or(WorkflowKind::ShortReadMngs);
            let entity = args.entity.unwrap_or_default();
            EntitySelection::new(workflow, entity).with_ids(args.ids.iter().map(String::as_str))
        }
    };

    if selection.current_user_id.is_none() {
        selection.current_user_id = config.current_user_id;
    }
    if selection.is_empty() {
        return Err(CliError::invalid_input(
            "No objects selected. Pass --ids or --selection.",
        ));
    }

    debug!(
        workflow = %selection.workflow,
        entity = %selection.workflow_entity,
        objects = selection.ids.len(),
        "Selection built"
    );
    Ok(selection)
}

/// Open a dialog for the selection and run its initial load.
///
/// A failed load is returned as an error carrying the platform's message.
/// Background availability is looked up separately; when that lookup fails
/// the dialog is still returned with availability left unknown.
pub async fn open_dialog(
    config: &Config,
    client: &ApiClient,
    selection: EntitySelection,
) -> Result<BulkDownloadDialog> {
    let mut dialog = BulkDownloadDialog::new(selection).with_user(UserContext {
        is_admin: config.is_admin,
        max_samples_original_files: config.max_samples_original_files,
    });

    if let DialogPhase::Failed(message) = dialog.load(client).await {
        return Err(CliError::api(message.clone()));
    }
    if let Err(e) = dialog.refresh_background_availability(client).await {
        warn!(error = %e, "Mass-normalized background availability unknown");
    }

    Ok(dialog)
}

/// A `--field` argument
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArg {
    pub name: String,
    pub value: FieldValue,
    pub display_name: Option<String>,
}

/// Parse `name=value` or `name=value|display name`.
///
/// Values are read as booleans, numbers, a JSON list of threshold filters,
/// or plain text, in that order.
pub fn parse_field_arg(arg: &str) -> Result<FieldArg> {
    let (name, rest) = arg
        .split_once('=')
        .ok_or_else(|| CliError::invalid_input(format!("Expected name=value, got '{}'", arg)))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::invalid_input(format!("Missing field name in '{}'", arg)));
    }

    let (raw, display_name) = match rest.split_once('|') {
        Some((raw, display)) => (raw, Some(display.to_string())),
        None => (rest, None),
    };

    Ok(FieldArg {
        name: name.to_string(),
        value: parse_field_value(raw)?,
        display_name,
    })
}

fn parse_field_value(raw: &str) -> Result<FieldValue> {
    let value = match raw {
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        _ if raw.trim_start().starts_with('[') => {
            let filters: Vec<ThresholdFilter> = serde_json::from_str(raw)?;
            FieldValue::ThresholdFilters(filters)
        }
        _ => match raw.parse::<i64>() {
            Ok(integer) => FieldValue::from(integer),
            Err(_) => match raw.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(number) => FieldValue::Number(number),
                None => FieldValue::Text(raw.to_string()),
            },
        },
    };
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_arg_kinds() {
        let arg = parse_field_arg("file_format=.fasta").unwrap();
        assert_eq!(arg.name, "file_format");
        assert_eq!(arg.value, FieldValue::from(".fasta"));
        assert_eq!(arg.display_name, None);

        let arg = parse_field_arg("background=26|Default background").unwrap();
        assert_eq!(arg.value, FieldValue::from(26_i64));
        assert_eq!(arg.display_name.as_deref(), Some("Default background"));

        assert_eq!(parse_field_arg("include_metadata=true").unwrap().value, FieldValue::Bool(true));
        assert_eq!(parse_field_arg("metric=NT.rpm").unwrap().value, FieldValue::from("NT.rpm"));
        assert_eq!(parse_field_arg("min_reads=2.5").unwrap().value.to_string(), "2.5");
        assert_eq!(parse_field_arg("x=inf").unwrap().value, FieldValue::from("inf"));
    }

    #[test]
    fn test_parse_threshold_filters() {
        let arg = parse_field_arg(r#"filter_by=[{"metric":"NT_rpm","operator":">=","value":"5"}]"#).unwrap();
        assert_eq!(
            arg.value,
            FieldValue::ThresholdFilters(vec![ThresholdFilter::new("NT_rpm", ">=", "5")])
        );
    }

    #[test]
    fn test_parse_field_arg_errors() {
        assert!(parse_field_arg("no-equals").is_err());
        assert!(parse_field_arg("=value").is_err());
        assert!(parse_field_arg("filter_by=[not json").is_err());
    }

    #[test]
    fn test_build_selection_from_ids() {
        let args = SelectionArgs {
            workflow: Some(WorkflowKind::Amr),
            entity: None,
            ids: vec!["1".to_string(), "2".to_string(), "1".to_string()],
            selection: None,
        };
        let config = Config {
            current_user_id: Some(9),
            ..Config::default()
        };

        let selection = build_selection(&args, &config).unwrap();
        assert_eq!(selection.workflow, WorkflowKind::Amr);
        assert_eq!(selection.ids.len(), 2);
        assert_eq!(selection.current_user_id, Some(9));
    }

    #[test]
    fn test_build_selection_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        std::fs::write(
            &path,
            r#"{
                "workflow": "consensus-genome",
                "workflow_entity": "Workflow Runs",
                "ids": ["r1"],
                "objects": [{ "id": "r1", "sample": { "id": 5, "name": "five" } }],
                "current_user_id": 3
            }"#,
        )
        .unwrap();

        let args = SelectionArgs {
            workflow: None,
            entity: None,
            ids: vec![],
            selection: Some(path),
        };
        let selection = build_selection(&args, &Config::default()).unwrap();
        assert_eq!(selection.workflow, WorkflowKind::ConsensusGenome);
        assert_eq!(selection.objects[0].sample.name, "five");
        assert_eq!(selection.current_user_id, Some(3));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let args = SelectionArgs {
            workflow: None,
            entity: None,
            ids: vec![],
            selection: None,
        };
        assert!(matches!(
            build_selection(&args, &Config::default()),
            Err(CliError::InvalidInput(_))
        ));
    }
}

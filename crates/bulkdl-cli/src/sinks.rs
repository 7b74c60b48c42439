//! Side-effect collaborators of the download flow
//!
//! CSV files, analytics events and opening links are behind small traits so
//! the dialog can be driven headless in tests.

use crate::api::types::CsvRow;
use crate::error::{CliError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Materializes tabular rows as a CSV file
pub trait CsvSink: Send + Sync {
    /// Write `rows` under the file name stem `stem`, returning where they went.
    fn save(&self, stem: &str, rows: &[CsvRow]) -> Result<PathBuf>;
}

/// Writes `<stem>.csv` into a directory
#[derive(Debug, Clone)]
pub struct FileCsvSink {
    dir: PathBuf,
}

impl FileCsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl CsvSink for FileCsvSink {
    fn save(&self, stem: &str, rows: &[CsvRow]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.csv", stem));

        // metadata rows are not guaranteed to share a width
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
        for row in rows {
            writer.write_record(row.iter().map(cell))?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
        Ok(path)
    }
}

/// Properties of a successful bulk download creation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub workflow: String,
    pub download_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_run_ids: Option<Vec<String>>,
}

pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: &AnalyticsEvent);
}

/// Emits analytics as structured log events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn track(&self, event: &AnalyticsEvent) {
        let properties = serde_json::to_string(event).unwrap_or_default();
        info!(target: "bulkdl::analytics", event = event.name, %properties, "Analytics event");
    }
}

/// Keeps tracked events in memory
#[derive(Debug, Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AnalyticsSink for RecordingAnalytics {
    fn track(&self, event: &AnalyticsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Opens a link for the user
pub trait UrlOpener: Send + Sync {
    fn open_url(&self, url: &str) -> Result<()>;
}

/// Opens links in the default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserOpener;

impl UrlOpener for BrowserOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| CliError::api(format!("Cannot open '{}': {}", url, e)))
    }
}

/// Prints links to stdout instead of opening them
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintOpener;

impl UrlOpener for PrintOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        println!("{}", url);
        Ok(())
    }
}

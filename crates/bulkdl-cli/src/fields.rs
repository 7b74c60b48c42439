//! Selected download fields
//!
//! The dialog keeps every selection for every download type, so switching
//! between types never loses input. Each selection carries its value and an
//! optional human-readable display name in one entry; the value view and the
//! display view can therefore never disagree on which fields are set.
//!
//! All updates return a new [`SelectedFields`]; nothing is mutated in place.

use crate::api::types::DownloadTypeCatalogEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value chosen for a download field
///
/// Numbers keep their JSON form, so an integer background ID goes back to
/// the platform as `26` and not `26.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    ThresholdFilters(Vec<ThresholdFilter>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_threshold_filters(&self) -> Option<&[ThresholdFilter]> {
        match self {
            FieldValue::ThresholdFilters(filters) => Some(filters),
            _ => None,
        }
    }

    /// Whether the value counts as "no selection" for display fallbacks.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::ThresholdFilters(filters) => filters.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Bool(flag) => write!(f, "{}", flag),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::ThresholdFilters(filters) => {
                let parts: Vec<String> = filters
                    .iter()
                    .map(|t| format!("{} {} {}", t.metric, t.operator, t.value))
                    .collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(number: i64) -> Self {
        FieldValue::Number(number.into())
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Bool(flag)
    }
}

/// Threshold filter as produced by the interactive heatmap filters.
///
/// `metric` uses the heatmap's underscore separator (`NT_rpm`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdFilter {
    pub metric: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub value: String,
}

impl ThresholdFilter {
    pub fn new(metric: impl Into<String>, operator: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// One selected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub value: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

pub type FieldsForType = BTreeMap<String, FieldSelection>;

/// Selections for all download types: type -> field -> selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedFields(BTreeMap<String, FieldsForType>);

impl SelectedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    pub fn for_type(&self, download_type: &str) -> Option<&FieldsForType> {
        self.0.get(download_type)
    }

    pub fn get(&self, download_type: &str, field: &str) -> Option<&FieldSelection> {
        self.0.get(download_type)?.get(field)
    }

    pub fn value(&self, download_type: &str, field: &str) -> Option<&FieldValue> {
        self.get(download_type, field).map(|s| &s.value)
    }

    pub fn display_name(&self, download_type: &str, field: &str) -> Option<&str> {
        self.get(download_type, field)?.display_name.as_deref()
    }

    /// Set a field, replacing any previous selection for it.
    pub fn with_field(
        &self,
        download_type: &str,
        field: &str,
        value: FieldValue,
        display_name: Option<String>,
    ) -> Self {
        let mut next = self.0.clone();
        next.entry(download_type.to_string())
            .or_default()
            .insert(field.to_string(), FieldSelection { value, display_name });
        Self(next)
    }

    /// Unset a field; sibling fields are left as they are.
    pub fn without_field(&self, download_type: &str, field: &str) -> Self {
        let mut next = self.0.clone();
        if let Some(fields) = next.get_mut(download_type) {
            fields.remove(field);
        }
        Self(next)
    }

    /// Apply a field-select event.
    ///
    /// `None` unsets the field, which is how conditionally required fields are
    /// cleared once they stop being required.
    pub fn apply_selection(
        &self,
        download_type: &str,
        field: &str,
        value: Option<FieldValue>,
        display_name: Option<String>,
    ) -> Self {
        match value {
            Some(value) => self.with_field(download_type, field, value, display_name),
            None => self.without_field(download_type, field),
        }
    }

    /// Seed catalog default values without touching existing selections.
    pub fn with_defaults(&self, catalog: &[DownloadTypeCatalogEntry]) -> Self {
        let mut next = self.0.clone();
        for entry in catalog {
            for field in &entry.fields {
                let Some(default) = &field.default_value else {
                    continue;
                };
                next.entry(entry.type_name.clone())
                    .or_default()
                    .entry(field.field_type.clone())
                    .or_insert_with(|| FieldSelection {
                        value: default.value.clone(),
                        display_name: Some(default.display_name.clone()),
                    });
            }
        }
        Self(next)
    }

    /// Value-only view, keyed like the display view.
    pub fn values(&self) -> BTreeMap<&str, BTreeMap<&str, &FieldValue>> {
        self.0
            .iter()
            .map(|(t, fields)| {
                let values = fields.iter().map(|(f, s)| (f.as_str(), &s.value)).collect();
                (t.as_str(), values)
            })
            .collect()
    }

    /// Display view; fields without a display name map to `None`.
    pub fn display_names(&self) -> BTreeMap<&str, BTreeMap<&str, Option<&str>>> {
        self.0
            .iter()
            .map(|(t, fields)| {
                let names = fields
                    .iter()
                    .map(|(f, s)| (f.as_str(), s.display_name.as_deref()))
                    .collect();
                (t.as_str(), names)
            })
            .collect()
    }
}

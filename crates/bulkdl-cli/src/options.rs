//! Download option rules
//!
//! Which download types are offered, which of their fields must be filled in,
//! and when the start button is enabled. Everything here is a pure function
//! of the catalog and the current selections.

use crate::api::types::{CatalogField, DownloadTypeCatalogEntry};
use crate::fields::{FieldValue, FieldsForType};

pub const ORIGINAL_INPUT_FILE: &str = "original_input_file";
pub const HOST_GENE_COUNTS: &str = "host_gene_counts";
pub const BIOM_FORMAT: &str = "biom_format";
pub const COMBINED_SAMPLE_TAXON_RESULTS: &str = "combined_sample_taxon_results";

/// Field holding the heatmap threshold filters
pub const FILTER_BY_FIELD: &str = "filter_by";

/// Display name of the consensus genome catalog entry. Its types are listed
/// without category headers.
const CONSENSUS_GENOME_DISPLAY_NAME: &str = "Consensus Genome";

const CATEGORY_ORDER: [&str; 3] = ["results", "reports", "raw_data"];

/// A field that is only required while one of its dependent fields holds a
/// trigger value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalField {
    pub download_type: &'static str,
    pub field: &'static str,
    pub dependent_fields: &'static [&'static str],
    pub trigger_values: &'static [&'static str],
}

/// Background is only needed for z-score metrics
pub const CONDITIONAL_FIELDS: [ConditionalField; 2] = [
    ConditionalField {
        download_type: COMBINED_SAMPLE_TAXON_RESULTS,
        field: "background",
        dependent_fields: &["metric"],
        trigger_values: &["NT.zscore", "NR.zscore"],
    },
    ConditionalField {
        download_type: BIOM_FORMAT,
        field: "background",
        dependent_fields: &[FILTER_BY_FIELD, "metric"],
        trigger_values: &["NT.zscore", "NR.zscore"],
    },
];

/// (download type, field) pairs that never block submission
pub const OPTIONAL_FIELDS: [(&str, &str); 1] = [(BIOM_FORMAT, FILTER_BY_FIELD)];

/// Whether any dependent field of `conditional` currently holds a trigger value.
///
/// Threshold filter metrics are written `NT_rpm` while trigger values use
/// `NT.rpm`; the first underscore is translated before comparing.
pub fn triggers_conditional_field(
    conditional: &ConditionalField,
    selected_for_type: Option<&FieldsForType>,
) -> bool {
    let Some(selected) = selected_for_type else {
        return false;
    };

    conditional.dependent_fields.iter().any(|dependent| {
        let Some(selection) = selected.get(*dependent) else {
            return false;
        };

        match &selection.value {
            FieldValue::ThresholdFilters(filters) if *dependent == FILTER_BY_FIELD => {
                filters.iter().any(|filter| {
                    let metric = filter.metric.replacen('_', ".", 1);
                    conditional.trigger_values.contains(&metric.as_str())
                })
            }
            FieldValue::Text(text) => conditional.trigger_values.contains(&text.as_str()),
            _ => false,
        }
    })
}

/// Conditional fields to unset after `field` of `download_type` changed to
/// `value`.
pub fn conditional_fields_to_reset(
    download_type: &str,
    field: &str,
    value: Option<&FieldValue>,
) -> Vec<&'static str> {
    let text = value.and_then(FieldValue::as_text);
    CONDITIONAL_FIELDS
        .iter()
        .filter(|c| c.download_type == download_type && c.dependent_fields.contains(&field))
        .filter(|c| !text.is_some_and(|t| c.trigger_values.contains(&t)))
        .map(|c| c.field)
        .collect()
}

/// Fields of `entry` that must hold a value before submitting
pub fn required_fields<'a>(
    entry: &'a DownloadTypeCatalogEntry,
    selected_for_type: Option<&FieldsForType>,
) -> Vec<&'a CatalogField> {
    entry
        .fields
        .iter()
        .filter(|field| {
            !CONDITIONAL_FIELDS.iter().any(|c| {
                c.download_type == entry.type_name
                    && c.field == field.field_type
                    && !triggers_conditional_field(c, selected_for_type)
            })
        })
        .filter(|field| {
            !OPTIONAL_FIELDS
                .iter()
                .any(|(t, f)| *t == entry.type_name && *f == field.field_type)
        })
        .collect()
}

/// Whether the start button is enabled for the selected type.
///
/// `human_host_samples` counts valid samples whose host is human; it is only
/// consulted for host gene counts, which ignore field requirements.
pub fn is_selected_download_valid(
    entry: Option<&DownloadTypeCatalogEntry>,
    selected_for_type: Option<&FieldsForType>,
    valid_object_count: usize,
    human_host_samples: usize,
) -> bool {
    let Some(entry) = entry else {
        return false;
    };
    if valid_object_count == 0 {
        return false;
    }
    if entry.type_name == HOST_GENE_COUNTS {
        return human_host_samples > 0;
    }

    required_fields(entry, selected_for_type)
        .iter()
        .all(|field| selected_for_type.is_some_and(|s| s.contains_key(&field.field_type)))
}

/// What the current user is allowed to request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub is_admin: bool,
    pub uploaded_all_objects: bool,
    pub collaborator_on_all_samples: bool,
    pub max_samples_original_files: Option<usize>,
}

/// Message explaining why `entry` cannot be selected, if it cannot
pub fn disabled_reason(
    entry: &DownloadTypeCatalogEntry,
    permissions: &Permissions,
    valid_object_count: usize,
    object_label: &str,
) -> Option<String> {
    if permissions.is_admin {
        return None;
    }

    match entry.type_name.as_str() {
        ORIGINAL_INPUT_FILE => {
            if !permissions.uploaded_all_objects {
                return Some(format!(
                    "To download Original Input Files, you must be the original uploader of all selected {}s.",
                    object_label
                ));
            }
            match permissions.max_samples_original_files {
                Some(max) if valid_object_count > max => Some(format!(
                    "No more than {} samples allowed for Original Input Files downloads",
                    max
                )),
                _ => None,
            }
        }
        HOST_GENE_COUNTS if !permissions.collaborator_on_all_samples => Some(
            "To download host count data, you must be a collaborator on the respective project for all samples."
                .to_string(),
        ),
        _ => None,
    }
}

/// Invalid sample names worth listing; unknown (empty) names are dropped.
pub fn trimmed_invalid_sample_names(names: &[String]) -> Vec<&str> {
    names
        .iter()
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Download types offered in the dialog, grouped by category.
///
/// Entries without a category or flagged hidden are left out. Known
/// categories come first in a fixed order. Consensus genome catalogs are
/// returned as one unnamed group.
pub fn visible_download_types(
    catalog: &[DownloadTypeCatalogEntry],
) -> Vec<(Option<String>, Vec<&DownloadTypeCatalogEntry>)> {
    let mut visible: Vec<&DownloadTypeCatalogEntry> = catalog
        .iter()
        .filter(|entry| entry.category.is_some() && !entry.hide_in_creation_modal)
        .collect();

    let category_rank = |entry: &&DownloadTypeCatalogEntry| {
        entry
            .category
            .as_deref()
            .and_then(|c| CATEGORY_ORDER.iter().position(|known| *known == c))
            .map_or(-1, |i| i as i64)
    };

    if visible
        .iter()
        .any(|entry| entry.display_name == CONSENSUS_GENOME_DISPLAY_NAME)
    {
        visible.sort_by_key(category_rank);
        return vec![(None, visible)];
    }

    let mut categories: Vec<&str> = CATEGORY_ORDER.to_vec();
    for entry in &visible {
        if let Some(category) = entry.category.as_deref() {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
    }

    categories
        .into_iter()
        .filter_map(|category| {
            let entries: Vec<_> = visible
                .iter()
                .copied()
                .filter(|entry| entry.category.as_deref() == Some(category))
                .collect();
            (!entries.is_empty()).then(|| (Some(category_label(category)), entries))
        })
        .collect()
}

/// `raw_data` -> `Raw data`
pub fn category_label(category: &str) -> String {
    let spaced = category.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

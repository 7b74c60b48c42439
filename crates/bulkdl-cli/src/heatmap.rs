//! Heatmap link for combined microbiome (BIOM) selections
//!
//! Opens the heatmap on the valid objects with the same background, metric
//! and threshold filters the user picked for the BIOM download. `presets`
//! tells the heatmap which of those settings to apply on load.

use crate::fields::{FieldValue, SelectedFields};
use crate::options::{BIOM_FORMAT, FILTER_BY_FIELD};
use bulkdl_common::EntityId;

/// Metrics the heatmap can sort by
pub const SORTABLE_METRICS: [&str; 6] = ["NT.zscore", "NT.rpm", "NT.r", "NR.zscore", "NR.rpm", "NR.r"];

/// Background used when none was picked
pub const DEFAULT_BACKGROUND_MODEL: u64 = 26;

pub const HEATMAP_PATH: &str = "/visualizations/heatmap";

enum Param {
    Null,
    Scalar(String),
    List(Vec<String>),
}

/// Whether the heatmap can be sorted by `metric`
pub fn is_sortable_metric(metric: Option<&FieldValue>) -> bool {
    metric
        .and_then(FieldValue::as_text)
        .is_some_and(|m| SORTABLE_METRICS.contains(&m))
}

/// Settings to apply when the heatmap opens
pub fn heatmap_presets(selected: &SelectedFields) -> Vec<&'static str> {
    let mut presets = Vec::new();
    if selected.value(BIOM_FORMAT, FILTER_BY_FIELD).is_some() {
        presets.push("thresholdFilters");
    }
    if is_sortable_metric(selected.value(BIOM_FORMAT, "metric")) {
        presets.push("metric");
    }
    presets
}

/// Query string of the heatmap link, without the leading `?`
pub fn heatmap_query(selected: &SelectedFields, valid_ids: &[EntityId]) -> String {
    let background = match selected.value(BIOM_FORMAT, "background") {
        Some(value) if !value.is_blank() && value != &FieldValue::Bool(false) => value.to_string(),
        _ => DEFAULT_BACKGROUND_MODEL.to_string(),
    };

    let threshold_filters = match selected.value(BIOM_FORMAT, FILTER_BY_FIELD) {
        Some(filters) => serde_json::to_string(filters)
            .map(Param::Scalar)
            .unwrap_or(Param::Null),
        None => Param::Null,
    };

    let params = [
        ("background", Param::Scalar(background)),
        ("categories", Param::List(Vec::new())),
        ("subcategories", Param::Scalar("{}".to_string())),
        ("readSpecificity", Param::Null),
        (
            "sampleIds",
            Param::List(valid_ids.iter().map(ToString::to_string).collect()),
        ),
        ("species", Param::Null),
        ("thresholdFilters", threshold_filters),
        (
            "metric",
            Param::Scalar(is_sortable_metric(selected.value(BIOM_FORMAT, "metric")).to_string()),
        ),
        (
            "presets",
            Param::List(heatmap_presets(selected).into_iter().map(str::to_string).collect()),
        ),
    ];

    let mut pairs = Vec::new();
    for (key, param) in params {
        match param {
            Param::Null => {}
            Param::Scalar(value) => pairs.push(format!("{}={}", key, urlencoding::encode(&value))),
            Param::List(values) => {
                for value in values {
                    pairs.push(format!("{}[]={}", key, urlencoding::encode(&value)));
                }
            }
        }
    }
    pairs.join("&")
}

/// Absolute heatmap link on `base_url`
pub fn heatmap_url(base_url: &str, selected: &SelectedFields, valid_ids: &[EntityId]) -> String {
    format!(
        "{}{}?{}",
        base_url.trim_end_matches('/'),
        HEATMAP_PATH,
        heatmap_query(selected, valid_ids)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fields::ThresholdFilter;

    fn ids() -> Vec<EntityId> {
        vec![EntityId::new("11"), EntityId::new("12")]
    }

    #[test]
    fn test_presets_with_filters_and_sortable_metric() {
        let selected = SelectedFields::new()
            .with_field(
                BIOM_FORMAT,
                FILTER_BY_FIELD,
                FieldValue::ThresholdFilters(vec![ThresholdFilter::new("NT_rpm", ">=", "5")]),
                None,
            )
            .with_field(BIOM_FORMAT, "metric", "NT.rpm".into(), None);

        assert_eq!(heatmap_presets(&selected), vec!["thresholdFilters", "metric"]);

        let query = heatmap_query(&selected, &ids());
        assert!(query.contains("presets[]=thresholdFilters&presets[]=metric"));
        assert!(query.contains("metric=true"));
    }

    #[test]
    fn test_unsortable_metric_is_not_preset() {
        let selected = SelectedFields::new().with_field(BIOM_FORMAT, "metric", "NT.contigs".into(), None);
        assert!(heatmap_presets(&selected).is_empty());

        let query = heatmap_query(&selected, &ids());
        assert!(query.contains("metric=false"));
        assert!(!query.contains("presets"));
        assert!(!query.contains("thresholdFilters"));
    }

    #[test]
    fn test_query_layout() {
        let selected = SelectedFields::new()
            .with_field(BIOM_FORMAT, "background", FieldValue::from(4_i64), Some("Bg".to_string()));

        assert_eq!(
            heatmap_query(&selected, &ids()),
            "background=4&subcategories=%7B%7D&sampleIds[]=11&sampleIds[]=12&metric=false"
        );
    }

    #[test]
    fn test_default_background_and_encoded_filters() {
        let selected = SelectedFields::new().with_field(
            BIOM_FORMAT,
            FILTER_BY_FIELD,
            FieldValue::ThresholdFilters(vec![ThresholdFilter::new("NR_r", ">=", "2")]),
            None,
        );

        let url = heatmap_url("https://platform.example.org/", &selected, &ids());
        assert!(url.starts_with("https://platform.example.org/visualizations/heatmap?background=26&"));
        let encoded = urlencoding::encode(r#"[{"metric":"NR_r","operator":">=","value":"2"}]"#);
        assert!(url.contains(&format!("thresholdFilters={}", encoded)));
    }
}

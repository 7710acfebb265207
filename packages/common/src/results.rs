use serde::{Deserialize, Deserializer, Serialize};

use crate::poll::label_for;

/// Aggregated vote count for one option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResultItem {
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "A")]
    pub option: String,
    /// Display label. Upstream values are ignored and re-derived locally.
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "API Gateway")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = 10)]
    pub count: u64,
}

/// Aggregate results for a poll as returned by the results endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(example = "poll-1")]
    pub poll_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ResultItem>,
}

/// Absent and `null` both decode to the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Replace every label with the one from the local option table.
pub fn normalize_labels(items: Vec<ResultItem>) -> Vec<ResultItem> {
    items
        .into_iter()
        .map(|item| ResultItem {
            label: label_for(&item.option).to_string(),
            ..item
        })
        .collect()
}

/// Sum of all counts.
pub fn total_votes(items: &[ResultItem]) -> u64 {
    items
        .iter()
        .fold(0u64, |total, item| total.saturating_add(item.count))
}

/// Share of `total` as a whole percentage, rounded half away from zero.
///
/// Returns 0 when `total` is 0.
pub fn percentage(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

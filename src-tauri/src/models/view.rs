use serde::Serialize;

use super::chart::Figure;
use super::range::{DateBounds, DateRange};

/// Summary statistics over the filtered (never aggregated) selection.
/// Mean and max are `None` when the selection is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub mean_close: Option<f64>,
    pub total_volume: f64,
    pub max_close: Option<f64>,
}

/// A metric ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricView {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub summary: Summary,
    pub metrics: Vec<MetricView>,
}

/// Everything the frontend needs for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub bounds: DateBounds,
    pub range: DateRange,
    pub filtered_rows: usize,
    pub aggregated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub summary: SummaryView,
    pub price_chart: Figure,
    pub combo_chart: Figure,
}

use statrs::statistics::Statistics;

use crate::models::bar::PriceBar;
use crate::models::view::{MetricView, Summary, SummaryView};
use crate::utils::format::{format_price, format_thousands};

/// Summary statistics over the filtered bars.
///
/// Callers pass the filtered selection, never the display series, so the
/// numbers keep full granularity when the charts are aggregated.
pub fn summarize(filtered: &[PriceBar]) -> Summary {
    if filtered.is_empty() {
        return empty_summary();
    }

    let mean_close = filtered.iter().map(|b| b.close).mean();
    let max_close = filtered
        .iter()
        .map(|b| b.close)
        .fold(f64::NEG_INFINITY, f64::max);
    let total_volume: f64 = filtered.iter().map(|b| b.volume).sum();

    Summary {
        mean_close: Some(mean_close),
        total_volume,
        max_close: Some(max_close),
    }
}

fn empty_summary() -> Summary {
    Summary {
        mean_close: None,
        total_volume: 0.0,
        max_close: None,
    }
}

/// Format a summary for the metrics row.
pub fn summary_view(summary: Summary) -> SummaryView {
    let metrics = vec![
        MetricView {
            label: "Average price".into(),
            value: format_price(summary.mean_close),
        },
        MetricView {
            label: "Total volume".into(),
            value: format_thousands(summary.total_volume),
        },
        MetricView {
            label: "Max price".into(),
            value: format_price(summary.max_close),
        },
    ];
    SummaryView { summary, metrics }
}

use chrono::NaiveDate;

use crate::models::bar::TimeSeries;
use crate::models::range::{DateBounds, DateRange};

/// Calendar-date floor and ceiling of the series' timestamps.
pub fn bounds(series: &TimeSeries) -> DateBounds {
    DateBounds {
        min_date: series.first().date(),
        max_date: series.last().date(),
    }
}

/// Build the active range from the user's control values.
///
/// A missing side defaults to the matching bound, so no input at all selects
/// the full span. Values are clamped into the bounds.
pub fn select(bounds: DateBounds, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
    let start = bounds.clamp(start.unwrap_or(bounds.min_date));
    let end = bounds.clamp(end.unwrap_or(bounds.max_date));
    DateRange::new(start, end)
}

use chrono::NaiveTime;
use tracing::{debug, info};

use crate::models::bar::{PriceBar, TimeSeries};
use crate::models::range::DateRange;

/// Row count above which the charts switch to daily bars.
pub const DEFAULT_AGGREGATION_THRESHOLD: usize = 10_000;

/// The series handed to the charts.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplaySeries<'a> {
    /// The filtered bars as-is.
    Raw { bars: &'a [PriceBar] },
    /// Daily buckets built from `original_count` filtered bars.
    Aggregated {
        bars: Vec<PriceBar>,
        original_count: usize,
    },
}

impl DisplaySeries<'_> {
    pub fn bars(&self) -> &[PriceBar] {
        match self {
            DisplaySeries::Raw { bars } => bars,
            DisplaySeries::Aggregated { bars, .. } => bars,
        }
    }

    pub fn is_aggregated(&self) -> bool {
        matches!(self, DisplaySeries::Aggregated { .. })
    }
}

/// Result of one pipeline run. `filtered` always keeps full granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<'a> {
    pub filtered: &'a [PriceBar],
    pub display: DisplaySeries<'a>,
}

impl PipelineOutput<'_> {
    pub fn aggregated(&self) -> bool {
        self.display.is_aggregated()
    }
}

/// Filter `series` to `range` and, when more than `threshold` bars remain,
/// collapse them into daily bars for display.
///
/// Pure: the same inputs always produce the same output.
pub fn process<'a>(
    series: &'a TimeSeries,
    range: &DateRange,
    threshold: usize,
) -> PipelineOutput<'a> {
    let filtered = filter_by_date(series, range);

    let display = if filtered.len() > threshold {
        let bars = resample_daily(filtered);
        info!(
            "Aggregated {} bars into {} daily bars (threshold {})",
            filtered.len(),
            bars.len(),
            threshold
        );
        DisplaySeries::Aggregated {
            bars,
            original_count: filtered.len(),
        }
    } else {
        debug!("Displaying {} raw bars", filtered.len());
        DisplaySeries::Raw { bars: filtered }
    };

    PipelineOutput { filtered, display }
}

/// Bars whose calendar date lies in `range`, inclusive on both ends.
///
/// The series is sorted, so the match is one contiguous slice.
pub fn filter_by_date<'a>(series: &'a TimeSeries, range: &DateRange) -> &'a [PriceBar] {
    let bars = series.bars();
    let start = bars.partition_point(|b| b.date() < range.start_date());
    let end = bars.partition_point(|b| b.date() <= range.end_date());
    &bars[start..end.max(start)]
}

/// One bar per calendar day that has data: first open, max high, min low,
/// last close, summed volume. Days without bars are skipped.
pub fn resample_daily(bars: &[PriceBar]) -> Vec<PriceBar> {
    bars.chunk_by(|a, b| a.date() == b.date())
        .filter_map(daily_bar)
        .collect()
}

fn daily_bar(bucket: &[PriceBar]) -> Option<PriceBar> {
    let first = bucket.first()?;
    let last = bucket.last()?;
    let mut high = first.high;
    let mut low = first.low;
    let mut volume = 0.0;
    for bar in bucket {
        high = high.max(bar.high);
        low = low.min(bar.low);
        volume += bar.volume;
    }
    Some(PriceBar {
        timestamp: first.date().and_time(NaiveTime::MIN),
        open: first.open,
        high,
        low,
        close: last.close,
        volume,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::engine::selector;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> NaiveDateTime {
        date.and_hms_opt(hour, 0, 0).unwrap()
    }

    fn hourly(start: NaiveDate, hours: i64) -> TimeSeries {
        let origin = at(start, 0);
        let bars = (0..hours)
            .map(|h| {
                let base = 100.0 + (h % 24) as f64;
                PriceBar {
                    timestamp: origin + Duration::hours(h),
                    open: base,
                    high: base + 5.0,
                    low: base - 5.0,
                    close: base + 1.0,
                    volume: 2.0,
                }
            })
            .collect();
        TimeSeries::new(bars).unwrap()
    }

    /// Two days with bars at 00, 06, 12 and 18h.
    fn two_day_series() -> TimeSeries {
        let day1 = d(2024, 1, 1);
        let day2 = d(2024, 1, 2);
        let bar = |ts, open, high, low, close| PriceBar {
            timestamp: ts,
            open,
            high,
            low,
            close,
            volume: 10.0,
        };
        TimeSeries::new(vec![
            bar(at(day1, 0), 100.0, 120.0, 95.0, 108.0),
            bar(at(day1, 6), 110.0, 118.0, 99.0, 104.0),
            bar(at(day1, 12), 105.0, 116.0, 97.0, 112.0),
            bar(at(day1, 18), 115.0, 119.0, 96.0, 115.0),
            bar(at(day2, 0), 200.0, 220.0, 195.0, 208.0),
            bar(at(day2, 6), 210.0, 225.0, 199.0, 204.0),
            bar(at(day2, 12), 205.0, 216.0, 190.0, 212.0),
            bar(at(day2, 18), 215.0, 219.0, 196.0, 218.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_includes_every_hour_of_end_date() {
        let series = hourly(d(2024, 1, 1), 24 * 5);
        let range = DateRange::new(d(2024, 1, 2), d(2024, 1, 3));
        let filtered = filter_by_date(&series, &range);
        assert_eq!(filtered.len(), 48);
        assert_eq!(filtered[0].timestamp, at(d(2024, 1, 2), 0));
        assert_eq!(filtered[47].timestamp, at(d(2024, 1, 3), 23));
    }

    #[test]
    fn test_filter_matches_naive_scan_and_grows_with_range() {
        let series = hourly(d(2023, 12, 20), 24 * 30 + 7);
        let bounds = selector::bounds(&series);
        let span = (bounds.max_date - bounds.min_date).num_days();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let a = bounds.min_date + Duration::days(rng.gen_range(0..=span));
            let b = bounds.min_date + Duration::days(rng.gen_range(0..=span));
            let range = DateRange::new(a, b);

            let filtered = filter_by_date(&series, &range);
            let expected = series
                .bars()
                .iter()
                .filter(|bar| range.contains(bar.date()))
                .count();
            assert_eq!(filtered.len(), expected);

            let wider = DateRange::new(
                range.start_date() - Duration::days(rng.gen_range(0..3)),
                range.end_date() + Duration::days(rng.gen_range(0..3)),
            );
            assert!(filter_by_date(&series, &wider).len() >= filtered.len());
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let series = hourly(d(2024, 1, 1), 48);
        let range = selector::bounds(&series).full_range();

        let at_threshold = process(&series, &range, 48);
        assert!(!at_threshold.aggregated());
        assert_eq!(at_threshold.display.bars(), series.bars());

        let over_threshold = process(&series, &range, 47);
        assert!(over_threshold.aggregated());
        assert_eq!(over_threshold.display.bars().len(), 2);
        assert_eq!(over_threshold.filtered.len(), 48);
    }

    #[test]
    fn test_daily_bucket_values() {
        let series = two_day_series();
        let range = selector::bounds(&series).full_range();
        let out = process(&series, &range, 4);

        match &out.display {
            DisplaySeries::Aggregated { bars, original_count } => {
                assert_eq!(*original_count, 8);
                assert_eq!(bars.len(), 2);

                let day1 = &bars[0];
                assert_eq!(day1.timestamp, at(d(2024, 1, 1), 0));
                assert_eq!(day1.open, 100.0);
                assert_eq!(day1.close, 115.0);
                assert_eq!(day1.high, 120.0);
                assert_eq!(day1.low, 95.0);
                assert_eq!(day1.volume, 40.0);

                let day2 = &bars[1];
                assert_eq!(day2.open, 200.0);
                assert_eq!(day2.close, 218.0);
                assert_eq!(day2.high, 225.0);
                assert_eq!(day2.low, 190.0);
            }
            DisplaySeries::Raw { .. } => panic!("expected aggregated display"),
        }
    }

    #[test]
    fn test_sparse_days_are_skipped() {
        let bar = |ts| PriceBar {
            timestamp: ts,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 3.0,
        };
        let bars = vec![
            bar(at(d(2024, 1, 1), 10)),
            bar(at(d(2024, 1, 1), 11)),
            bar(at(d(2024, 1, 4), 9)),
        ];
        let daily = resample_daily(&bars);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date(), d(2024, 1, 1));
        assert_eq!(daily[1].date(), d(2024, 1, 4));
        assert_eq!(daily[0].volume, 6.0);
    }

    #[test]
    fn test_empty_range() {
        let series = hourly(d(2024, 1, 1), 48);
        let range = DateRange::new(d(2025, 1, 1), d(2025, 2, 1));
        let out = process(&series, &range, 0);

        assert!(out.filtered.is_empty());
        assert!(out.display.bars().is_empty());
        assert!(!out.aggregated());
    }

    #[test]
    fn test_idempotent() {
        let series = hourly(d(2024, 1, 1), 24 * 10);
        let range = DateRange::new(d(2024, 1, 3), d(2024, 1, 8));
        for threshold in [10, DEFAULT_AGGREGATION_THRESHOLD] {
            let first = process(&series, &range, threshold);
            let second = process(&series, &range, threshold);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_full_range_selects_everything() {
        let series = hourly(d(2024, 2, 27), 24 * 4 + 3);
        let range = selector::select(selector::bounds(&series), None, None);
        let out = process(&series, &range, DEFAULT_AGGREGATION_THRESHOLD);
        assert_eq!(out.filtered, series.bars());
    }
}

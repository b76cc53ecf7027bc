use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::errors::AppError;

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Calendar date the bar belongs to. Filtering and daily buckets both key on this.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// The loaded dataset: non-empty, strictly increasing by timestamp.
///
/// Built once per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    bars: Vec<PriceBar>,
}

impl TimeSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, AppError> {
        if bars.is_empty() {
            return Err(AppError::EmptyDataset);
        }
        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AppError::UnsortedIndex { row: i + 1 });
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }
}

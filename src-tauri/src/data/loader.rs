use std::fs::File;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use polars::prelude::*;
use tracing::info;

use crate::errors::AppError;
use crate::models::bar::{PriceBar, TimeSeries};

/// Accepted names for the timestamp column, in priority order.
/// pandas stores an unnamed index as `__index_level_0__`.
const TIMESTAMP_COLUMNS: [&str; 6] = [
    "__index_level_0__",
    "timestamp",
    "datetime",
    "date",
    "time",
    "open_time",
];

const VALUE_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

/// Load the dataset at `path`. The format is picked from the extension.
pub fn load_dataset(path: &Path) -> Result<TimeSeries, AppError> {
    if !path.exists() {
        return Err(AppError::FileNotFound(path.display().to_string()));
    }

    let start = Instant::now();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let bars = match extension.as_deref() {
        Some("parquet") => {
            let df = load_parquet(path)?;
            bars_from_dataframe(&df)?
        }
        Some("csv") => load_csv(path)?,
        _ => {
            return Err(AppError::UnsupportedFormat(format!(
                "{} (expected .parquet or .csv)",
                path.display()
            )))
        }
    };

    let series = TimeSeries::new(bars)?;
    info!(
        "Loaded {} bars from {} in {:?} ({} → {})",
        series.len(),
        path.display(),
        start.elapsed(),
        series.first().timestamp,
        series.last().timestamp
    );
    Ok(series)
}

/// Read a Parquet file into a DataFrame.
pub fn load_parquet(path: &Path) -> Result<DataFrame, AppError> {
    let file = File::open(path)?;
    let df = ParquetReader::new(file).finish()?;
    Ok(df)
}

/// Convert a DataFrame with a timestamp column and OHLCV columns into bars.
pub fn bars_from_dataframe(df: &DataFrame) -> Result<Vec<PriceBar>, AppError> {
    let timestamps = timestamps_from_column(timestamp_column(df)?)?;
    let open = f64_values(df, "open")?;
    let high = f64_values(df, "high")?;
    let low = f64_values(df, "low")?;
    let close = f64_values(df, "close")?;
    let volume = f64_values(df, "volume")?;

    let bars = timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| PriceBar {
            timestamp,
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            volume: volume[i],
        })
        .collect();
    Ok(bars)
}

/// Write bars to Parquet in the layout `load_dataset` reads back.
pub fn write_parquet(bars: &[PriceBar], path: &Path) -> Result<(), AppError> {
    let micros: Vec<i64> = bars
        .iter()
        .map(|b| b.timestamp.and_utc().timestamp_micros())
        .collect();
    let timestamp = Series::new("timestamp".into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let column = |name: &str, f: fn(&PriceBar) -> f64| {
        Column::new(name.into(), bars.iter().map(f).collect::<Vec<f64>>())
    };

    let mut df = DataFrame::new(vec![
        Column::from(timestamp),
        column("open", |b: &PriceBar| b.open),
        column("high", |b: &PriceBar| b.high),
        column("low", |b: &PriceBar| b.low),
        column("close", |b: &PriceBar| b.close),
        column("volume", |b: &PriceBar| b.volume),
    ])?;

    let mut file = File::create(path)?;
    ParquetWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

/// Load a CSV file with a header row.
pub fn load_csv(path: &Path) -> Result<Vec<PriceBar>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let ts_idx = TIMESTAMP_COLUMNS
        .iter()
        .find_map(|name| find(name))
        .ok_or_else(|| AppError::MissingColumn("timestamp".into()))?;
    let value_idx = VALUE_COLUMNS
        .iter()
        .map(|name| find(name).ok_or_else(|| AppError::MissingColumn(name.to_string())))
        .collect::<Result<Vec<usize>, AppError>>()?;

    let mut bars = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let raw_ts = field(ts_idx);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| AppError::CsvParseError {
            row,
            message: format!("invalid timestamp '{}'", raw_ts),
        })?;

        let mut values = [0.0f64; 5];
        for (slot, (&idx, name)) in values.iter_mut().zip(value_idx.iter().zip(VALUE_COLUMNS)) {
            *slot = field(idx)
                .parse::<f64>()
                .map_err(|e| AppError::CsvParseError {
                    row,
                    message: format!("{}: {}", name, e),
                })?;
        }

        bars.push(PriceBar {
            timestamp,
            open: values[0],
            high: values[1],
            low: values[2],
            close: values[3],
            volume: values[4],
        });
    }

    Ok(bars)
}

// ── Helpers ──

/// A well-known timestamp column name, falling back to the last temporal
/// column (pandas writes the index after the data columns).
fn timestamp_column(df: &DataFrame) -> Result<&Column, AppError> {
    if let Some(col) = TIMESTAMP_COLUMNS
        .iter()
        .find_map(|name| df.column(name).ok())
    {
        return Ok(col);
    }
    df.get_columns()
        .iter()
        .rev()
        .find(|c| matches!(c.dtype(), DataType::Datetime(_, _) | DataType::Date))
        .ok_or_else(|| AppError::MissingColumn("timestamp".into()))
}

fn timestamps_from_column(col: &Column) -> Result<Vec<NaiveDateTime>, AppError> {
    let null_at = |row: usize| {
        AppError::InvalidTimestamp(format!("null in '{}' at row {}", col.name(), row))
    };

    match col.dtype() {
        DataType::Datetime(unit, tz) => {
            let unit = *unit;
            let tz = tz
                .as_ref()
                .map(|name| {
                    name.as_str().parse::<Tz>().map_err(|e| {
                        AppError::InvalidTimestamp(format!("time zone '{}': {}", name, e))
                    })
                })
                .transpose()?;
            let physical = col.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let v = v.ok_or_else(|| null_at(row))?;
                    epoch_to_naive(v, unit, tz).ok_or_else(|| {
                        AppError::InvalidTimestamp(format!("{} out of range at row {}", v, row))
                    })
                })
                .collect()
        }
        DataType::Date => {
            let physical = col.cast(&DataType::Int32)?;
            physical
                .i32()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let days = v.ok_or_else(|| null_at(row))?;
                    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_CE_DAYS)
                        .map(|d| d.and_time(NaiveTime::MIN))
                        .ok_or_else(|| {
                            AppError::InvalidTimestamp(format!("day {} out of range", days))
                        })
                })
                .collect()
        }
        DataType::String => col
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                let raw = v.ok_or_else(|| null_at(row))?;
                parse_timestamp(raw).ok_or_else(|| {
                    AppError::InvalidTimestamp(format!("'{}' at row {}", raw, row))
                })
            })
            .collect(),
        other => Err(AppError::InvalidTimestamp(format!(
            "column '{}' has unsupported type {}",
            col.name(),
            other
        ))),
    }
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, AppError> {
    let col = df
        .column(name)
        .map_err(|_| AppError::MissingColumn(name.to_string()))?;
    let values = col.cast(&DataType::Float64)?;
    values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                AppError::ParquetConversion(format!("null in '{}' at row {}", name, row))
            })
        })
        .collect()
}

/// Wall-clock time of an epoch value: local to `tz` when the column carries
/// one, UTC otherwise. Calendar dates follow the same wall clock.
fn epoch_to_naive(value: i64, unit: TimeUnit, tz: Option<Tz>) -> Option<NaiveDateTime> {
    let dt: Option<DateTime<Utc>> = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    dt.map(|d| match tz {
        Some(tz) => d.with_timezone(&tz).naive_local(),
        None => d.naive_utc(),
    })
}

/// Parse the timestamp spellings pandas and common exporters produce.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.naive_local());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

use serde::Serialize;
use tracing::warn;

use crate::models::bar::PriceBar;
use crate::models::chart::{
    Axis, CandlestickTrace, Figure, Layout, Legend, Line, RangeSlider, ScatterTrace, Title, Trace,
};
use crate::models::config::DashboardConfig;

use super::pipeline::DisplaySeries;

const X_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const VOLUME_COLOR: &str = "#1f77b4";
const PRICE_COLOR: &str = "#ff7f0e";

/// Both figures plus the optional aggregation banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub notice: Option<String>,
    pub price: Figure,
    pub combo: Figure,
}

pub fn render_charts(display: &DisplaySeries<'_>, config: &DashboardConfig) -> ChartSet {
    let bars = display.bars();
    ChartSet {
        notice: aggregation_notice(display),
        price: price_chart(bars, config),
        combo: volume_price_chart(bars),
    }
}

/// Banner text shown when the charts display daily buckets.
pub fn aggregation_notice(display: &DisplaySeries<'_>) -> Option<String> {
    match display {
        DisplaySeries::Raw { .. } => None,
        DisplaySeries::Aggregated { original_count, .. } => {
            let message = format!(
                "Too much data ({} points). Showing daily aggregation for responsiveness.",
                original_count
            );
            warn!("{}", message);
            Some(message)
        }
    }
}

/// Candlestick chart. The y axis spans exactly [min low, max high].
pub fn price_chart(bars: &[PriceBar], config: &DashboardConfig) -> Figure {
    let trace = CandlestickTrace {
        name: config.asset_name.clone(),
        x: x_values(bars),
        open: bars.iter().map(|b| b.open).collect(),
        high: bars.iter().map(|b| b.high).collect(),
        low: bars.iter().map(|b| b.low).collect(),
        close: bars.iter().map(|b| b.close).collect(),
    };

    Figure {
        data: vec![Trace::Candlestick(trace)],
        layout: Layout {
            title: Some(Title::new(format!("{} price (close)", config.asset_name))),
            height: Some(config.price_chart_height),
            xaxis: Axis {
                title: Some(Title::new("Date")),
                rangeslider: Some(RangeSlider {
                    visible: true,
                    thickness: 0.05,
                }),
                ..Default::default()
            },
            yaxis: Axis {
                title: Some(Title::new("Price (USD)")),
                range: price_range(bars),
                tickformat: Some("$,.0f".into()),
                separatethousands: Some(true),
                fixedrange: Some(false),
                ..Default::default()
            },
            ..Default::default()
        },
    }
}

/// Volume on the left axis, close price on the right, one shared time axis.
/// Volume is drawn as a thin translucent line.
pub fn volume_price_chart(bars: &[PriceBar]) -> Figure {
    let x = x_values(bars);
    let volume = ScatterTrace {
        name: "Volume".into(),
        mode: "lines".into(),
        x: x.clone(),
        y: bars.iter().map(|b| b.volume).collect(),
        yaxis: None,
        line: Line {
            color: VOLUME_COLOR.into(),
            width: 1.0,
        },
        opacity: Some(0.5),
    };
    let price = ScatterTrace {
        name: "Price".into(),
        mode: "lines".into(),
        x,
        y: bars.iter().map(|b| b.close).collect(),
        yaxis: Some("y2".into()),
        line: Line {
            color: PRICE_COLOR.into(),
            width: 2.0,
        },
        opacity: None,
    };

    Figure {
        data: vec![Trace::Scatter(volume), Trace::Scatter(price)],
        layout: Layout {
            title: Some(Title::new("Volume (left) and price (right)")),
            xaxis: Axis {
                title: Some(Title::new("Date")),
                ..Default::default()
            },
            yaxis: Axis {
                title: Some(Title::new("Volume")),
                separatethousands: Some(true),
                ..Default::default()
            },
            yaxis2: Some(Axis {
                title: Some(Title::new("Price ($)")),
                overlaying: Some("y".into()),
                side: Some("right".into()),
                separatethousands: Some(true),
                ..Default::default()
            }),
            hovermode: Some("x unified".into()),
            legend: Some(Legend {
                x: 0.0,
                y: 1.1,
                orientation: "h".into(),
            }),
            ..Default::default()
        },
    }
}

/// `None` for an empty series; plotly then autoranges an empty frame.
fn price_range(bars: &[PriceBar]) -> Option<[f64; 2]> {
    if bars.is_empty() {
        return None;
    }
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    Some([low, high])
}

fn x_values(bars: &[PriceBar]) -> Vec<String> {
    bars.iter()
        .map(|b| b.timestamp.format(X_FORMAT).to_string())
        .collect()
}

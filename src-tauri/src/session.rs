use chrono::NaiveDate;
use tracing::info;

use crate::data::cache::DatasetCache;
use crate::engine::{charts, metrics, pipeline, selector};
use crate::errors::AppError;
use crate::models::bar::TimeSeries;
use crate::models::config::DashboardConfig;
use crate::models::range::DateBounds;
use crate::models::view::DashboardView;

/// One dashboard session: the config and the memoized dataset.
///
/// Every user interaction is one call to [`Session::render`], which runs
/// selector → pipeline → {metrics, charts} to completion.
pub struct Session {
    config: DashboardConfig,
    data: DatasetCache,
}

impl Session {
    /// Session reading the dataset from `config.data_file`.
    pub fn new(config: DashboardConfig) -> Self {
        let data = DatasetCache::new(&config.data_file);
        Self { config, data }
    }

    pub fn with_cache(config: DashboardConfig, data: DatasetCache) -> Self {
        Self { config, data }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn series(&self) -> Result<&TimeSeries, AppError> {
        self.data.get()
    }

    pub fn bounds(&self) -> Result<DateBounds, AppError> {
        Ok(selector::bounds(self.series()?))
    }

    /// Render the dashboard for the given control values. A missing side
    /// defaults to the dataset bound.
    ///
    /// Fails only when the dataset cannot be loaded.
    pub fn render(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DashboardView, AppError> {
        let series = self.series()?;
        let bounds = selector::bounds(series);
        let range = selector::select(bounds, start, end);

        let output = pipeline::process(series, &range, self.config.aggregation_threshold);
        let summary = metrics::summary_view(metrics::summarize(output.filtered));
        let charts = charts::render_charts(&output.display, &self.config);

        info!(
            "Rendered {} → {}: {} rows, aggregated={}",
            range.start_date(),
            range.end_date(),
            output.filtered.len(),
            output.aggregated()
        );

        Ok(DashboardView {
            title: format!("{} analysis", self.config.asset_name),
            bounds,
            range,
            filtered_rows: output.filtered.len(),
            aggregated: output.aggregated(),
            notice: charts.notice,
            summary,
            price_chart: charts.price,
            combo_chart: charts.combo,
        })
    }
}

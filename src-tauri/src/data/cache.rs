use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::bar::TimeSeries;

use super::loader;

type LoadFn = Box<dyn Fn() -> Result<TimeSeries, AppError> + Send + Sync>;

/// Memoized dataset: loaded on first access, then shared read-only for the
/// rest of the session.
///
/// Interactions are handled one at a time, so the `OnceLock` only has to
/// guarantee a single stored value; there is no lock around reads.
pub struct DatasetCache {
    source: String,
    load: LoadFn,
    cell: OnceLock<TimeSeries>,
}

impl DatasetCache {
    /// Cache backed by the file loader.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        let source = path.display().to_string();
        Self::with_loader(source, move || loader::load_dataset(&path))
    }

    /// Cache backed by an arbitrary loader. `source` names it in errors.
    pub fn with_loader<F>(source: impl Into<String>, load: F) -> Self
    where
        F: Fn() -> Result<TimeSeries, AppError> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            load: Box::new(load),
            cell: OnceLock::new(),
        }
    }

    /// The cached series, loading it on first call.
    ///
    /// Any loader failure surfaces as `DataUnavailable`. Failures are not
    /// cached: the next call tries again.
    pub fn get(&self) -> Result<&TimeSeries, AppError> {
        if let Some(series) = self.cell.get() {
            return Ok(series);
        }

        let series = (self.load)().map_err(|e| {
            warn!("Dataset load failed for {}: {}", self.source, e);
            AppError::DataUnavailable {
                path: self.source.clone(),
                reason: e.to_string(),
            }
        })?;
        info!("Dataset cached: {} bars from {}", series.len(), self.source);
        Ok(self.cell.get_or_init(|| series))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

//! Saved chart responses on disk.

use std::path::PathBuf;

use tracing::info;

use super::{parse_chart_response, DataSource, QueryWindow};
use crate::error::SourceError;
use crate::series::TimeSeries;

/// Reads a chart API response previously saved as JSON. The window is
/// ignored: the file already holds whatever span was queried.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl DataSource for FileSource {
    async fn fetch(&self, _window: &QueryWindow) -> Result<Vec<TimeSeries>, SourceError> {
        info!(path = %self.path.display(), "Reading saved chart response");
        let body = tokio::fs::read_to_string(&self.path).await?;
        parse_chart_response(&body)
    }
}

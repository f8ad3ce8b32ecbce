use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::aggregate;
use crate::config::AggregationConfig;
use crate::error::{DashboardError, Result};
use crate::ingest;
use crate::models::{SummaryResult, ViewKind};
use crate::table::Table;

/// How the active table arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    LocalFile,
    Upload,
}

#[derive(Debug)]
pub struct Snapshot {
    pub table: Table,
    pub source_name: String,
    pub origin: Origin,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn status_message(&self) -> String {
        match self.origin {
            Origin::LocalFile => format!("Using local file: {}", self.source_name),
            Origin::Upload => format!("File '{}' loaded successfully.", self.source_name),
        }
    }
}

/// Owns the current table. Loads swap the whole snapshot; readers clone the `Arc` first.
#[derive(Debug)]
pub struct Dashboard {
    current: RwLock<Option<Arc<Snapshot>>>,
    config: AggregationConfig,
}

impl Dashboard {
    pub fn new(config: AggregationConfig) -> Self {
        Dashboard {
            current: RwLock::new(None),
            config,
        }
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Loads the default local file if present. A missing file is not an error;
    /// an unreadable one leaves the dashboard empty and is returned to the caller.
    pub fn startup(&self, default_path: &Path) -> Result<Option<String>> {
        if !default_path.exists() {
            info!(path = %default_path.display(), "no local data file");
            return Ok(None);
        }
        let table = ingest::read_path(default_path).inspect_err(|err| {
            warn!(error = %err, "failed to load local data file");
        })?;
        let source_name = ingest::source_name(default_path);
        Ok(Some(self.install(table, source_name, Origin::LocalFile)))
    }

    pub fn load_path(&self, path: &Path) -> Result<String> {
        let table = ingest::read_path(path).inspect_err(|err| {
            warn!(error = %err, "upload rejected; keeping previous data");
        })?;
        Ok(self.install(table, ingest::source_name(path), Origin::Upload))
    }

    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let table = ingest::read_bytes(name, bytes).inspect_err(|err| {
            warn!(error = %err, "upload rejected; keeping previous data");
        })?;
        Ok(self.install(table, name.to_string(), Origin::Upload))
    }

    #[cfg(test)]
    pub(crate) fn replace(&self, table: Table, source_name: &str) -> String {
        self.install(table, source_name.to_string(), Origin::Upload)
    }

    fn install(&self, table: Table, source_name: String, origin: Origin) -> String {
        let snapshot = Arc::new(Snapshot {
            table,
            source_name,
            origin,
            loaded_at: Utc::now(),
        });
        let message = snapshot.status_message();
        info!(
            source = %snapshot.source_name,
            rows = snapshot.table.len(),
            "activated table"
        );

        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = Some(snapshot);
        message
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        let current = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        current.clone()
    }

    pub fn status(&self) -> String {
        match self.snapshot() {
            Some(snapshot) => snapshot.status_message(),
            None => "Waiting for file...".to_string(),
        }
    }

    pub fn render(&self, view: ViewKind) -> Result<SummaryResult> {
        let snapshot = self.snapshot().ok_or(DashboardError::NoData)?;
        aggregate::summarize_with(&snapshot.table, view, &self.config)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard::new(AggregationConfig::default())
    }
}

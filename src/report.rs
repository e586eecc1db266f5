//! Resumen persistido de una corrida (`run_summary.json`): lo que consume el
//! ensamblador de reportes.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use eda_core::{Artifact, RunStatus, RunSummary, StepRecord};
use eda_domain::{ColumnKind, Dataset};

use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub report_title: &'a str,
    pub generated_at: DateTime<Utc>,
    pub run_id: String,
    pub status: RunStatus,
    pub fingerprint: &'a str,
    pub plan_hash: &'a str,
    pub target: Option<&'a str>,
    pub rows: usize,
    /// Esquema inferido, en el orden de las columnas.
    pub columns: IndexMap<&'a str, ColumnKind>,
    pub steps: &'a [StepRecord],
    pub manifest: &'a [Artifact],
}

impl<'a> RunReport<'a> {
    pub fn new(title: &'a str, dataset: &'a Dataset, summary: &'a RunSummary) -> Self {
        Self { report_title: title,
               generated_at: Utc::now(),
               run_id: summary.run_id.to_string(),
               status: summary.status(),
               fingerprint: &summary.fingerprint,
               plan_hash: &summary.plan_hash,
               target: summary.target.as_deref(),
               rows: dataset.n_rows(),
               columns: dataset.columns().iter().map(|c| (c.name(), c.kind())).collect(),
               steps: &summary.steps,
               manifest: &summary.manifest }
    }

    /// Escribe el resumen como JSON legible y devuelve la ruta.
    pub fn write_to(&self, path: &Path) -> Result<PathBuf, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)?;
        log::info!("Run summary written to {}", path.display());
        Ok(path.to_path_buf())
    }
}

use std::path::{Path, PathBuf};

use eda_domain::Dataset;
use serde_json::Value;

use super::StepExecution;
use crate::constants::CHARTS_DIR;
use crate::errors::StepError;
use crate::store::ArtifactSink;

/// Contexto de ejecución entregado a `StepDefinition::execute`.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    pub dataset: &'a Dataset,
    /// Variable objetivo, si la corrida tiene una configurada.
    pub target: Option<&'a str>,
    pub output_dir: &'a Path,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(dataset: &'a Dataset, target: Option<&'a str>, output_dir: &'a Path) -> Self {
        Self { dataset,
               target,
               output_dir }
    }

    /// Ruta relativa al directorio de salida para un chart (`charts/<file>`).
    pub fn chart_file(&self, file_name: &str) -> PathBuf {
        Path::new(CHARTS_DIR).join(file_name)
    }

    /// Ruta absoluta donde se escribe un chart.
    pub fn chart_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(self.chart_file(file_name))
    }
}

/// Contrato común de un step de análisis. Implementaciones no guardan estado
/// entre ejecuciones y no modifican el dataset.
pub trait StepDefinition {
    /// Identificador del tipo de step (`profile`, `univariate`, ...). Es
    /// también el namespace de sus artifacts.
    fn kind(&self) -> &str;

    /// Indica si el step necesita variable objetivo en su configuración
    /// actual. Sin objetivo, el engine lo marca `Skipped`.
    fn requires_target(&self) -> bool { false }

    /// Parámetros efectivos (defaults + overrides) en forma canónica.
    fn base_params(&self) -> Value;

    fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError>;
}

//! edaflow
//!
//! Librería de aplicación sobre los crates del workspace:
//! - `config`: archivo YAML de análisis y overrides de entorno.
//! - `errors`: error unificado de la aplicación.
//! - `report`: resumen persistido de la corrida (`run_summary.json`).
//!
//! `analyze` encadena carga del dataset, construcción del plan, ejecución y
//! escritura del resumen. Lo usa `eda-cli` y puede usarse desde otros
//! clientes.

pub mod config;
pub mod errors;
pub mod report;

use std::path::PathBuf;
use std::sync::Arc;

use eda_core::{PipelineEngine, PipelinePlan, RunSummary};
use eda_domain::{read_dataset, Dataset};
use eda_steps::{default_registry, ChartRenderer, SvgChartRenderer};

pub use config::{AnalysisConfig, EnvConfig, ENV};
pub use errors::AppError;
pub use report::RunReport;

/// Resultado de `analyze`: el resumen del engine y dónde quedó escrito.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub summary: RunSummary,
    pub summary_path: PathBuf,
}

/// Lee el dataset de `config.input_file` y corre el pipeline.
pub fn analyze(config: &AnalysisConfig) -> Result<AnalysisOutcome, AppError> {
    log::info!("Loading dataset from {}", config.input_file.display());
    let dataset = read_dataset(&config.input_file)?;
    log::info!("Dataset loaded: {} rows, {} columns", dataset.n_rows(), dataset.n_columns());
    analyze_dataset(&dataset, config, Arc::new(SvgChartRenderer::default()))
}

/// Corre el pipeline sobre un dataset ya cargado con el renderer dado.
///
/// Los errores de configuración del pipeline se detectan antes de ejecutar
/// cualquier step; en ese caso no se escribe nada en `output_dir`.
pub fn analyze_dataset(dataset: &Dataset,
                       config: &AnalysisConfig,
                       renderer: Arc<dyn ChartRenderer>)
                       -> Result<AnalysisOutcome, AppError> {
    let registry = default_registry(renderer);
    let plan = PipelinePlan::from_entries(&config.analysis_pipeline, &registry)?;
    log::info!("Pipeline planned with {} enabled steps", plan.enabled().count());

    let mut engine = PipelineEngine::builder(registry).output_dir(&config.output_dir)
                                                      .fail_fast(config.fail_fast)
                                                      .build();
    let summary = engine.run(dataset, &plan, config.target_variable.as_deref())?;

    let summary_path = RunReport::new(&config.report_title, dataset, &summary).write_to(&config.summary_path())?;
    log::info!("Run {} finished with status {:?}", summary.run_id, summary.status());
    Ok(AnalysisOutcome { summary, summary_path })
}

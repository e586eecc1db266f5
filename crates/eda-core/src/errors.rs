//! Errores del core, separados por clase:
//! - `ConfigError`: configuración inválida, se detecta antes de ejecutar
//!   cualquier step y aborta la corrida completa.
//! - `StepError`: error local de un step; se registra como `Failed` en el
//!   resumen y la corrida continúa.
//! - `ArtifactError`: violación del invariante de unicidad de nombres.
//! - `EngineError`: lo que devuelve `PipelineEngine::run`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("unknown step kind: {0}")] UnknownStepKind(String),
    #[error("unknown target column: {0}")] UnknownTargetColumn(String),
    #[error("malformed options for step '{kind}': {reason}")] MalformedOptions { kind: String, reason: String },
    #[error("malformed pipeline entry: {0}")] MalformedEntry(String),
    #[error("step kind '{0}' is enabled more than once")] DuplicateStepKind(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StepError {
    #[error("column not found: {0}")] MissingColumn(String),
    #[error("plot type '{plot}' is not supported for {kind} column '{column}'")]
    UnsupportedPlot { column: String, plot: String, kind: String },
    #[error("insufficient numerical columns")] InsufficientNumericalColumns,
    #[error("no charts produced")] NoChartsProduced,
    #[error("chart rendering failed: {0}")] Render(String),
    /// Defecto interno (p. ej. artifact duplicado). No es recuperable.
    #[error("invariant violated: {0}")] Invariant(String),
}

impl StepError {
    /// Los errores fatales abortan la corrida en lugar de registrarse como
    /// `Failed`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StepError::Invariant(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum ArtifactError {
    #[error("duplicate artifact: {0}")] Duplicate(String),
}

impl From<ArtifactError> for StepError {
    fn from(e: ArtifactError) -> Self {
        StepError::Invariant(e.to_string())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EngineError {
    #[error("configuration error: {0}")] Config(#[from] ConfigError),
    #[error("invariant violated: {0}")] Invariant(String),
    #[error("io error: {0}")] Io(String),
}

impl From<ArtifactError> for EngineError {
    fn from(e: ArtifactError) -> Self {
        EngineError::Invariant(e.to_string())
    }
}

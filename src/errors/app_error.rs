use thiserror::Error;

use eda_core::{ConfigError, EngineError};
use eda_domain::DomainError;

/// Errores de la aplicación (carga de configuración, dataset y corrida).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigError),
    #[error("Error en YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Error de dataset: {0}")]
    Domain(#[from] DomainError),
    #[error("Error del engine: {0}")]
    Engine(#[from] EngineError),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error en JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// `true` si el problema está en la configuración (y no en datos o IO).
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Yaml(_) | AppError::Engine(EngineError::Config(_)))
    }
}

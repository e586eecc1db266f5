//! Configuración de la aplicación.
//!
//! - `AnalysisConfig`: archivo YAML con el dataset, el directorio de salida,
//!   la variable objetivo y el pipeline de análisis.
//! - `EnvConfig`: overrides desde variables de entorno (.env incluido),
//!   expuestos como instancia global perezosa (`ENV`).
use std::env;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

pub const DEFAULT_REPORT_TITLE: &str = "EDA Report";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Overrides de entorno.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    /// `EDAFLOW_OUTPUT_DIR`: reemplaza `output_dir` del archivo.
    pub output_dir: Option<PathBuf>,
    /// `EDAFLOW_FAIL_FAST`: `1`, `true` o `yes` activan fail-fast.
    pub fail_fast: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        let output_dir = env::var("EDAFLOW_OUTPUT_DIR").ok()
                                                       .filter(|v| !v.trim().is_empty())
                                                       .map(PathBuf::from);
        let fail_fast = env::var("EDAFLOW_FAIL_FAST").ok().is_some_and(|v| parse_flag(&v));
        Self { output_dir, fail_fast }
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Instancia global perezosa, evaluada una sola vez (lee `.env` si existe).
pub static ENV: Lazy<EnvConfig> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
    EnvConfig::from_env()
});

/// Archivo de configuración de una corrida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_title")]
    pub report_title: String,
    #[serde(default)]
    pub target_variable: Option<String>,
    #[serde(default)]
    pub fail_fast: bool,
    /// Entradas `{ tipo: { enabled, ...opciones } }`, en orden.
    #[serde(default)]
    pub analysis_pipeline: Vec<Value>,
}

fn default_title() -> String { DEFAULT_REPORT_TITLE.to_string() }

impl AnalysisConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AppError> {
        let mut config: AnalysisConfig = serde_yaml::from_str(yaml)?;
        if config.target_variable.as_deref().is_some_and(|t| t.trim().is_empty()) {
            config.target_variable = None;
        }
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        log::info!("Reading the configuration file from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        log::info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Aplica los overrides de entorno.
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(dir) = &env.output_dir {
            self.output_dir = dir.clone();
        }
        self.fail_fast |= env.fail_fast;
        self
    }

    pub fn summary_path(&self) -> PathBuf { self.output_dir.join(SUMMARY_FILE) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const YAML: &str = r#"
input_file: data/houses.csv
output_dir: reports
target_variable: price
analysis_pipeline:
  - profile:
  - univariate:
      plot_types:
        numerical: [histogram]
  - multivariate:
      enabled: false
"#;

    #[test]
    fn parses_pipeline_entries_in_order() {
        let cfg = AnalysisConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(cfg.report_title, DEFAULT_REPORT_TITLE);
        assert_eq!(cfg.target_variable.as_deref(), Some("price"));
        assert_eq!(cfg.analysis_pipeline,
                   vec![json!({"profile": null}),
                        json!({"univariate": {"plot_types": {"numerical": ["histogram"]}}}),
                        json!({"multivariate": {"enabled": false}})]);
    }

    #[test]
    fn missing_required_fields_is_an_error() {
        let err = AnalysisConfig::from_yaml_str("output_dir: out\n").unwrap_err();
        assert!(matches!(err, AppError::Yaml(_)));
    }

    #[test]
    fn env_overrides_output_dir_and_fail_fast() {
        let cfg = AnalysisConfig::from_yaml_str(YAML).unwrap();
        let env = EnvConfig { output_dir: Some(PathBuf::from("/tmp/eda")),
                              fail_fast: true };
        let cfg = cfg.with_env(&env);
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/eda"));
        assert!(cfg.fail_fast);
        assert_eq!(cfg.summary_path(), PathBuf::from("/tmp/eda/run_summary.json"));
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}

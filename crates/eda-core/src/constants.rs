//! Constantes del motor core.
//!
//! `ENGINE_VERSION` forma parte del input del fingerprint de cada corrida:
//! cambiarla invalida la comparación entre corridas de versiones distintas.

/// Versión lógica del motor. Mantener estable mientras no cambie el esquema
/// de nombres de artifacts.
pub const ENGINE_VERSION: &str = "E1.0";

/// Subcarpeta (bajo el directorio de salida) donde se escriben los charts.
pub const CHARTS_DIR: &str = "charts";

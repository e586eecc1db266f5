//! Artifact producido por un step.
//!
//! Un `Artifact` es una unidad de salida con nombre estable
//! `stepKind.subject.kind` (ver `ArtifactKey`). Su contenido es:
//! - una tabla de estadísticas (`StatsTable`): métricas ordenadas por nombre;
//! - o una referencia a chart (`ChartRef`): archivo bajo `charts/` más las
//!   columnas de origen.
//!
//! `hash` lo asigna el `ArtifactStore` al confirmar el artifact, sobre el
//! JSON canónico del payload.
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Clave direccionable de un artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub step: String,
    pub subject: String,
    pub kind: String,
}

impl ArtifactKey {
    pub fn new(step: impl Into<String>, subject: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { step: step.into(),
               subject: subject.into(),
               kind: kind.into() }
    }

    /// Nombre lógico `step.subject.kind`.
    pub fn name(&self) -> String {
        format!("{}.{}.{}", self.step, self.subject, self.kind)
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.step, self.subject, self.kind)
    }
}

/// Valor de una métrica. `Undefined` marca explícitamente una métrica que no
/// puede calcularse (p. ej. desviación estándar de una columna vacía); en JSON
/// se serializa como `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Undefined,
    Count(u64),
    Number(f64),
    Text(String),
    Table(IndexMap<String, MetricValue>),
}

impl MetricValue {
    /// Número finito o `Undefined`; nunca almacena `NaN`/infinito.
    pub fn number(x: f64) -> Self {
        if x.is_finite() {
            MetricValue::Number(x)
        } else {
            MetricValue::Undefined
        }
    }

    pub fn maybe_number(x: Option<f64>) -> Self {
        x.map(Self::number).unwrap_or(MetricValue::Undefined)
    }

    pub fn count(n: usize) -> Self { MetricValue::Count(n as u64) }

    pub fn text(s: impl Into<String>) -> Self { MetricValue::Text(s.into()) }

    pub fn is_undefined(&self) -> bool { matches!(self, MetricValue::Undefined) }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(x) => Some(*x),
            MetricValue::Count(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            MetricValue::Count(n) => Some(*n),
            _ => None,
        }
    }
}

/// Tabla de métricas (por columna o por par de columnas).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsTable {
    pub source_columns: Vec<String>,
    pub metrics: IndexMap<String, MetricValue>,
}

impl StatsTable {
    pub fn new(source_columns: Vec<String>) -> Self {
        Self { source_columns,
               metrics: IndexMap::new() }
    }

    pub fn with(mut self, name: impl Into<String>, value: MetricValue) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: MetricValue) {
        self.metrics.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> { self.metrics.get(name) }
}

/// Referencia a un chart escrito en disco.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRef {
    pub title: String,
    pub chart_type: String,
    /// Ruta relativa al directorio de salida (`charts/<archivo>`).
    pub file: PathBuf,
    pub source_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactPayload {
    Stats(StatsTable),
    Chart(ChartRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub key: ArtifactKey,
    pub payload: ArtifactPayload,
    pub hash: String,
}

impl Artifact {
    /// Constructor interno; el hash se asigna al confirmar en el store.
    pub(crate) fn new_unhashed(key: ArtifactKey, payload: ArtifactPayload) -> Self {
        Self { name: key.name(),
               key,
               payload,
               hash: String::new() }
    }

    pub fn source_columns(&self) -> &[String] {
        match &self.payload {
            ArtifactPayload::Stats(t) => &t.source_columns,
            ArtifactPayload::Chart(c) => &c.source_columns,
        }
    }

    pub fn as_chart(&self) -> Option<&ChartRef> {
        match &self.payload {
            ArtifactPayload::Chart(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_stats(&self) -> Option<&StatsTable> {
        match &self.payload {
            ArtifactPayload::Stats(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_chart(&self) -> bool { self.as_chart().is_some() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_metrics_serialize_as_null() {
        let t = StatsTable::new(vec!["a".into()]).with("std", MetricValue::number(f64::NAN))
                                                 .with("count", MetricValue::count(0));
        let v = serde_json::to_value(&t).unwrap();
        assert!(v["metrics"]["std"].is_null());
        assert_eq!(v["metrics"]["count"], 0);
        assert!(t.get("std").unwrap().is_undefined());
    }

    #[test]
    fn key_name_is_dotted() {
        let k = ArtifactKey::new("univariate", "age", "histogram");
        assert_eq!(k.name(), "univariate.age.histogram");
        assert_eq!(k.to_string(), k.name());
    }
}

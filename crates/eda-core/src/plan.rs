//! Plan de pipeline: lista ordenada de `StepSpec` derivada de la
//! configuración.
//!
//! Formato de cada entrada de configuración: un mapa con una sola clave (el
//! tipo de step) cuyo valor son las opciones del step:
//!
//! ```yaml
//! - univariate:
//!     enabled: true
//!     plot_types: { numerical: [histogram] }
//! ```
//!
//! `enabled` es opcional (default `true`); un cuerpo nulo equivale a `{}`.
//!
//! Validación al construir el plan (nunca durante la ejecución):
//! - todo tipo de step debe estar registrado, incluso si está deshabilitado;
//! - las opciones de los steps habilitados se validan construyendo el step;
//! - un mismo tipo no puede estar habilitado dos veces (compartirían
//!   namespace de artifacts).
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ConfigError;
use crate::hashing::hash_value;
use crate::registry::StepRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub kind: String,
    pub enabled: bool,
    /// Opciones específicas del step, sin la clave `enabled`.
    pub options: Value,
}

impl StepSpec {
    pub fn new(kind: impl Into<String>, options: Value) -> Self {
        Self { kind: kind.into(),
               enabled: true,
               options }
    }

    pub fn disabled(kind: impl Into<String>, options: Value) -> Self {
        Self { enabled: false,
               ..Self::new(kind, options) }
    }

    /// Interpreta una entrada `{ kind: { enabled, ...opciones } }`.
    pub fn from_entry(entry: &Value) -> Result<Self, ConfigError> {
        let map = entry.as_object()
                       .ok_or_else(|| ConfigError::MalformedEntry(format!("expected a mapping, got {entry}")))?;
        if map.len() != 1 {
            return Err(ConfigError::MalformedEntry(format!("expected exactly one step kind per entry, got {}",
                                                           map.len())));
        }
        let Some((kind, body)) = map.iter().next() else {
            return Err(ConfigError::MalformedEntry("empty entry".into()));
        };
        let mut options: Map<String, Value> = match body {
            Value::Null => Map::new(),
            Value::Object(o) => o.clone(),
            other => {
                return Err(ConfigError::MalformedOptions { kind: kind.clone(),
                                                           reason: format!("expected a mapping, got {other}") })
            }
        };
        let enabled = match options.remove("enabled") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => b,
            Some(other) => {
                return Err(ConfigError::MalformedOptions { kind: kind.clone(),
                                                           reason: format!("'enabled' must be a boolean, got {other}") })
            }
        };
        Ok(Self { kind: kind.clone(),
                  enabled,
                  options: Value::Object(options) })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelinePlan {
    specs: Vec<StepSpec>,
    plan_hash: String,
}

impl PipelinePlan {
    /// Valida los specs contra el registro y construye el plan.
    pub fn build<S>(specs: Vec<StepSpec>, registry: &StepRegistry<S>) -> Result<Self, ConfigError> {
        let mut enabled_kinds = HashSet::new();
        for spec in &specs {
            if !registry.contains(&spec.kind) {
                return Err(ConfigError::UnknownStepKind(spec.kind.clone()));
            }
            if spec.enabled {
                if !enabled_kinds.insert(spec.kind.as_str()) {
                    return Err(ConfigError::DuplicateStepKind(spec.kind.clone()));
                }
                registry.resolve(spec)?;
            }
        }
        let plan_hash = hash_value(&serde_json::to_value(&specs).unwrap_or_default());
        Ok(Self { specs, plan_hash })
    }

    /// Construye el plan desde entradas de configuración crudas.
    pub fn from_entries<S>(entries: &[Value], registry: &StepRegistry<S>) -> Result<Self, ConfigError> {
        let specs = entries.iter().map(StepSpec::from_entry).collect::<Result<Vec<_>, _>>()?;
        Self::build(specs, registry)
    }

    pub fn specs(&self) -> &[StepSpec] { &self.specs }

    /// Specs habilitados, en orden.
    pub fn enabled(&self) -> impl Iterator<Item = &StepSpec> + '_ {
        self.specs.iter().filter(|s| s.enabled)
    }

    pub fn len(&self) -> usize { self.specs.len() }

    pub fn is_empty(&self) -> bool { self.specs.is_empty() }

    /// Hash canónico de los specs (tipo, enabled, opciones).
    pub fn plan_hash(&self) -> &str { &self.plan_hash }
}

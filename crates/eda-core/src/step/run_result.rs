use serde::{Deserialize, Serialize};

use crate::errors::StepError;

/// Resultado de procesar un ítem (columna o par de columnas) dentro de un
/// step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Produced { artifacts: Vec<String> },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub subject: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn produced(subject: impl Into<String>, artifacts: Vec<String>) -> Self {
        Self { subject: subject.into(),
               status: ItemStatus::Produced { artifacts } }
    }

    pub fn skipped(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { subject: subject.into(),
               status: ItemStatus::Skipped { reason: reason.into() } }
    }

    pub fn failed(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { subject: subject.into(),
               status: ItemStatus::Failed { reason: reason.into() } }
    }

    pub fn is_produced(&self) -> bool { matches!(self.status, ItemStatus::Produced { .. }) }

    pub fn is_failed(&self) -> bool { matches!(self.status, ItemStatus::Failed { .. }) }
}

/// Lo que devuelve un step al terminar sin error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepExecution {
    /// El step corrió; `items` detalla el resultado por columna/par (vacío si
    /// el step no trabaja por ítems).
    Completed { items: Vec<ItemOutcome> },
    /// El propio step decidió no hacer nada.
    Skipped { reason: String },
}

impl StepExecution {
    pub fn completed() -> Self { StepExecution::Completed { items: Vec::new() } }
}

/// Resultado de un step registrado en el resumen de la corrida. Exactamente
/// una variante.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    /// `issues` contiene sólo los ítems omitidos o fallidos.
    Success { artifacts: Vec<String>, issues: Vec<ItemOutcome> },
    Skipped { reason: String },
    Failed { error: StepError },
}

impl StepResult {
    pub fn is_success(&self) -> bool { matches!(self, StepResult::Success { .. }) }

    pub fn is_skipped(&self) -> bool { matches!(self, StepResult::Skipped { .. }) }

    pub fn is_failed(&self) -> bool { matches!(self, StepResult::Failed { .. }) }

    /// Nombres de artifacts aportados (vacío si no fue `Success`).
    pub fn artifacts(&self) -> &[String] {
        match self {
            StepResult::Success { artifacts, .. } => artifacts,
            _ => &[],
        }
    }

    /// Ítems fallidos dentro de un step exitoso.
    pub fn item_failures(&self) -> usize {
        match self {
            StepResult::Success { issues, .. } => issues.iter().filter(|i| i.is_failed()).count(),
            _ => 0,
        }
    }
}

/// Entrada del resumen: posición en el plan (entre steps habilitados), tipo y
/// resultado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub kind: String,
    pub result: StepResult,
}

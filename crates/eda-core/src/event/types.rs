//! Tipos de evento de una corrida y estructura `RunEvent`.
//!
//! Cada corrida del `PipelineEngine` emite eventos a un `EventStore`
//! append-only. Es la bitácora observable de la ejecución; el resumen final
//! (`RunSummary`) se arma en paralelo y no depende de estos eventos.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StepError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Primer evento de un `run_id`: fija el hash del plan y la cantidad de
    /// steps habilitados.
    RunInitialized { plan_hash: String, step_count: usize },
    /// Un step comenzó su ejecución. No implica éxito.
    StepStarted { step_index: usize, kind: String },
    /// Un step terminó bien; `artifacts` son los nombres confirmados.
    StepFinished { step_index: usize, kind: String, artifacts: Vec<String> },
    /// Un step no se ejecutó (sin objetivo, o corrida detenida).
    StepSkipped { step_index: usize, kind: String, reason: String },
    /// Un step terminó con error local. La corrida continúa salvo fail-fast.
    StepFailed { step_index: usize, kind: String, error: StepError },
    /// Cierre con el fingerprint de la corrida.
    RunCompleted { fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}

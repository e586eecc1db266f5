//! Resumen de una corrida: resultados por step en orden de ejecución más el
//! manifest plano de artifacts. Es la única interfaz hacia el ensamblador de
//! reportes.
use serde::Serialize;
use uuid::Uuid;

use crate::model::Artifact;
use crate::step::{RunStatus, StepRecord, StepResult};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub plan_hash: String,
    pub target: Option<String>,
    pub steps: Vec<StepRecord>,
    pub manifest: Vec<Artifact>,
    /// Hash de (versión del engine, plan, objetivo, nombres de artifacts y
    /// columnas de origen). Igual entre corridas idempotentes.
    pub fingerprint: String,
}

impl RunSummary {
    pub fn status(&self) -> RunStatus {
        let failed = self.steps.iter().any(|s| s.result.is_failed());
        let succeeded = self.steps.iter().any(|s| s.result.is_success());
        match (failed, succeeded) {
            (false, _) => RunStatus::Success,
            (true, true) => RunStatus::Partial,
            (true, false) => RunStatus::Failure,
        }
    }

    /// Tipos de step en el orden en que se registraron.
    pub fn step_kinds(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.kind.as_str()).collect()
    }

    pub fn result_for(&self, kind: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.kind == kind).map(|s| &s.result)
    }

    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.manifest.iter().find(|a| a.name == name)
    }

    /// Artifacts de un step, en orden.
    pub fn artifacts_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Artifact> + 'a {
        self.manifest.iter().filter(move |a| a.key.step == kind)
    }

    pub fn charts(&self) -> impl Iterator<Item = &Artifact> + '_ {
        self.manifest.iter().filter(|a| a.is_chart())
    }

    /// Pares (nombre, columnas de origen) del manifest.
    pub fn manifest_index(&self) -> Vec<(String, Vec<String>)> {
        self.manifest
            .iter()
            .map(|a| (a.name.clone(), a.source_columns().to_vec()))
            .collect()
    }
}

//! Core PipelineEngine implementation

use std::path::{Path, PathBuf};

use eda_domain::Dataset;
use serde_json::json;
use uuid::Uuid;

use super::{EngineBuilder, RunSummary};
use crate::constants::{CHARTS_DIR, ENGINE_VERSION};
use crate::errors::{ConfigError, EngineError};
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::hashing::hash_value;
use crate::model::Artifact;
use crate::plan::PipelinePlan;
use crate::registry::StepRegistry;
use crate::step::{ExecutionContext, ItemOutcome, StepDefinition, StepExecution, StepRecord, StepResult};
use crate::store::{ArtifactSink, ArtifactStore};

/// Opciones del engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Directorio de salida; los charts van en `<output_dir>/charts`.
    pub output_dir: PathBuf,
    /// Si es `true`, el primer step `Failed` detiene la corrida y los
    /// siguientes se registran como `Skipped`.
    pub fail_fast: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("output"),
               fail_fast: false }
    }
}

/// Orquestador del pipeline.
///
/// Resuelve el plan contra el registro, ejecuta los steps en orden aislando
/// los fallos de cada uno y acumula los artifacts de los steps exitosos.
#[derive(Debug)]
pub struct PipelineEngine<S, E = InMemoryEventStore>
    where S: StepDefinition,
          E: EventStore
{
    registry: StepRegistry<S>,
    event_store: E,
    options: EngineOptions,
}

impl<S: StepDefinition> PipelineEngine<S, InMemoryEventStore> {
    /// Crea un builder con store de eventos en memoria.
    #[inline]
    pub fn builder(registry: StepRegistry<S>) -> EngineBuilder<S, InMemoryEventStore> {
        EngineBuilder::new(registry)
    }
}

impl<S, E> PipelineEngine<S, E>
    where S: StepDefinition,
          E: EventStore
{
    pub fn new_with_store(registry: StepRegistry<S>, event_store: E, options: EngineOptions) -> Self {
        Self { registry,
               event_store,
               options }
    }

    pub fn registry(&self) -> &StepRegistry<S> { &self.registry }

    pub fn event_store(&self) -> &E { &self.event_store }

    pub fn options(&self) -> &EngineOptions { &self.options }

    pub fn charts_dir(&self) -> PathBuf { self.options.output_dir.join(CHARTS_DIR) }

    pub fn events_for(&self, run_id: Uuid) -> Vec<RunEvent> { self.event_store.list(run_id) }

    /// Variante compacta de eventos de una corrida.
    pub fn event_variants(&self, run_id: Uuid) -> Vec<&'static str> {
        self.event_store
            .list(run_id)
            .iter()
            .map(|e| match e.kind {
                RunEventKind::RunInitialized { .. } => "I",
                RunEventKind::StepStarted { .. } => "S",
                RunEventKind::StepFinished { .. } => "F",
                RunEventKind::StepSkipped { .. } => "K",
                RunEventKind::StepFailed { .. } => "X",
                RunEventKind::RunCompleted { .. } => "C",
            })
            .collect()
    }

    /// Ejecuta el plan completo sobre `dataset`.
    ///
    /// Errores de configuración (objetivo inexistente, tipo de step no
    /// registrado, opciones inválidas) se devuelven antes de ejecutar
    /// cualquier step. Los errores locales de un step quedan registrados
    /// como `Failed` en el resumen.
    pub fn run(&mut self,
               dataset: &Dataset,
               plan: &PipelinePlan,
               target: Option<&str>)
               -> Result<RunSummary, EngineError> {
        if let Some(t) = target {
            if !dataset.contains(t) {
                return Err(ConfigError::UnknownTargetColumn(t.to_string()).into());
            }
        }
        let steps: Vec<S> = plan.enabled()
                                .map(|spec| self.registry.resolve(spec))
                                .collect::<Result<_, _>>()?;

        let charts_dir = self.charts_dir();
        std::fs::create_dir_all(&charts_dir).map_err(|e| {
                                                 EngineError::Io(format!("cannot create {}: {e}",
                                                                         charts_dir.display()))
                                             })?;

        let run_id = Uuid::new_v4();
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunInitialized { plan_hash: plan.plan_hash().to_string(),
                                                                    step_count: steps.len() });
        log::info!("run {run_id}: {} step(s) on {} rows x {} columns",
                   steps.len(),
                   dataset.n_rows(),
                   dataset.n_columns());

        let output_dir = self.options.output_dir.clone();
        let ctx = ExecutionContext::new(dataset, target, &output_dir);
        let mut store = ArtifactStore::new();
        let mut records: Vec<StepRecord> = Vec::with_capacity(steps.len());
        let mut halted_by: Option<String> = None;

        for (index, step) in steps.iter().enumerate() {
            let kind = step.kind().to_string();
            let result = if let Some(failed) = &halted_by {
                StepResult::Skipped { reason: format!("halted after failure of {failed}") }
            } else if step.requires_target() && target.is_none() {
                StepResult::Skipped { reason: "no target variable".to_string() }
            } else {
                self.execute_step(run_id, index, step, &ctx, &mut store)?
            };

            match &result {
                StepResult::Success { artifacts, issues } => {
                    log_issues(&kind, issues);
                    self.event_store.append_kind(run_id,
                                                 RunEventKind::StepFinished { step_index: index,
                                                                              kind: kind.clone(),
                                                                              artifacts: artifacts.clone() });
                }
                StepResult::Skipped { reason } => {
                    log::warn!("step '{kind}' skipped: {reason}");
                    self.event_store.append_kind(run_id,
                                                 RunEventKind::StepSkipped { step_index: index,
                                                                             kind: kind.clone(),
                                                                             reason: reason.clone() });
                }
                StepResult::Failed { error } => {
                    log::error!("step '{kind}' failed: {error}");
                    self.event_store.append_kind(run_id,
                                                 RunEventKind::StepFailed { step_index: index,
                                                                            kind: kind.clone(),
                                                                            error: error.clone() });
                    if self.options.fail_fast && halted_by.is_none() {
                        halted_by = Some(kind.clone());
                    }
                }
            }
            records.push(StepRecord { index, kind, result });
        }

        let manifest = store.into_manifest();
        let fingerprint = run_fingerprint(plan, target, &manifest);
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunCompleted { fingerprint: fingerprint.clone() });
        log::info!("run {run_id} finished: {} artifact(s)", manifest.len());

        Ok(RunSummary { run_id,
                        plan_hash: plan.plan_hash().to_string(),
                        target: target.map(str::to_string),
                        steps: records,
                        manifest,
                        fingerprint })
    }

    fn execute_step(&mut self,
                    run_id: Uuid,
                    index: usize,
                    step: &S,
                    ctx: &ExecutionContext<'_>,
                    store: &mut ArtifactStore)
                    -> Result<StepResult, EngineError> {
        let kind = step.kind().to_string();
        log::info!("--- Running step: {kind} ---");
        log::debug!("step '{kind}' params: {}", step.base_params());
        self.event_store.append_kind(run_id,
                                     RunEventKind::StepStarted { step_index: index,
                                                                 kind: kind.clone() });

        let mut sink = ArtifactSink::new(kind.clone());
        match step.execute(ctx, &mut sink) {
            Ok(StepExecution::Completed { items }) => {
                let artifacts = store.commit(sink)?;
                let issues = items.into_iter().filter(|i| !i.is_produced()).collect();
                Ok(StepResult::Success { artifacts, issues })
            }
            Ok(StepExecution::Skipped { reason }) => Ok(StepResult::Skipped { reason }),
            Err(e) if e.is_fatal() => Err(EngineError::Invariant(format!("step '{kind}': {e}"))),
            Err(error) => Ok(StepResult::Failed { error }),
        }
    }
}

fn log_issues(kind: &str, issues: &[ItemOutcome]) {
    for issue in issues {
        log::warn!("step '{kind}', item '{}': {:?}", issue.subject, issue.status);
    }
}

fn run_fingerprint(plan: &PipelinePlan, target: Option<&str>, manifest: &[Artifact]) -> String {
    let entries: Vec<_> = manifest.iter()
                                  .map(|a| json!({ "name": a.name, "source_columns": a.source_columns() }))
                                  .collect();
    hash_value(&json!({
                   "engine_version": ENGINE_VERSION,
                   "plan_hash": plan.plan_hash(),
                   "target": target,
                   "manifest": entries,
               }))
}

/// Conveniencia para callers que sólo tienen una ruta.
pub fn charts_dir_of(output_dir: &Path) -> PathBuf { output_dir.join(CHARTS_DIR) }

//! eda-core: engine de pipeline de análisis exploratorio.
//!
//! Ejecuta una lista ordenada de steps sobre un `Dataset` de sólo lectura,
//! aislando los fallos de cada step y acumulando un manifest de artifacts
//! (tablas de estadísticas y referencias a charts).
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod plan;
pub mod registry;
pub mod step;
pub mod store;

pub use engine::{EngineBuilder, EngineOptions, PipelineEngine, RunSummary};
pub use errors::{ArtifactError, ConfigError, EngineError, StepError};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use model::{Artifact, ArtifactKey, ArtifactPayload, ChartRef, MetricValue, StatsTable};
pub use plan::{PipelinePlan, StepSpec};
pub use registry::StepRegistry;
pub use step::{ExecutionContext, ItemOutcome, ItemStatus, RunStatus, StepDefinition, StepExecution, StepRecord,
               StepResult};
pub use store::{ArtifactSink, ArtifactStore};

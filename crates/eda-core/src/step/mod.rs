//! Definiciones relacionadas a Steps.
//!
//! Un step de análisis lee el dataset (sólo lectura) y deja artifacts en un
//! `ArtifactSink` propio. Este módulo define:
//! - `StepDefinition`: contrato uniforme que el engine ejecuta.
//! - `ExecutionContext`: lo que recibe cada ejecución.
//! - `StepExecution` / `ItemOutcome`: resultado interno del step, con el
//!   detalle por columna o par de columnas.
//! - `StepResult`: resultado registrado en el resumen de la corrida.

pub mod definition;
mod run_result;
mod status;

pub use definition::{ExecutionContext, StepDefinition};
pub use run_result::{ItemOutcome, ItemStatus, StepExecution, StepRecord, StepResult};
pub use status::RunStatus;

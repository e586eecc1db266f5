//! Builder para `PipelineEngine`.
//!
//! Acumula las opciones del engine y el store de eventos antes de construir.
//! El registro de steps es obligatorio y se entrega al crear el builder.
//!
//! ```ignore
//! let engine = PipelineEngine::builder(registry)
//!     .output_dir("out")
//!     .fail_fast(true)
//!     .build();
//! ```

use std::path::PathBuf;

use crate::engine::{EngineOptions, PipelineEngine};
use crate::event::EventStore;
use crate::registry::StepRegistry;
use crate::step::StepDefinition;

#[derive(Debug)]
pub struct EngineBuilder<S: StepDefinition, E: EventStore> {
    registry: StepRegistry<S>,
    event_store: E,
    options: EngineOptions,
}

impl<S: StepDefinition, E: EventStore + Default> EngineBuilder<S, E> {
    #[inline]
    pub fn new(registry: StepRegistry<S>) -> Self {
        Self { registry,
               event_store: E::default(),
               options: EngineOptions::default() }
    }
}

impl<S: StepDefinition, E: EventStore> EngineBuilder<S, E> {
    /// Directorio de salida de la corrida (los charts van en `charts/`).
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = dir.into();
        self
    }

    pub fn fail_fast(mut self, on: bool) -> Self {
        self.options.fail_fast = on;
        self
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Reemplaza el store de eventos, cambiando el tipo del builder.
    pub fn event_store<E2: EventStore>(self, store: E2) -> EngineBuilder<S, E2> {
        EngineBuilder { registry: self.registry,
                        event_store: store,
                        options: self.options }
    }

    #[inline]
    pub fn build(self) -> PipelineEngine<S, E> {
        PipelineEngine::new_with_store(self.registry, self.event_store, self.options)
    }
}

//! Steps de análisis: Profile, Univariate, Bivariate y Multivariate.
//!
//! Cada step es una estructura sin estado mutable construida desde sus
//! opciones (validadas al construir el plan). Los steps que dibujan preparan
//! sus charts fuera del sink (opcionalmente en paralelo con rayon) y luego
//! los registran en orden canónico, de modo que el manifest no depende del
//! modo de ejecución.
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;

use eda_core::{ArtifactPayload, ArtifactSink, ChartRef, ConfigError, ExecutionContext, ItemOutcome, StepError,
               StepExecution};

use crate::charts::{ChartRenderer, ChartSpec, RenderError};

pub mod bivariate;
pub mod multivariate;
pub mod profile;
pub mod univariate;

pub use bivariate::{BivariateOptions, BivariateStep, PairChart, PairingRule};
pub use multivariate::{MultivariateOptions, MultivariateStep};
pub use profile::{ProfileOptions, ProfileStep};
pub use univariate::{PlotType, UnivariateOptions, UnivariateStep};

pub const DEFAULT_MAX_CATEGORIES: usize = 20;

/// Deserializa las opciones de un step; `null` equivale a `{}`.
pub(crate) fn parse_options<T: DeserializeOwned>(kind: &str, options: &Value) -> Result<T, ConfigError> {
    let value = if options.is_null() { Value::Object(Default::default()) } else { options.clone() };
    serde_json::from_value(value).map_err(|e| ConfigError::MalformedOptions { kind: kind.to_string(),
                                                                              reason: e.to_string() })
}

pub(crate) fn check_at_least_one(kind: &str, field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::MalformedOptions { kind: kind.to_string(),
                                                   reason: format!("'{field}' must be at least 1") });
    }
    Ok(())
}

/// Chart preparado fuera del sink, o el motivo por el que no hubo chart.
#[derive(Debug)]
pub(crate) enum Prepared {
    Chart {
        item: String,
        subject: String,
        kind: String,
        chart: ChartRef,
    },
    Issue(ItemOutcome),
}

/// Dónde queda un chart: ítem reportado, clave del artifact y nombre de
/// archivo (sin extensión).
#[derive(Debug, Clone)]
pub(crate) struct ChartSlot {
    pub item: String,
    pub subject: String,
    pub kind: String,
    pub stem: String,
}

/// Dibuja `spec` en `charts/<stem>.<ext>` y devuelve el resultado como
/// ítem. Un chart sin datos queda `Skipped`; un error de dibujo, `Failed`.
pub(crate) fn draw(renderer: &dyn ChartRenderer,
                   ctx: &ExecutionContext<'_>,
                   slot: ChartSlot,
                   spec: &ChartSpec,
                   source_columns: Vec<String>)
                   -> Prepared {
    let file_name = format!("{}.{}", slot.stem, renderer.extension());
    match renderer.render(spec, &ctx.chart_path(&file_name)) {
        Ok(()) => Prepared::Chart { item: slot.item,
                                    subject: slot.subject,
                                    kind: slot.kind,
                                    chart: ChartRef { title: spec.title().to_string(),
                                                      chart_type: spec.chart_type().to_string(),
                                                      file: ctx.chart_file(&file_name),
                                                      source_columns } },
        Err(RenderError::Empty(_)) => Prepared::Issue(ItemOutcome::skipped(slot.item, "no data to plot")),
        Err(e) => Prepared::Issue(ItemOutcome::failed(slot.item, StepError::Render(e.to_string()).to_string())),
    }
}

/// Aplica `f` a cada elemento, en paralelo si se pide. El orden del
/// resultado es siempre el de `items`.
pub(crate) fn map_items<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
    where T: Sync,
          R: Send,
          F: Fn(&T) -> R + Sync + Send
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}

/// Registra los charts preparados en el sink y arma el resultado del step.
/// Sin ningún chart el step falla con `NoChartsProduced`.
pub(crate) fn stage_charts(kind: &str,
                           sink: &mut ArtifactSink,
                           prepared: Vec<Prepared>)
                           -> Result<StepExecution, StepError> {
    let mut items = Vec::with_capacity(prepared.len());
    for p in prepared {
        match p {
            Prepared::Chart { item,
                              subject,
                              kind: chart_kind,
                              chart, } => {
                let name = sink.put(subject, chart_kind, ArtifactPayload::Chart(chart))?;
                log::info!("Generated {name}");
                items.push(ItemOutcome::produced(item, vec![name]));
            }
            Prepared::Issue(outcome) => items.push(outcome),
        }
    }
    if sink.is_empty() {
        for issue in &items {
            log::warn!("{kind}: item '{}' not plotted: {:?}", issue.subject, issue.status);
        }
        return Err(StepError::NoChartsProduced);
    }
    Ok(StepExecution::Completed { items })
}

//! Enum cerrado de steps de análisis y registro por defecto.
use std::sync::Arc;

use serde_json::Value;

use eda_core::{ArtifactSink, ExecutionContext, StepDefinition, StepError, StepExecution, StepRegistry};

use crate::charts::ChartRenderer;
use crate::steps::{bivariate, multivariate, profile, univariate, BivariateStep, MultivariateStep, ProfileStep,
                   UnivariateStep};

#[derive(Debug, Clone)]
pub enum AnalysisStep {
    Profile(ProfileStep),
    Univariate(UnivariateStep),
    Bivariate(BivariateStep),
    Multivariate(MultivariateStep),
}

impl StepDefinition for AnalysisStep {
    fn kind(&self) -> &str {
        match self {
            AnalysisStep::Profile(_) => profile::KIND,
            AnalysisStep::Univariate(_) => univariate::KIND,
            AnalysisStep::Bivariate(_) => bivariate::KIND,
            AnalysisStep::Multivariate(_) => multivariate::KIND,
        }
    }

    fn requires_target(&self) -> bool {
        match self {
            AnalysisStep::Bivariate(s) => s.requires_target(),
            _ => false,
        }
    }

    fn base_params(&self) -> Value {
        match self {
            AnalysisStep::Profile(s) => s.base_params(),
            AnalysisStep::Univariate(s) => s.base_params(),
            AnalysisStep::Bivariate(s) => s.base_params(),
            AnalysisStep::Multivariate(s) => s.base_params(),
        }
    }

    fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
        match self {
            AnalysisStep::Profile(s) => s.execute(ctx, sink),
            AnalysisStep::Univariate(s) => s.execute(ctx, sink),
            AnalysisStep::Bivariate(s) => s.execute(ctx, sink),
            AnalysisStep::Multivariate(s) => s.execute(ctx, sink),
        }
    }
}

/// Registro con los cuatro steps de análisis. Los steps que dibujan
/// comparten `renderer`.
pub fn default_registry(renderer: Arc<dyn ChartRenderer>) -> StepRegistry<AnalysisStep> {
    let uni = renderer.clone();
    let bi = renderer.clone();
    let multi = renderer;
    StepRegistry::new().with(profile::KIND, |opts| ProfileStep::from_options(opts).map(AnalysisStep::Profile))
                       .with(univariate::KIND, move |opts| {
                           UnivariateStep::from_options(opts, uni.clone()).map(AnalysisStep::Univariate)
                       })
                       .with(bivariate::KIND, move |opts| {
                           BivariateStep::from_options(opts, bi.clone()).map(AnalysisStep::Bivariate)
                       })
                       .with(multivariate::KIND, move |opts| {
                           MultivariateStep::from_options(opts, multi.clone()).map(AnalysisStep::Multivariate)
                       })
}

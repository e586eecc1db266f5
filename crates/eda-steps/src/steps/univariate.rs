//! Univariate: un chart por (columna, tipo de gráfico).
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use eda_core::{ArtifactSink, ConfigError, ExecutionContext, ItemOutcome, StepError, StepExecution};
use eda_domain::{Column, ColumnKind};

use super::{check_at_least_one, draw, map_items, parse_options, stage_charts, ChartSlot, Prepared,
            DEFAULT_MAX_CATEGORIES};
use crate::cardinality::fold_frequencies;
use crate::charts::{display_name, file_stem, BoxGroup, ChartRenderer, ChartSpec};
use crate::stats::{frequencies, histogram};

pub const KIND: &str = "univariate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotType {
    Histogram,
    Boxplot,
    Barplot,
}

impl PlotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotType::Histogram => "histogram",
            PlotType::Boxplot => "boxplot",
            PlotType::Barplot => "barplot",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnivariateOptions {
    /// Tipos de gráfico por tipo de columna.
    pub plot_types: IndexMap<ColumnKind, Vec<PlotType>>,
    /// Intervalos de los histogramas.
    pub bins: usize,
    pub max_categories: usize,
    pub parallel: bool,
}

impl Default for UnivariateOptions {
    fn default() -> Self {
        let mut plot_types = IndexMap::new();
        plot_types.insert(ColumnKind::Numerical, vec![PlotType::Histogram, PlotType::Boxplot]);
        plot_types.insert(ColumnKind::Categorical, vec![PlotType::Barplot]);
        Self { plot_types,
               bins: 20,
               max_categories: DEFAULT_MAX_CATEGORIES,
               parallel: false }
    }
}

#[derive(Debug, Clone)]
pub struct UnivariateStep {
    options: UnivariateOptions,
    renderer: Arc<dyn ChartRenderer>,
}

impl UnivariateStep {
    pub fn new(options: UnivariateOptions, renderer: Arc<dyn ChartRenderer>) -> Self { Self { options, renderer } }

    pub fn from_options(options: &Value, renderer: Arc<dyn ChartRenderer>) -> Result<Self, ConfigError> {
        let options: UnivariateOptions = parse_options(KIND, options)?;
        check_at_least_one(KIND, "bins", options.bins)?;
        check_at_least_one(KIND, "max_categories", options.max_categories)?;
        Ok(Self::new(options, renderer))
    }

    pub fn options(&self) -> &UnivariateOptions { &self.options }

    pub fn base_params(&self) -> Value { serde_json::to_value(&self.options).unwrap_or_default() }

    pub fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
        let columns: Vec<&Column> = ctx.dataset.columns().iter().collect();
        let prepared: Vec<Prepared> = map_items(&columns, self.options.parallel, |col| self.column_charts(ctx, col))
            .into_iter()
            .flatten()
            .collect();
        stage_charts(KIND, sink, prepared)
    }

    fn column_charts(&self, ctx: &ExecutionContext<'_>, col: &Column) -> Vec<Prepared> {
        let kind = col.kind();
        let Some(plots) = self.options.plot_types.get(&kind).filter(|p| !p.is_empty()) else {
            let reason = format!("no plot types configured for {kind} columns");
            return vec![Prepared::Issue(ItemOutcome::skipped(col.name(), reason))];
        };
        if col.present_count() == 0 {
            return vec![Prepared::Issue(ItemOutcome::skipped(col.name(), "all values missing"))];
        }
        plots.iter().map(|plot| self.plot(ctx, col, *plot)).collect()
    }

    fn plot(&self, ctx: &ExecutionContext<'_>, col: &Column, plot: PlotType) -> Prepared {
        let name = col.name();
        let label = display_name(name);
        let item = format!("{name}.{plot}");
        let spec = match (col.kind(), plot) {
            (ColumnKind::Numerical, PlotType::Histogram) => {
                ChartSpec::Histogram { title: format!("Distribution of {label}"),
                                       x_label: label,
                                       bins: histogram(&col.present_numbers(), self.options.bins) }
            }
            (ColumnKind::Numerical, PlotType::Boxplot) => {
                ChartSpec::BoxPlot { title: format!("Box Plot for {label}"),
                                     value_label: label.clone(),
                                     groups: vec![BoxGroup { label,
                                                             values: col.present_numbers() }] }
            }
            (ColumnKind::Categorical, PlotType::Barplot) => {
                let max = self.options.max_categories;
                let folded = fold_frequencies(frequencies(col.as_text().unwrap_or_default()), max);
                let mut title = format!("Frequency of {label}");
                if folded.truncated {
                    title.push_str(&format!(" (Top {max} categories)"));
                }
                ChartSpec::BarPlot { title,
                                     bars: folded.counts }
            }
            (kind, plot) => {
                let err = StepError::UnsupportedPlot { column: name.to_string(),
                                                       plot: plot.to_string(),
                                                       kind: kind.to_string() };
                return Prepared::Issue(ItemOutcome::failed(item, err.to_string()));
            }
        };
        let slot = ChartSlot { item,
                               subject: name.to_string(),
                               kind: plot.to_string(),
                               stem: format!("univariate_{}_{plot}", file_stem(name)) };
        draw(self.renderer.as_ref(), ctx, slot, &spec, vec![name.to_string()])
    }
}

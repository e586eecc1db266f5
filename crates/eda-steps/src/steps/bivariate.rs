//! Bivariate: charts de pares de columnas.
//!
//! En modo centrado en el objetivo (default) cada columna distinta del
//! objetivo se grafica contra él. Si no, se usan los pares explícitos de
//! `pairs`. El tipo de chart lo decide la política de emparejamiento
//! (`pairing`): por defecto numérica/numérica → scatter y
//! categórica/numérica → boxplot agrupado por categoría.
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use eda_core::{ArtifactSink, ConfigError, ExecutionContext, ItemOutcome, StepError, StepExecution};
use eda_domain::{Column, ColumnKind};

use super::{check_at_least_one, draw, map_items, parse_options, stage_charts, ChartSlot, Prepared,
            DEFAULT_MAX_CATEGORIES};
use crate::cardinality::fold_values;
use crate::charts::{display_name, file_stem, BoxGroup, ChartRenderer, ChartSpec};
use crate::stats::frequencies;

pub const KIND: &str = "bivariate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairChart {
    Scatter,
    Boxplot,
}

impl PairChart {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairChart::Scatter => "scatter",
            PairChart::Boxplot => "boxplot",
        }
    }
}

/// Regla de la política de emparejamiento: `(x, y)` → chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairingRule {
    pub x: ColumnKind,
    pub y: ColumnKind,
    pub chart: PairChart,
}

impl PairingRule {
    pub fn new(x: ColumnKind, y: ColumnKind, chart: PairChart) -> Self { Self { x, y, chart } }

    fn is_drawable(&self) -> bool {
        use ColumnKind::{Categorical, Numerical};
        match self.chart {
            PairChart::Scatter => self.x == Numerical && self.y == Numerical,
            PairChart::Boxplot => matches!((self.x, self.y), (Categorical, Numerical) | (Numerical, Categorical)),
        }
    }
}

pub fn default_pairing() -> Vec<PairingRule> {
    vec![PairingRule::new(ColumnKind::Numerical, ColumnKind::Numerical, PairChart::Scatter),
         PairingRule::new(ColumnKind::Categorical, ColumnKind::Numerical, PairChart::Boxplot)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BivariateOptions {
    pub target_centric: bool,
    /// Pares `[x, y]` usados cuando `target_centric` es `false`.
    pub pairs: Vec<(String, String)>,
    pub pairing: Vec<PairingRule>,
    pub max_categories: usize,
    pub parallel: bool,
}

impl Default for BivariateOptions {
    fn default() -> Self {
        Self { target_centric: true,
               pairs: Vec::new(),
               pairing: default_pairing(),
               max_categories: DEFAULT_MAX_CATEGORIES,
               parallel: false }
    }
}

#[derive(Debug, Clone)]
pub struct BivariateStep {
    options: BivariateOptions,
    renderer: Arc<dyn ChartRenderer>,
}

impl BivariateStep {
    pub fn new(options: BivariateOptions, renderer: Arc<dyn ChartRenderer>) -> Self { Self { options, renderer } }

    pub fn from_options(options: &Value, renderer: Arc<dyn ChartRenderer>) -> Result<Self, ConfigError> {
        let options: BivariateOptions = parse_options(KIND, options)?;
        check_at_least_one(KIND, "max_categories", options.max_categories)?;
        if let Some(rule) = options.pairing.iter().find(|r| !r.is_drawable()) {
            return Err(ConfigError::MalformedOptions { kind: KIND.to_string(),
                                                       reason: format!("{} cannot plot {} vs {}",
                                                                       rule.chart.as_str(),
                                                                       rule.x,
                                                                       rule.y) });
        }
        check_pair_subjects(&options.pairs)?;
        Ok(Self::new(options, renderer))
    }

    pub fn options(&self) -> &BivariateOptions { &self.options }

    pub fn requires_target(&self) -> bool { self.options.target_centric }

    pub fn base_params(&self) -> Value { serde_json::to_value(&self.options).unwrap_or_default() }

    pub fn execute(&self, ctx: &ExecutionContext<'_>, sink: &mut ArtifactSink) -> Result<StepExecution, StepError> {
        let ds = ctx.dataset;
        let prepared: Vec<Prepared> = if self.options.target_centric {
            let target_name = ctx.target.ok_or_else(|| StepError::MissingColumn("<target>".into()))?;
            let target = ds.column(target_name)
                           .ok_or_else(|| StepError::MissingColumn(target_name.to_string()))?;
            let features: Vec<&Column> = ds.columns().iter().filter(|c| c.name() != target_name).collect();
            map_items(&features, self.options.parallel, |x| self.pair(ctx, x, target, true))
        } else {
            map_items(&self.options.pairs, self.options.parallel, |(x, y)| {
                match (ds.column(x), ds.column(y)) {
                    (Some(x), Some(y)) => self.pair(ctx, x, y, false),
                    (None, _) => missing(x, y, x),
                    (_, None) => missing(x, y, y),
                }
            })
        };
        stage_charts(KIND, sink, prepared)
    }

    fn rule_for(&self, x: ColumnKind, y: ColumnKind) -> Option<&PairingRule> {
        self.options.pairing.iter().find(|r| r.x == x && r.y == y)
    }

    fn pair(&self, ctx: &ExecutionContext<'_>, x: &Column, y: &Column, target_centric: bool) -> Prepared {
        let subject = pair_subject(x.name(), y.name());
        let Some(rule) = self.rule_for(x.kind(), y.kind()) else {
            let reason = format!("no chart rule for {} vs {}", x.kind(), y.kind());
            return Prepared::Issue(if target_centric {
                                       ItemOutcome::skipped(subject, reason)
                                   } else {
                                       ItemOutcome::failed(subject, reason)
                                   });
        };
        let spec = match rule.chart {
            PairChart::Scatter => scatter(x, y),
            PairChart::Boxplot if x.kind() == ColumnKind::Categorical => self.grouped_boxplot(x, y),
            PairChart::Boxplot => self.grouped_boxplot(y, x),
        };
        let stem = format!("bivariate_{}", file_stem(&subject));
        let slot = ChartSlot { item: subject.clone(),
                               subject,
                               kind: rule.chart.as_str().to_string(),
                               stem };
        draw(self.renderer.as_ref(), ctx, slot, &spec, vec![x.name().to_string(), y.name().to_string()])
    }

    /// Boxplot de `values` agrupado por las categorías de `groups`.
    fn grouped_boxplot(&self, groups: &Column, values: &Column) -> ChartSpec {
        let max = self.options.max_categories;
        let (labels, truncated) = fold_values(groups.as_text().unwrap_or_default(), max);
        let numbers = values.as_numbers().unwrap_or_default();
        let order = frequencies(&labels);
        let boxes = order.into_iter()
                         .map(|(label, _)| {
                             let values = labels.iter()
                                                .zip(numbers)
                                                .filter_map(|(l, v)| match (l, v) {
                                                    (Some(l), Some(v)) if *l == label && v.is_finite() => Some(*v),
                                                    _ => None,
                                                })
                                                .collect();
                             BoxGroup { label, values }
                         })
                         .collect();
        let mut title = format!("Distribution of {} by {}", display_name(values.name()), display_name(groups.name()));
        if truncated {
            title.push_str(&format!(" (Top {max} categories)"));
        }
        ChartSpec::BoxPlot { title,
                             value_label: display_name(values.name()),
                             groups: boxes }
    }
}

fn pair_subject(x: &str, y: &str) -> String { format!("{x}_vs_{y}") }

/// Dos pares explícitos no pueden dar el mismo nombre de artifact: ni el
/// mismo par repetido ni pares distintos como `(a_vs, b)` y `(a, vs_b)`.
fn check_pair_subjects(pairs: &[(String, String)]) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, &(String, String)> = HashMap::new();
    for pair in pairs {
        let subject = pair_subject(&pair.0, &pair.1);
        if let Some(first) = seen.insert(subject.clone(), pair) {
            let reason = if first == pair {
                format!("pair [{}, {}] listed more than once", pair.0, pair.1)
            } else {
                format!("pairs [{}, {}] and [{}, {}] share the artifact name '{subject}'",
                        first.0, first.1, pair.0, pair.1)
            };
            return Err(ConfigError::MalformedOptions { kind: KIND.to_string(),
                                                       reason });
        }
    }
    Ok(())
}

fn missing(x: &str, y: &str, absent: &str) -> Prepared {
    Prepared::Issue(ItemOutcome::failed(pair_subject(x, y), StepError::MissingColumn(absent.to_string()).to_string()))
}

fn scatter(x: &Column, y: &Column) -> ChartSpec {
    let xs = x.as_numbers().unwrap_or_default();
    let ys = y.as_numbers().unwrap_or_default();
    let points = xs.iter()
                   .zip(ys)
                   .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                   .filter(|(a, b)| a.is_finite() && b.is_finite())
                   .collect();
    ChartSpec::Scatter { title: format!("{} vs. {}", display_name(y.name()), display_name(x.name())),
                         x_label: display_name(x.name()),
                         y_label: display_name(y.name()),
                         points }
}

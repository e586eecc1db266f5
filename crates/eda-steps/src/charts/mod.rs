//! Especificación de charts y trait de renderizado.
//!
//! Los steps construyen un `ChartSpec` con datos ya agregados (intervalos de
//! histograma, grupos de boxplot, conteos) y lo entregan a un
//! `ChartRenderer`, que sólo dibuja. Así el cálculo es testeable sin tocar
//! disco y el backend gráfico es reemplazable.
use std::fmt;
use std::path::Path;

use eda_core::hashing::hash_str;
use thiserror::Error;

use crate::stats::HistogramBin;

mod svg;

pub use svg::SvgChartRenderer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("nothing to draw: {0}")] Empty(String),
    #[error("drawing failed: {0}")] Draw(String),
}

/// Grupo de valores de un boxplot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Histogram {
        title: String,
        x_label: String,
        bins: Vec<HistogramBin>,
    },
    BoxPlot {
        title: String,
        value_label: String,
        groups: Vec<BoxGroup>,
    },
    /// Barras horizontales, en el orden dado.
    BarPlot {
        title: String,
        bars: Vec<(String, usize)>,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<(f64, f64)>,
    },
    Heatmap {
        title: String,
        labels: Vec<String>,
        matrix: Vec<Vec<Option<f64>>>,
    },
}

impl ChartSpec {
    /// Tipo de chart tal como se registra en el `ChartRef`.
    pub fn chart_type(&self) -> &'static str {
        match self {
            ChartSpec::Histogram { .. } => "histogram",
            ChartSpec::BoxPlot { .. } => "boxplot",
            ChartSpec::BarPlot { .. } => "barplot",
            ChartSpec::Scatter { .. } => "scatter",
            ChartSpec::Heatmap { .. } => "heatmap",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Histogram { title, .. }
            | ChartSpec::BoxPlot { title, .. }
            | ChartSpec::BarPlot { title, .. }
            | ChartSpec::Scatter { title, .. }
            | ChartSpec::Heatmap { title, .. } => title,
        }
    }

    /// Falla con `Empty` si no hay nada que dibujar y con `Draw` si hay
    /// valores no finitos (plotters no termina con rangos infinitos).
    pub fn check_drawable(&self) -> Result<(), RenderError> {
        let empty = || Err(RenderError::Empty(self.title().to_string()));
        let finite = |ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(RenderError::Draw(format!("non-finite values in {}", self.title())))
            }
        };
        match self {
            ChartSpec::Histogram { bins, .. } if bins.is_empty() => empty(),
            ChartSpec::Histogram { bins, .. } => finite(bins.iter().all(|b| b.lo.is_finite() && b.hi.is_finite())),
            ChartSpec::BoxPlot { groups, .. } if groups.iter().all(|g| g.values.is_empty()) => empty(),
            ChartSpec::BoxPlot { groups, .. } => finite(groups.iter().flat_map(|g| &g.values).all(|v| v.is_finite())),
            ChartSpec::BarPlot { bars, .. } if bars.is_empty() => empty(),
            ChartSpec::BarPlot { .. } => Ok(()),
            ChartSpec::Scatter { points, .. } if points.is_empty() => empty(),
            ChartSpec::Scatter { points, .. } => finite(points.iter().all(|(x, y)| x.is_finite() && y.is_finite())),
            ChartSpec::Heatmap { labels, matrix, .. } if labels.is_empty() || matrix.len() != labels.len() => empty(),
            ChartSpec::Heatmap { matrix, .. } => finite(matrix.iter().flatten().flatten().all(|r| r.is_finite())),
        }
    }
}

/// Backend de dibujo. Se comparte entre hilos cuando un step corre en
/// paralelo.
pub trait ChartRenderer: Send + Sync + fmt::Debug {
    /// Dibuja `spec` en `path` (el directorio ya existe).
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), RenderError>;

    /// Extensión de archivo que produce el renderer.
    fn extension(&self) -> &'static str { "svg" }
}

/// `"sale_price"` → `"Sale Price"`.
pub fn display_name(column: &str) -> String {
    column.split('_')
          .filter(|w| !w.is_empty())
          .map(|w| {
              let mut chars = w.chars();
              match chars.next() {
                  Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                  None => String::new(),
              }
          })
          .collect::<Vec<String>>()
          .join(" ")
}

/// Nombre de archivo seguro a partir de un nombre de columna.
///
/// Si hubo que reemplazar caracteres se agrega `.<hash>` del nombre original,
/// así dos nombres distintos nunca comparten archivo (`.` no sobrevive al
/// saneado).
pub fn file_stem(column: &str) -> String {
    let safe: String = column.chars()
                             .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                             .collect();
    if safe == column {
        safe
    } else {
        format!("{safe}.{}", &hash_str(column)[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_title_cases_snake_case() {
        assert_eq!(display_name("sale_price"), "Sale Price");
        assert_eq!(display_name("AGE"), "Age");
    }

    #[test]
    fn file_stem_replaces_separators() {
        let stem = file_stem("price (usd)/m2");
        assert!(stem.starts_with("price__usd__m2."));
        assert_eq!(stem.len(), "price__usd__m2.".len() + 8);
        assert_eq!(file_stem("sale_price"), "sale_price");
    }

    #[test]
    fn file_stem_keeps_sanitised_names_apart() {
        assert_ne!(file_stem("price usd"), file_stem("price_usd"));
        assert_ne!(file_stem("price usd"), file_stem("price/usd"));
        assert_eq!(file_stem("price usd"), file_stem("price usd"));
    }

    #[test]
    fn non_finite_or_empty_specs_are_not_drawable() {
        let scatter = |points| ChartSpec::Scatter { title: "B vs. A".into(),
                                                    x_label: "A".into(),
                                                    y_label: "B".into(),
                                                    points };
        assert!(matches!(scatter(vec![]).check_drawable(), Err(RenderError::Empty(_))));
        assert!(matches!(scatter(vec![(1.0, f64::INFINITY)]).check_drawable(), Err(RenderError::Draw(_))));
        assert!(scatter(vec![(1.0, 2.0)]).check_drawable().is_ok());

        let boxplot = ChartSpec::BoxPlot { title: "Box".into(),
                                           value_label: "A".into(),
                                           groups: vec![BoxGroup { label: "a".into(),
                                                                   values: vec![1.0, f64::NEG_INFINITY] }] };
        assert!(matches!(boxplot.check_drawable(), Err(RenderError::Draw(_))));
    }
}

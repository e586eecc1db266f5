//! eda-steps: steps de análisis exploratorio sobre `eda-core`.
//!
//! Este crate provee:
//! - Kernels de estadística descriptiva y correlación (`stats`).
//! - Agrupación de alta cardinalidad en `"Other"` (`cardinality`).
//! - Especificaciones de charts y un renderer SVG (`charts`).
//! - Los steps Profile, Univariate, Bivariate y Multivariate (`steps`) y el
//!   enum cerrado `AnalysisStep` con su registro por defecto (`registry`).

pub mod cardinality;
pub mod charts;
pub mod registry;
pub mod stats;
pub mod steps;

pub use charts::{ChartRenderer, ChartSpec, RenderError, SvgChartRenderer};
pub use registry::{default_registry, AnalysisStep};

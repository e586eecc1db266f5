//! Modelos neutrales (Artifact, claves, tablas de métricas, charts).

pub mod artifact;

pub use artifact::{Artifact, ArtifactKey, ArtifactPayload, ChartRef, MetricValue, StatsTable};

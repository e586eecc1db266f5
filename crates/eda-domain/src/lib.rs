//! eda-domain: dataset tabular inmutable y su carga desde disco.
//!
//! - `dataset`: `Dataset`, `Column`, `ColumnKind`, `ColumnValues`.
//! - `loader`: lectura de CSV / JSON con inferencia de tipos.
pub mod dataset;
pub mod error;
pub mod loader;

pub use dataset::{Column, ColumnKind, ColumnValues, Dataset};
pub use error::DomainError;
pub use loader::{read_dataset, DataFormat};

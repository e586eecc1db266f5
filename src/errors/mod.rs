//! Errores de la aplicación.
//! - `app_error`: error unificado de configuración, dataset, engine e IO.

pub mod app_error;

pub use app_error::AppError;

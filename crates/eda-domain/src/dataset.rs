//! Dataset tabular en memoria.
//!
//! Un `Dataset` es un conjunto ordenado de columnas con nombre único y el
//! mismo número de filas. Cada columna tiene un tipo (`ColumnKind`) y una
//! secuencia de valores donde el faltante se representa con `None`; nunca con
//! un valor centinela (`NaN` y ±∞ se normalizan a `None` al construir, así
//! todo valor numérico presente es finito).
//!
//! El dataset es de sólo lectura una vez construido: los steps de análisis
//! reciben `&Dataset` y únicamente derivan resúmenes.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Tipo inferido de una columna.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numerical,
    Categorical,
    Datetime,
    Unknown,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numerical => "numerical",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valores tipados de una columna.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numerical(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    Datetime(Vec<Option<NaiveDateTime>>),
    /// Columna sin tipo inferible (p. ej. completamente vacía). Conserva el
    /// texto crudo.
    Unknown(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        let values = match values {
            ColumnValues::Numerical(v) => ColumnValues::Numerical(v.into_iter().map(|x| x.filter(|f| f.is_finite())).collect()),
            other => other,
        };
        Self { name: name.into(),
               values }
    }

    pub fn numerical(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(name, ColumnValues::Numerical(values.into_iter().collect()))
    }

    pub fn categorical<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = Option<S>>) -> Self {
        Self::new(name,
                  ColumnValues::Categorical(values.into_iter().map(|v| v.map(Into::into)).collect()))
    }

    pub fn datetime(name: impl Into<String>, values: impl IntoIterator<Item = Option<NaiveDateTime>>) -> Self {
        Self::new(name, ColumnValues::Datetime(values.into_iter().collect()))
    }

    pub fn unknown<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = Option<S>>) -> Self {
        Self::new(name,
                  ColumnValues::Unknown(values.into_iter().map(|v| v.map(Into::into)).collect()))
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn values(&self) -> &ColumnValues { &self.values }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numerical(_) => ColumnKind::Numerical,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
            ColumnValues::Datetime(_) => ColumnKind::Datetime,
            ColumnValues::Unknown(_) => ColumnKind::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numerical(v) => v.len(),
            ColumnValues::Categorical(v) | ColumnValues::Unknown(v) => v.len(),
            ColumnValues::Datetime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.values {
            ColumnValues::Numerical(v) => v.get(row).is_some_and(|x| x.is_none()),
            ColumnValues::Categorical(v) | ColumnValues::Unknown(v) => v.get(row).is_some_and(|x| x.is_none()),
            ColumnValues::Datetime(v) => v.get(row).is_some_and(|x| x.is_none()),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&r| self.is_missing(r)).count()
    }

    /// Número de valores presentes (no faltantes).
    pub fn present_count(&self) -> usize { self.len() - self.missing_count() }

    pub fn as_numbers(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numerical(v) => Some(v),
            _ => None,
        }
    }

    /// Texto de una columna categórica (o desconocida).
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.values {
            ColumnValues::Categorical(v) | ColumnValues::Unknown(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_datetimes(&self) -> Option<&[Option<NaiveDateTime>]> {
        match &self.values {
            ColumnValues::Datetime(v) => Some(v),
            _ => None,
        }
    }

    /// Valores numéricos presentes, en orden de fila.
    pub fn present_numbers(&self) -> Vec<f64> {
        self.as_numbers()
            .map(|v| v.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Representación textual de una celda; `None` si falta.
    pub fn cell_text(&self, row: usize) -> Option<String> {
        match &self.values {
            ColumnValues::Numerical(v) => v.get(row).copied().flatten().map(|x| x.to_string()),
            ColumnValues::Categorical(v) | ColumnValues::Unknown(v) => v.get(row).cloned().flatten(),
            ColumnValues::Datetime(v) => v.get(row).copied().flatten().map(|d| d.to_string()),
        }
    }
}

/// Dataset inmutable: columnas con nombre único y longitud homogénea.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, DomainError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = std::collections::HashSet::new();
        for c in &columns {
            if !seen.insert(c.name()) {
                return Err(DomainError::DuplicateColumn(c.name().to_string()));
            }
            if c.len() != rows {
                return Err(DomainError::LengthMismatch { column: c.name().to_string(),
                                                         expected: rows,
                                                         found: c.len() });
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn n_rows(&self) -> usize { self.rows }

    pub fn n_columns(&self) -> usize { self.columns.len() }

    pub fn columns(&self) -> &[Column] { &self.columns }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool { self.column(name).is_some() }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Columnas de un tipo, en el orden del dataset.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(move |c| c.kind() == kind)
    }

    /// Total de celdas faltantes.
    pub fn missing_cells(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }

    /// Filas idénticas a una fila anterior (comparando todas las columnas).
    pub fn duplicate_rows(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        (0..self.rows).filter(|&r| {
                          let key: Vec<Option<String>> = self.columns.iter().map(|c| c.cell_text(r)).collect();
                          !seen.insert(key)
                      })
                      .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let err = Dataset::new(vec![Column::numerical("a", vec![Some(1.0)]),
                                    Column::numerical("a", vec![Some(2.0)])]).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateColumn(n) if n == "a"));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Dataset::new(vec![Column::numerical("a", vec![Some(1.0), None]),
                                    Column::categorical("b", vec![Some("x")])]).unwrap_err();
        assert!(matches!(err, DomainError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn nan_is_normalised_to_missing() {
        let c = Column::numerical("a", vec![Some(f64::NAN), Some(1.0)]);
        assert_eq!(c.missing_count(), 1);
        assert_eq!(c.present_numbers(), vec![1.0]);
    }

    #[test]
    fn infinities_are_normalised_to_missing() {
        let c = Column::numerical("a", vec![Some(f64::INFINITY), Some(2.0), Some(f64::NEG_INFINITY)]);
        assert_eq!(c.missing_count(), 2);
        assert_eq!(c.present_count(), 1);
        assert_eq!(c.present_numbers(), vec![2.0]);
    }

    #[test]
    fn duplicate_rows_counted_once_per_repeat() {
        let ds = Dataset::new(vec![Column::numerical("a", vec![Some(1.0), Some(1.0), Some(2.0), Some(1.0)]),
                                   Column::categorical("b", vec![Some("x"), Some("x"), Some("x"), Some("y")])]).unwrap();
        assert_eq!(ds.duplicate_rows(), 1);
    }

    #[test]
    fn columns_of_kind_keeps_order() {
        let ds = Dataset::new(vec![Column::numerical("z", vec![Some(1.0)]),
                                   Column::categorical("c", vec![Some("x")]),
                                   Column::numerical("a", vec![None])]).unwrap();
        let names: Vec<&str> = ds.columns_of_kind(ColumnKind::Numerical).map(Column::name).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(ds.missing_cells(), 1);
    }
}

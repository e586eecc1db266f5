//! Reducción de alta cardinalidad: se conservan las `max_categories − 1`
//! categorías más frecuentes y el resto se agrupa en `"Other"`, de modo que
//! el resultado nunca supera `max_categories` categorías.
use indexmap::IndexMap;

use crate::stats::frequencies;

pub const OTHER_LABEL: &str = "Other";

/// Resultado de agrupar una columna categórica.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedCategories {
    /// Etiqueta → conteo, en orden descendente de conteo.
    pub counts: Vec<(String, usize)>,
    /// `true` si hubo agrupación en `"Other"`.
    pub truncated: bool,
}

/// Agrupa una tabla de frecuencias (ya ordenada) en a lo sumo `max`
/// categorías. `max` debe ser ≥ 1.
pub fn fold_frequencies(freqs: Vec<(String, usize)>, max: usize) -> FoldedCategories {
    let max = max.max(1);
    if freqs.len() <= max {
        return FoldedCategories { counts: freqs,
                                  truncated: false };
    }
    let mut merged: IndexMap<String, usize> = IndexMap::new();
    let mut other = 0usize;
    for (i, (label, n)) in freqs.into_iter().enumerate() {
        if i < max - 1 && label != OTHER_LABEL {
            merged.insert(label, n);
        } else {
            other += n;
        }
    }
    let mut counts: Vec<(String, usize)> = merged.into_iter().collect();
    counts.push((OTHER_LABEL.to_string(), other));
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    FoldedCategories { counts, truncated: true }
}

/// Reetiqueta cada valor: las categorías fuera del top pasan a `"Other"`.
/// Los faltantes se conservan como `None`.
pub fn fold_values(values: &[Option<String>], max: usize) -> (Vec<Option<String>>, bool) {
    let folded = fold_frequencies(frequencies(values), max);
    if !folded.truncated {
        return (values.to_vec(), false);
    }
    let kept: std::collections::HashSet<&str> = folded.counts
                                                      .iter()
                                                      .map(|(l, _)| l.as_str())
                                                      .filter(|l| *l != OTHER_LABEL)
                                                      .collect();
    let relabeled = values.iter()
                          .map(|v| {
                              v.as_ref().map(|s| {
                                             if kept.contains(s.as_str()) { s.clone() } else { OTHER_LABEL.to_string() }
                                         })
                          })
                          .collect();
    (relabeled, true)
}

//! Kernels de estadística descriptiva y correlación.
//!
//! Todas las funciones trabajan sólo con valores presentes; los faltantes
//! (`None`) se excluyen antes de calcular. Un resultado no definido (columna
//! vacía, varianza nula) se devuelve como `None` o `NaN` y lo traduce el
//! llamador a `MetricValue::Undefined`.
use std::collections::BTreeMap;

use statrs::statistics::Statistics;

/// Resumen de una columna numérica.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Desviación estándar muestral (n − 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let mean = finite(sorted.iter().mean());
        let std = if sorted.len() > 1 { finite(sorted.iter().std_dev()) } else { None };
        Self { count: sorted.len(),
               mean,
               std,
               min: sorted.first().copied(),
               q25: quantile_sorted(&sorted, 0.25),
               median: quantile_sorted(&sorted, 0.5),
               q75: quantile_sorted(&sorted, 0.75),
               max: sorted.last().copied() }
    }
}

fn finite(x: f64) -> Option<f64> { x.is_finite().then_some(x) }

/// Cuantil `q` ∈ [0, 1] por interpolación lineal entre rangos
/// (`pos = q · (n − 1)`). `None` si no hay valores.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Tabla de frecuencias: conteo descendente, empates por valor ascendente.
pub fn frequencies<'a, I>(values: I) -> Vec<(String, usize)>
    where I: IntoIterator<Item = &'a Option<String>>
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values.into_iter().flatten() {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    let mut table: Vec<(String, usize)> = counts.into_iter().map(|(k, n)| (k.to_string(), n)).collect();
    // sort estable sobre el orden lexicográfico del BTreeMap
    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}

/// Coeficiente de Pearson sobre las filas donde ambos valores están
/// presentes. `None` con menos de dos pares o varianza nula.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x.iter()
                                          .zip(y)
                                          .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                                          .unzip();
    if xs.len() < 2 {
        return None;
    }
    let mx = xs.iter().mean();
    let my = ys.iter().mean();
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in xs.iter().zip(&ys) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    finite((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Matriz de correlación de Pearson (simétrica, diagonal 1 salvo columnas
/// constantes).
pub fn correlation_matrix(columns: &[&[Option<f64>]]) -> Vec<Vec<Option<f64>>> {
    let n = columns.len();
    let mut m = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(columns[i], columns[j]);
            m[i][j] = r;
            m[j][i] = r;
        }
    }
    m
}

/// Intervalo de histograma `[lo, hi)` (el último incluye `hi`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Histograma de `bins` intervalos de igual ancho entre min y max. Si todos
/// los valores son iguales devuelve un único intervalo de ancho 1 centrado en
/// el valor.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    let (Some(min), Some(max)) = (finite.iter().copied().reduce(f64::min), finite.iter().copied().reduce(f64::max))
    else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin { lo: min - 0.5,
                                   hi: max + 0.5,
                                   count: finite.len() }];
    }
    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins).map(|i| HistogramBin { lo: min + width * i as f64,
                                                                     hi: min + width * (i + 1) as f64,
                                                                     count: 0 })
                                              .collect();
    for x in finite {
        let idx = (((x - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_matches_describe() {
        let s = NumericSummary::from_values(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(2.5));
        assert!((s.std.unwrap() - 1.2909944487358056).abs() < 1e-12);
        assert_eq!(s.q25, Some(1.75));
        assert_eq!(s.median, Some(2.5));
        assert_eq!(s.q75, Some(3.25));
        assert_eq!((s.min, s.max), (Some(1.0), Some(4.0)));
    }

    #[test]
    fn empty_and_singleton_summaries_are_undefined_where_needed() {
        let empty = NumericSummary::from_values(&[]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_none() && empty.std.is_none() && empty.median.is_none());

        let one = NumericSummary::from_values(&[7.0]);
        assert_eq!(one.mean, Some(7.0));
        assert_eq!(one.std, None);
        assert_eq!(one.q75, Some(7.0));
    }

    #[test]
    fn frequencies_break_ties_by_value() {
        let v = vec![Some("b".to_string()), Some("a".to_string()), None, Some("c".to_string()), Some("c".to_string())];
        assert_eq!(frequencies(&v),
                   vec![("c".to_string(), 2), ("a".to_string(), 1), ("b".to_string(), 1)]);
    }

    #[test]
    fn pearson_is_pairwise_complete() {
        let x = vec![Some(1.0), Some(2.0), None, Some(3.0)];
        let y = vec![Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let constant = vec![Some(5.0); 4];
        assert_eq!(pearson(&constant, &y), None);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 101);
        assert_eq!(histogram(&[3.0, 3.0], 5).len(), 1);
    }
}

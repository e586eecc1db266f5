//! Renderer SVG sobre `plotters`.
use std::fmt::Display;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{BoxGroup, ChartRenderer, ChartSpec, RenderError};
use crate::stats::HistogramBin;

const PRIMARY: RGBColor = RGBColor(31, 119, 180);
const UNDEFINED_CELL: RGBColor = RGBColor(220, 220, 220);

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self { Self { width, height } }
}

impl Default for SvgChartRenderer {
    fn default() -> Self { Self::new(1000, 600) }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        // Antes de crear el backend: un spec vacío no deja archivo en disco
        spec.check_drawable()?;
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        match spec {
            ChartSpec::Histogram { title, x_label, bins } => draw_histogram(&root, title, x_label, bins)?,
            ChartSpec::BoxPlot { title,
                                 value_label,
                                 groups, } => draw_boxplot(&root, title, value_label, groups)?,
            ChartSpec::BarPlot { title, bars } => draw_barplot(&root, title, bars)?,
            ChartSpec::Scatter { title,
                                 x_label,
                                 y_label,
                                 points, } => draw_scatter(&root, title, x_label, y_label, points)?,
            ChartSpec::Heatmap { title, labels, matrix } => draw_heatmap(&root, title, labels, matrix)?,
        }
        root.present().map_err(draw_err)
    }
}

fn draw_err<E: Display>(e: E) -> RenderError { RenderError::Draw(e.to_string()) }

fn segment_label(labels: &[String], v: &SegmentValue<u32>) -> String {
    match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let pad = ((hi - lo) * 0.05).max(0.5);
    (lo - pad, hi + pad)
}

fn draw_histogram(root: &Area<'_>, title: &str, x_label: &str, bins: &[HistogramBin]) -> Result<(), RenderError> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Err(RenderError::Empty(title.to_string()));
    };
    let top = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;
    let mut chart = ChartBuilder::on(root).caption(title, ("sans-serif", 24))
                                          .margin(16)
                                          .x_label_area_size(40)
                                          .y_label_area_size(56)
                                          .build_cartesian_2d(first.lo..last.hi, 0.0..top * 1.05)
                                          .map_err(draw_err)?;
    chart.configure_mesh()
         .x_desc(x_label)
         .y_desc("Frequency")
         .draw()
         .map_err(draw_err)?;
    chart.draw_series(bins.iter()
                          .map(|b| Rectangle::new([(b.lo, 0.0), (b.hi, b.count as f64)], PRIMARY.filled())))
         .map_err(draw_err)?;
    Ok(())
}

fn draw_boxplot(root: &Area<'_>, title: &str, value_label: &str, groups: &[BoxGroup]) -> Result<(), RenderError> {
    let groups: Vec<&BoxGroup> = groups.iter().filter(|g| !g.values.is_empty()).collect();
    let quartiles: Vec<Quartiles> = groups.iter().map(|g| Quartiles::new(&g.values)).collect();
    let (lo, hi) = quartiles.iter()
                            .flat_map(|q| q.values())
                            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let (lo, hi) = padded(f64::from(lo), f64::from(hi));
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();

    let mut chart = ChartBuilder::on(root).caption(title, ("sans-serif", 24))
                                          .margin(16)
                                          .x_label_area_size(48)
                                          .y_label_area_size(64)
                                          .build_cartesian_2d((0u32..labels.len() as u32).into_segmented(),
                                                              lo as f32..hi as f32)
                                          .map_err(draw_err)?;
    chart.configure_mesh()
         .disable_x_mesh()
         .y_desc(value_label)
         .x_label_formatter(&|v| segment_label(&labels, v))
         .draw()
         .map_err(draw_err)?;
    chart.draw_series(quartiles.iter().enumerate().map(|(i, q)| {
                                                      Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), q).width(24)
                                                                                                                .style(PRIMARY)
                                                  }))
         .map_err(draw_err)?;
    Ok(())
}

fn draw_barplot(root: &Area<'_>, title: &str, bars: &[(String, usize)]) -> Result<(), RenderError> {
    let labels: Vec<String> = bars.iter().map(|(l, _)| l.clone()).collect();
    let top = bars.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(root).caption(title, ("sans-serif", 24))
                                          .margin(16)
                                          .x_label_area_size(40)
                                          .y_label_area_size(160)
                                          .build_cartesian_2d(0.0..top * 1.15, (0u32..labels.len() as u32).into_segmented())
                                          .map_err(draw_err)?;
    chart.configure_mesh()
         .disable_y_mesh()
         .x_desc("Count")
         .y_label_formatter(&|v| segment_label(&labels, v))
         .draw()
         .map_err(draw_err)?;
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, n))| {
                                                 let i = i as u32;
                                                 let mut bar = Rectangle::new([(0.0, SegmentValue::Exact(i)),
                                                                               (*n as f64, SegmentValue::Exact(i + 1))],
                                                                              PRIMARY.filled());
                                                 bar.set_margin(4, 4, 0, 0);
                                                 bar
                                             }))
         .map_err(draw_err)?;
    chart.draw_series(bars.iter().enumerate().map(|(i, (_, n))| {
                                                 Text::new(n.to_string(),
                                                           (*n as f64, SegmentValue::CenterOf(i as u32)),
                                                           ("sans-serif", 14).into_font())
                                             }))
         .map_err(draw_err)?;
    Ok(())
}

fn draw_scatter(root: &Area<'_>,
                title: &str,
                x_label: &str,
                y_label: &str,
                points: &[(f64, f64)])
                -> Result<(), RenderError> {
    let bounds = |f: fn(&(f64, f64)) -> f64| {
        points.iter()
              .map(f)
              .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
    };
    let (x0, x1) = bounds(|p| p.0);
    let (y0, y1) = bounds(|p| p.1);
    let (x0, x1) = padded(x0, x1);
    let (y0, y1) = padded(y0, y1);

    let mut chart = ChartBuilder::on(root).caption(title, ("sans-serif", 24))
                                          .margin(16)
                                          .x_label_area_size(40)
                                          .y_label_area_size(64)
                                          .build_cartesian_2d(x0..x1, y0..y1)
                                          .map_err(draw_err)?;
    chart.configure_mesh()
         .x_desc(x_label)
         .y_desc(y_label)
         .draw()
         .map_err(draw_err)?;
    chart.draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 3, PRIMARY.mix(0.6).filled())))
         .map_err(draw_err)?;
    Ok(())
}

fn heat_color(r: Option<f64>) -> RGBColor {
    let Some(r) = r else {
        return UNDEFINED_CELL;
    };
    let t = r.clamp(-1.0, 1.0).abs();
    let (tr, tg, tb) = if r < 0.0 { (59.0, 76.0, 192.0) } else { (180.0, 4.0, 38.0) };
    let lerp = |to: f64| (255.0 + (to - 255.0) * t).round() as u8;
    RGBColor(lerp(tr), lerp(tg), lerp(tb))
}

fn draw_heatmap(root: &Area<'_>, title: &str, labels: &[String], matrix: &[Vec<Option<f64>>]) -> Result<(), RenderError> {
    let n = labels.len() as u32;
    let mut chart = ChartBuilder::on(root).caption(title, ("sans-serif", 24))
                                          .margin(16)
                                          .x_label_area_size(48)
                                          .y_label_area_size(120)
                                          .build_cartesian_2d((0u32..n).into_segmented(), (0u32..n).into_segmented())
                                          .map_err(draw_err)?;
    chart.configure_mesh()
         .disable_mesh()
         .x_label_formatter(&|v| segment_label(labels, v))
         .y_label_formatter(&|v| segment_label(labels, v))
         .draw()
         .map_err(draw_err)?;

    let cells: Vec<(u32, u32, Option<f64>)> =
        matrix.iter()
              .enumerate()
              .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, r)| (i as u32, j as u32, *r)))
              .collect();
    chart.draw_series(cells.iter().map(|&(i, j, r)| {
                                      Rectangle::new([(SegmentValue::Exact(j), SegmentValue::Exact(i)),
                                                      (SegmentValue::Exact(j + 1), SegmentValue::Exact(i + 1))],
                                                     heat_color(r).filled())
                                  }))
         .map_err(draw_err)?;
    chart.draw_series(cells.iter().map(|&(i, j, r)| {
                                      let text = r.map(|r| format!("{r:.2}")).unwrap_or_else(|| "n/a".to_string());
                                      Text::new(text,
                                                (SegmentValue::CenterOf(j), SegmentValue::CenterOf(i)),
                                                ("sans-serif", 14).into_font())
                                  }))
         .map_err(draw_err)?;
    Ok(())
}

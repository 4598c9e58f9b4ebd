//! Line charts for the report, written as standalone SVG files.

use crate::report::{
    LAST_FIVE_IMG, LAST_FIVE_MEAN_IMG, LAST_MONTHS_IMG, LAST_MONTHS_MEAN_IMG, ReportData,
    WHOLE_PERIOD_IMG,
};
use crate::report::output::ensure_parent;
use anyhow::{Context, Result};
use askama::Template;
use std::path::Path;
use tracing::debug;

const LINE_COLOR: &str = "gold";
const MEAN_COLOR: &str = "red";
const MARGIN: f64 = 60.0;

/// Above this many points the x axis only shows the first and last label and
/// markers are dropped.
const DENSE_POINTS: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Horizontal overlay with a legend, e.g. the mean of the plotted values.
    pub mean: Option<f64>,
    pub unit: String,
    pub width: u32,
    pub height: u32,
}

impl LineChart {
    pub fn new(labels: Vec<String>, values: Vec<f64>, unit: &str) -> Self {
        Self {
            labels,
            values,
            mean: None,
            unit: unit.to_string(),
            width: 600,
            height: 500,
        }
    }

    pub fn with_mean(mut self, mean: Option<f64>) -> Self {
        self.mean = mean;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    fn is_dense(&self) -> bool {
        self.values.len() > DENSE_POINTS
    }
}

/// Renders a chart to an image file.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &LineChart, path: &Path) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SvgChartRenderer;

struct Anchor {
    x: String,
    y: String,
}

struct Caption {
    x: String,
    y: String,
    text: String,
}

struct MeanLine {
    y: String,
    legend_y: String,
    text: String,
}

#[derive(Template)]
#[template(path = "chart.svg")]
struct SvgView {
    width: u32,
    height: u32,
    center_x: String,
    title_y: String,
    left: String,
    right: String,
    axes: String,
    ticks: Vec<Caption>,
    line: String,
    line_color: &'static str,
    markers: Vec<Anchor>,
    labels: Vec<Caption>,
    mean: Option<MeanLine>,
    mean_color: &'static str,
}

fn px(v: f64) -> String {
    format!("{:.1}", v)
}

impl SvgView {
    fn empty(w: f64, h: f64) -> Self {
        Self {
            width: w as u32,
            height: h as u32,
            center_x: px(w / 2.0),
            title_y: px(MARGIN / 2.0),
            left: px(MARGIN),
            right: px(w - MARGIN),
            axes: String::new(),
            ticks: Vec::new(),
            line: String::new(),
            line_color: LINE_COLOR,
            markers: Vec::new(),
            labels: Vec::new(),
            mean: None,
            mean_color: MEAN_COLOR,
        }
    }
}

impl SvgChartRenderer {
    pub fn to_svg(chart: &LineChart) -> Result<String> {
        let (w, h) = (chart.width as f64, chart.height as f64);
        let mut view = SvgView::empty(w, h);
        if chart.values.is_empty() {
            return Ok(view.render()?);
        }

        let (mut lo, mut hi) = chart
            .values
            .iter()
            .chain(chart.mean.iter())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if (hi - lo).abs() < f64::EPSILON {
            let pad = (lo.abs() * 0.01).max(0.001);
            lo -= pad;
            hi += pad;
        }

        let plot_w = w - 2.0 * MARGIN;
        let plot_h = h - 2.0 * MARGIN;
        let n = chart.values.len();
        let x_at = |i: usize| {
            if n == 1 { MARGIN + plot_w / 2.0 } else { MARGIN + plot_w * i as f64 / (n - 1) as f64 }
        };
        let y_at = |v: f64| MARGIN + plot_h * (hi - v) / (hi - lo);

        view.axes = format!(
            "{m},{m} {m},{b} {r},{b}",
            m = px(MARGIN),
            b = px(h - MARGIN),
            r = px(w - MARGIN)
        );
        view.ticks = [lo, hi]
            .into_iter()
            .map(|v| Caption { x: px(MARGIN - 4.0), y: px(y_at(v) + 3.0), text: format!("{:.3}", v) })
            .collect();

        let anchors: Vec<Anchor> = chart
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| Anchor { x: px(x_at(i)), y: px(y_at(v)) })
            .collect();
        view.line = anchors
            .iter()
            .map(|a| format!("{},{}", a.x, a.y))
            .collect::<Vec<_>>()
            .join(" ");

        let label_idx: Vec<usize> = if chart.is_dense() { vec![0, n - 1] } else { (0..n).collect() };
        view.labels = label_idx
            .into_iter()
            .filter_map(|i| {
                chart.labels.get(i).map(|label| Caption {
                    x: px(x_at(i)),
                    y: px(h - MARGIN + 14.0),
                    text: label.clone(),
                })
            })
            .collect();

        if !chart.is_dense() {
            view.markers = anchors;
        }

        view.mean = chart.mean.map(|mean| MeanLine {
            y: px(y_at(mean)),
            legend_y: px(MARGIN - 10.0),
            text: format!("Mean = {:.3} {}", mean, chart.unit),
        });

        Ok(view.render()?)
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, chart: &LineChart, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        std::fs::write(path, Self::to_svg(chart)?)
            .with_context(|| format!("Failed to write chart {:?}", path))?;
        debug!("Chart written to {:?} ({} points)", path, chart.values.len());
        Ok(())
    }
}

fn dates_and_values(points: &[crate::models::QuotePoint]) -> (Vec<String>, Vec<f64>) {
    points.iter().map(|p| (p.date.to_string(), p.value)).unzip()
}

/// Render the five report charts into `dir`.
pub fn render_report_charts(
    renderer: &dyn ChartRenderer,
    dir: &Path,
    data: &ReportData,
    unit: &str,
) -> Result<()> {
    let (labels, values) = dates_and_values(&data.visible);
    renderer.render(&LineChart::new(labels, values, unit), &dir.join(WHOLE_PERIOD_IMG))?;

    let (labels, values) = dates_and_values(&data.trailing);
    let trailing_mean = crate::stats::mean(&values);
    let last_five = LineChart::new(labels, values, unit);
    renderer.render(&last_five, &dir.join(LAST_FIVE_IMG))?;
    renderer.render(&last_five.with_mean(trailing_mean), &dir.join(LAST_FIVE_MEAN_IMG))?;

    let (labels, values): (Vec<String>, Vec<f64>) =
        data.months.iter().map(|m| (m.label.clone(), m.mean)).unzip();
    let monthly = LineChart::new(labels, values, unit).with_height(700);
    renderer.render(&monthly, &dir.join(LAST_MONTHS_IMG))?;
    renderer.render(&monthly.with_mean(data.overall_mean), &dir.join(LAST_MONTHS_MEAN_IMG))?;

    Ok(())
}

//! Scatter plot rendering and console summaries for an [`AnalysisResult`].

mod canvas;
mod font;
mod summary;

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;
use tracing::info;

use crate::pipeline::AnalysisResult;
use canvas::{Canvas, Marker};
use font::{GLYPH_HEIGHT, text_width};

pub use summary::{format_cluster_summary, format_loadings};

/// Offset in data units between a point and its filename label.
const LABEL_OFFSET: f64 = 0.02;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const PLOT_AREA: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([221, 221, 228]);
const FRAME: Rgb<u8> = Rgb([190, 190, 198]);
const TEXT: Rgb<u8> = Rgb([38, 38, 38]);
const MARKER_EDGE: Rgb<u8> = Rgb([255, 255, 255]);

/// Viridis colour map sampled at five evenly spaced stops.
const VIRIDIS: [[f64; 3]; 5] = [
    [68.0, 1.0, 84.0],
    [59.0, 82.0, 139.0],
    [33.0, 145.0, 140.0],
    [94.0, 201.0, 98.0],
    [253.0, 231.0, 37.0],
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to plot")]
    EmptyResult,
    #[error("Failed to save plot to {path}: {source}")]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Image size and text scale for the scatter plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// Pixels per font pixel for axis and point labels.
    pub text_scale: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 2000,
            height: 1600,
            text_scale: 3,
        }
    }
}

/// Render the scatter plot and write it as PNG to `path`.
pub fn render_scatter(
    result: &AnalysisResult,
    path: &Path,
    options: &PlotOptions,
) -> Result<(), RenderError> {
    let image = render_image(result, options)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| RenderError::Save {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), points = result.len(), "Saved scatter plot");
    Ok(())
}

/// Render the scatter plot in memory.
pub fn render_image(result: &AnalysisResult, options: &PlotOptions) -> Result<RgbImage, RenderError> {
    if result.is_empty() {
        return Err(RenderError::EmptyResult);
    }
    let scale = options.text_scale.max(1);
    let line_height = (GLYPH_HEIGHT * scale) as i64;
    let mut canvas = Canvas::new(options.width, options.height, BACKGROUND);
    let [x_label, y_label] = result.axis_labels();

    let area = PlotArea {
        left: line_height * 2 + tick_label_room(scale),
        right: canvas.width() as i64 - line_height * 2,
        top: line_height * 4,
        bottom: canvas.height() as i64 - line_height * 4,
    };
    let points: Vec<_> = result.points().collect();
    let x_range = Range::covering(points.iter().map(|p| p.pca_1));
    let y_range = Range::covering(points.iter().map(|p| p.pca_2));

    canvas.fill_rect(area.left, area.top, area.width(), area.height(), PLOT_AREA);
    for tick in x_range.ticks() {
        let x = area.x_of(&x_range, tick.value);
        canvas.vline(x, area.top, area.bottom, 2, GRID);
        canvas.text_centered(x, area.bottom + line_height / 2, &tick.label, scale, TEXT);
    }
    for tick in y_range.ticks() {
        let y = area.y_of(&y_range, tick.value);
        canvas.hline(area.left, area.right, y, 2, GRID);
        let width = text_width(&tick.label, scale) as i64;
        canvas.text(
            area.left - width - line_height / 2,
            y - line_height / 2,
            &tick.label,
            scale,
            TEXT,
            1.0,
        );
    }
    canvas.hline(area.left, area.right, area.top, 2, FRAME);
    canvas.hline(area.left, area.right, area.bottom, 2, FRAME);
    canvas.vline(area.left, area.top, area.bottom, 2, FRAME);
    canvas.vline(area.right, area.top, area.bottom, 2, FRAME);

    let cluster_count = result.clusters().cluster_count();
    let marker_radius = (scale * 4) as f64;
    for point in &points {
        let marker = Marker {
            radius: marker_radius,
            fill: cluster_color(point.cluster, cluster_count),
            edge: MARKER_EDGE,
            edge_width: (scale as f64 * 0.5).max(1.0),
            alpha: 0.8,
        };
        let x = area.x_of_f(&x_range, point.pca_1);
        let y = area.y_of_f(&y_range, point.pca_2);
        canvas.disc(x, y, marker);
    }
    for point in &points {
        let x = area.x_of(&x_range, point.pca_1 + LABEL_OFFSET);
        let y = area.y_of(&y_range, point.pca_2 + LABEL_OFFSET);
        let label_scale = (scale * 2 / 3).max(1);
        canvas.text(
            x,
            y - (GLYPH_HEIGHT * label_scale) as i64,
            &point.descriptor.filename,
            label_scale,
            TEXT,
            0.7,
        );
    }

    draw_legend(&mut canvas, &area, cluster_count, scale);
    let title = format!("Audio Feature Clustering (n={})", result.len());
    canvas.text_centered(
        (area.left + area.right) / 2,
        line_height,
        &title,
        scale + 1,
        TEXT,
    );
    canvas.text_centered(
        (area.left + area.right) / 2,
        area.bottom + line_height * 2,
        &x_label,
        scale,
        TEXT,
    );
    canvas.text_vertical(line_height / 2, (area.top + area.bottom) / 2, &y_label, scale, TEXT);
    Ok(canvas.into_image())
}

fn draw_legend(canvas: &mut Canvas, area: &PlotArea, cluster_count: usize, scale: u32) {
    let line_height = (GLYPH_HEIGHT * scale) as i64;
    let row = line_height * 3 / 2;
    let width = text_width("cluster", scale) as i64 + line_height;
    let left = area.right - width - line_height;
    let top = area.top + line_height / 2;
    let height = row * (cluster_count as i64 + 1) + line_height / 2;
    canvas.fill_rect(left, top, width, height, BACKGROUND);
    canvas.text(left + line_height / 2, top + line_height / 3, "cluster", scale, TEXT, 1.0);
    for cluster in 0..cluster_count {
        let y = top + row * (cluster as i64 + 1) + line_height / 3;
        let marker = Marker {
            radius: line_height as f64 / 2.0,
            fill: cluster_color(cluster, cluster_count),
            edge: MARKER_EDGE,
            edge_width: 1.0,
            alpha: 0.8,
        };
        canvas.disc(
            (left + line_height) as f64,
            (y + line_height / 2) as f64,
            marker,
        );
        canvas.text(left + line_height * 2, y, &cluster.to_string(), scale, TEXT, 1.0);
    }
}

fn tick_label_room(scale: u32) -> i64 {
    text_width("-00.00", scale) as i64
}

/// Colour of `cluster` when `count` clusters share the viridis map.
fn cluster_color(cluster: usize, count: usize) -> Rgb<u8> {
    let t = if count <= 1 {
        0.0
    } else {
        cluster.min(count - 1) as f64 / (count - 1) as f64
    };
    let position = t * (VIRIDIS.len() - 1) as f64;
    let lower = (position.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = position - lower as f64;
    let mut rgb = [0_u8; 3];
    for (channel, value) in rgb.iter_mut().enumerate() {
        let a = VIRIDIS[lower][channel];
        let b = VIRIDIS[lower + 1][channel];
        *value = (a + (b - a) * frac).round() as u8;
    }
    Rgb(rgb)
}

struct PlotArea {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl PlotArea {
    fn width(&self) -> i64 {
        self.right - self.left
    }

    fn height(&self) -> i64 {
        self.bottom - self.top
    }

    fn x_of_f(&self, range: &Range, value: f64) -> f64 {
        self.left as f64 + range.fraction(value) * self.width() as f64
    }

    fn y_of_f(&self, range: &Range, value: f64) -> f64 {
        self.bottom as f64 - range.fraction(value) * self.height() as f64
    }

    fn x_of(&self, range: &Range, value: f64) -> i64 {
        self.x_of_f(range, value).round() as i64
    }

    fn y_of(&self, range: &Range, value: f64) -> i64 {
        self.y_of_f(range, value).round() as i64
    }
}

struct Tick {
    value: f64,
    label: String,
}

/// Data range of one axis, padded so markers and labels stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn covering(values: impl Iterator<Item = f64>) -> Self {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for value in values.filter(|v| v.is_finite()) {
            min = min.min(value);
            max = max.max(value);
        }
        if !min.is_finite() || !max.is_finite() {
            return Self { min: -1.0, max: 1.0 };
        }
        let span = max - min;
        if span <= f64::EPSILON {
            return Self {
                min: min - 1.0,
                max: max + 1.0,
            };
        }
        Self {
            min: min - span * 0.1,
            max: max + span * 0.15,
        }
    }

    fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    fn ticks(&self) -> Vec<Tick> {
        let step = nice_step((self.max - self.min) / 6.0);
        let decimals = (-step.log10().floor()).max(0.0) as usize;
        let first = (self.min / step).ceil() as i64;
        let last = (self.max / step).floor() as i64;
        (first..=last)
            .map(|i| {
                let value = i as f64 * step;
                let mut label = format!("{value:.decimals$}");
                if label.starts_with('-') && label[1..].chars().all(|c| c == '0' || c == '.') {
                    label.remove(0);
                }
                Tick { value, label }
            })
            .collect()
    }
}

/// Round `raw` up to 1, 2, or 5 times a power of ten.
fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

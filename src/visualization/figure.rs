//! Render targets: line figures and image panels/grids.
//!
//! A [`Figure`] is a plain value holding the series to draw plus axis
//! state; rendering to a PNG file happens in one go via plotters.

use std::ops::Range;
use std::path::Path;

use image::{Rgb, RgbImage};
use plotters::prelude::*;

use crate::error::{MnemosyneError, Result};

/// Default pixel size of rendered figures.
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (800, 600);

/// One line of a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    label: String,
    points: Vec<(f64, f64)>,
}

impl Series {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Options applied when a scalar column is drawn.
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Override for the x-axis range.
    pub xlim: Option<(f64, f64)>,
    /// Override for the y-axis range.
    pub ylim: Option<(f64, f64)>,
    /// Gaussian smoothing window (odd); 0 disables smoothing.
    pub smooth_window: usize,
    /// Gaussian smoothing bandwidth.
    pub smooth_sigma: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        GraphOptions {
            xlim: None,
            ylim: None,
            smooth_window: 0,
            smooth_sigma: 3.0,
        }
    }
}

/// An accumulating line chart.
#[derive(Debug, Clone, Default)]
pub struct Figure {
    title: Option<String>,
    xlim: Option<(f64, f64)>,
    ylim: Option<(f64, f64)>,
    series: Vec<Series>,
}

impl Figure {
    pub fn new() -> Self {
        Figure::default()
    }

    pub fn with_title<S: Into<String>>(title: S) -> Self {
        Figure {
            title: Some(title.into()),
            ..Figure::default()
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_xlim(&mut self, lim: (f64, f64)) {
        self.xlim = Some(lim);
    }

    pub fn set_ylim(&mut self, lim: (f64, f64)) {
        self.ylim = Some(lim);
    }

    /// Append a labeled line.
    pub fn add_series<S: Into<String>>(&mut self, label: S, points: Vec<(f64, f64)>) {
        self.series.push(Series {
            label: label.into(),
            points,
        });
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Render to a PNG file of [`DEFAULT_FIGURE_SIZE`].
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_png_sized(path, DEFAULT_FIGURE_SIZE)
    }

    /// Render to a PNG file of the given pixel size.
    pub fn save_png_sized<P: AsRef<Path>>(&self, path: P, size: (u32, u32)) -> Result<()> {
        let root = BitMapBackend::new(path.as_ref(), size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        if self.series.iter().all(|s| s.points.is_empty()) {
            return root.present().map_err(render_err);
        }

        let (x_range, y_range) = self.ranges();
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(24)
            .y_label_area_size(32)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(0)
            .y_labels(0)
            .draw()
            .map_err(render_err)?;

        for (idx, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(series.points.iter().copied(), &color))
                .map_err(render_err)?;
        }

        root.present().map_err(render_err)
    }

    fn ranges(&self) -> (Range<f64>, Range<f64>) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if let Some((lo, hi)) = self.xlim {
            x_min = lo;
            x_max = hi;
        }
        if let Some((lo, hi)) = self.ylim {
            y_min = lo;
            y_max = hi;
        }
        (padded(x_min, x_max), padded(y_min, y_max))
    }
}

/// Widen degenerate ranges so plotters always gets a non-empty span.
fn padded(lo: f64, hi: f64) -> Range<f64> {
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < f64::EPSILON {
        lo - 0.5..hi + 0.5
    } else {
        lo..hi
    }
}

fn render_err<E: std::fmt::Display>(err: E) -> MnemosyneError {
    MnemosyneError::RenderError(err.to_string())
}

/// A decoded logged image with its display title.
#[derive(Debug, Clone)]
pub struct ImagePanel {
    title: String,
    pixels: RgbImage,
}

impl ImagePanel {
    pub(crate) fn new(title: String, pixels: RgbImage) -> Self {
        ImagePanel { title, pixels }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pixels.save(path.as_ref())?;
        Ok(())
    }
}

/// Image panels arranged in a near-square grid, one per run.
#[derive(Debug, Clone)]
pub struct ImageGrid {
    panels: Vec<ImagePanel>,
}

impl ImageGrid {
    pub(crate) fn new(panels: Vec<ImagePanel>) -> Self {
        ImageGrid { panels }
    }

    pub fn panels(&self) -> &[ImagePanel] {
        &self.panels
    }

    /// Grid rows: `floor(sqrt(n))`.
    pub fn rows(&self) -> usize {
        (self.panels.len() as f64).sqrt().floor() as usize
    }

    /// Grid columns: `ceil(n / rows)`.
    pub fn cols(&self) -> usize {
        let rows = self.rows();
        if rows == 0 {
            0
        } else {
            (self.panels.len() + rows - 1) / rows
        }
    }

    /// Compose all panels onto one white canvas and save it as PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let rows = self.rows();
        let cols = self.cols();
        if rows == 0 || cols == 0 {
            return Err(MnemosyneError::invalid_parameter(
                "panels",
                "cannot render an empty image grid",
            ));
        }

        let cell_w = self.panels.iter().map(ImagePanel::width).max().unwrap_or(1);
        let cell_h = self.panels.iter().map(ImagePanel::height).max().unwrap_or(1);
        let mut canvas = RgbImage::from_pixel(
            cols as u32 * cell_w,
            rows as u32 * cell_h,
            Rgb([255, 255, 255]),
        );

        for (i, panel) in self.panels.iter().enumerate() {
            let x = (i % cols) as i64 * cell_w as i64;
            let y = (i / cols) as i64 * cell_h as i64;
            image::imageops::replace(&mut canvas, panel.pixels(), x, y);
        }

        canvas.save(path.as_ref())?;
        Ok(())
    }
}

//! Visualization of a single run directory.

use std::path::Path;

use regex::Regex;

use crate::error::{MnemosyneError, Result};
use crate::logger::{ColumnType, Logger};

use super::figure::{Figure, GraphOptions, ImagePanel};
use super::smoothing::gaussian_smooth;

/// Read-only view over one run directory.
///
/// The wrapped state is a snapshot: it only changes when
/// [`update_data`](SingleRunVisualizer::update_data) re-reads the
/// directory.
pub struct SingleRunVisualizer {
    logger: Logger,
    label_prefix: String,
}

impl SingleRunVisualizer {
    /// Open a view of the run at `path`. Fails if the directory does not
    /// exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_label_prefix(path, "")
    }

    /// Open a view whose series labels carry `label_prefix`, for telling
    /// runs apart when several are drawn on one figure.
    pub fn with_label_prefix<P: AsRef<Path>>(path: P, label_prefix: &str) -> Result<Self> {
        let logger = Logger::snapshot(path)?;
        Ok(SingleRunVisualizer {
            logger,
            label_prefix: label_prefix.to_string(),
        })
    }

    /// Re-read the run directory. On failure the previous snapshot is
    /// kept and the error only logged; refresh is best-effort.
    pub fn update_data(&mut self) {
        match Logger::snapshot(self.logger.dir()) {
            Ok(logger) => self.logger = logger,
            Err(e) => log::warn!("could not update {}: {}", self.logger.dir().display(), e),
        }
    }

    /// The label prefix applied to drawn series.
    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    /// The run directory backing this view.
    pub fn dir(&self) -> &Path {
        self.logger.dir()
    }

    /// Draw the scalar column `name` on a fresh figure.
    pub fn show_graph(&self, name: &str, opts: &GraphOptions) -> Result<Figure> {
        let mut figure = Figure::new();
        self.plot_graph_on(&mut figure, name, opts)?;
        Ok(figure)
    }

    /// Draw the scalar column `name` onto an existing figure.
    ///
    /// The non-null cells ordered by iteration become one line labeled
    /// with the view's label prefix plus the column name. Fails when the
    /// column is missing or not scalar.
    pub fn plot_graph_on(&self, figure: &mut Figure, name: &str, opts: &GraphOptions) -> Result<()> {
        let series = self.logger.scalar_series(name)?;
        let xs: Vec<f64> = series.iter().map(|&(it, _)| it as f64).collect();
        let mut ys: Vec<f64> = series.iter().map(|&(_, v)| v).collect();

        if opts.smooth_window > 0 && !ys.is_empty() {
            ys = gaussian_smooth(&ys, opts.smooth_window, opts.smooth_sigma)?;
        }

        let points = xs.into_iter().zip(ys).collect();
        figure.add_series(format!("{}{}", self.label_prefix, name), points);

        if let Some(lim) = opts.xlim {
            figure.set_xlim(lim);
        }
        if let Some(lim) = opts.ylim {
            figure.set_ylim(lim);
        }
        Ok(())
    }

    /// Decode the image logged under `name` at `iteration`.
    ///
    /// Fails when the column is missing or not an image column, when no
    /// image was logged at that iteration, or when the backing file is
    /// gone.
    pub fn show_img(&self, name: &str, iteration: i64) -> Result<ImagePanel> {
        let path = self.logger.image_path(name, iteration)?;
        let pixels = image::open(&path)?.to_rgb8();
        Ok(ImagePanel::new(
            format!("{}{}", self.label_prefix, name),
            pixels,
        ))
    }

    /// Draw every scalar column whose name fully matches one of the
    /// given patterns.
    ///
    /// One pattern groups all its matches onto one shared figure; with
    /// several patterns each pattern gets its own figure holding all of
    /// its matches.
    pub fn show_matching_scalars(
        &self,
        patterns: &[&str],
        opts: &GraphOptions,
    ) -> Result<Vec<Figure>> {
        let mut figures = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let names = self.matching_columns(pattern)?;
            let mut figure = Figure::new();
            for name in &names {
                self.plot_graph_on(&mut figure, name, opts)?;
            }
            figures.push(figure);
        }
        Ok(figures)
    }

    /// Draw the given scalar columns: all overlaid on one figure, or one
    /// figure each.
    pub fn show_scalars(
        &self,
        names: &[&str],
        overlay: bool,
        opts: &GraphOptions,
    ) -> Result<Vec<Figure>> {
        if overlay {
            let mut figure = Figure::new();
            for name in names {
                self.plot_graph_on(&mut figure, name, opts)?;
            }
            Ok(vec![figure])
        } else {
            names
                .iter()
                .map(|name| self.show_graph(name, opts))
                .collect()
        }
    }

    /// Draw every scalar-typed column.
    pub fn show_all_scalars(&self, overlay: bool, opts: &GraphOptions) -> Result<Vec<Figure>> {
        let names = self.scalar_columns();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.show_scalars(&refs, overlay, opts)
    }

    /// All column names, in creation order.
    pub fn get_cols(&self) -> Vec<String> {
        self.logger.columns()
    }

    /// The iterations where `col` holds a value.
    pub fn get_non_null_index(&self, col: &str) -> Result<Vec<i64>> {
        self.logger.non_null_index(col)
    }

    pub(crate) fn scalar_columns(&self) -> Vec<String> {
        self.logger
            .columns()
            .into_iter()
            .filter(|name| self.logger.column_type(name) == Some(ColumnType::Scalar))
            .collect()
    }

    fn matching_columns(&self, pattern: &str) -> Result<Vec<String>> {
        let re = full_match_regex(pattern)?;
        Ok(self
            .get_cols()
            .into_iter()
            .filter(|name| re.is_match(name))
            .collect())
    }
}

/// Compile `pattern` so it must match a whole column name.
pub(crate) fn full_match_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!(r"\A(?:{})\z", pattern)).map_err(|e| {
        MnemosyneError::invalid_parameter("pattern".to_string(), e.to_string())
    })
}

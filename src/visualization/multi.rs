//! Comparison of several runs on shared figures.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{MnemosyneError, Result};

use super::figure::{Figure, GraphOptions, ImageGrid};
use super::single::{full_match_regex, SingleRunVisualizer};

/// Composes one [`SingleRunVisualizer`] per run for side-by-side
/// comparison.
///
/// Runs are heterogeneous: not every run needs every column. The batch
/// entry points therefore skip (run, column) pairs where the column is
/// absent or has the wrong type, and only those; any other failure
/// propagates.
pub struct MultiRunVisualizer {
    visualizers: Vec<SingleRunVisualizer>,
}

impl MultiRunVisualizer {
    /// Open one view per path. Each view's label prefix is the path's
    /// final segment followed by `/`.
    pub fn new<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(MnemosyneError::invalid_parameter(
                "paths",
                "at least one run directory is required",
            ));
        }
        let mut visualizers = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let label = match path.file_name() {
                Some(name) => format!("{}/", name.to_string_lossy()),
                None => String::from("/"),
            };
            visualizers.push(SingleRunVisualizer::with_label_prefix(path, &label)?);
        }
        Ok(MultiRunVisualizer { visualizers })
    }

    /// The constituent views, in input order.
    pub fn visualizers(&self) -> &[SingleRunVisualizer] {
        &self.visualizers
    }

    /// Refresh every constituent view (each one best-effort).
    pub fn update_data(&mut self) {
        for viz in &mut self.visualizers {
            viz.update_data();
        }
    }

    /// Single-column plotting is not available across runs; a name need
    /// not exist in every run. Use the batch or matching entry points.
    pub fn show_graph(&self, _name: &str, _opts: &GraphOptions) -> Result<Figure> {
        Err(MnemosyneError::Unsupported(
            "show_graph on a multi-run view; use show_scalars or show_matching_scalars",
        ))
    }

    /// Decode the image logged under `name` at `iteration` in every run
    /// and arrange the panels in a near-square grid.
    pub fn show_img(&self, name: &str, iteration: i64) -> Result<ImageGrid> {
        let mut panels = Vec::with_capacity(self.visualizers.len());
        for viz in &self.visualizers {
            panels.push(viz.show_img(name, iteration)?);
        }
        Ok(ImageGrid::new(panels))
    }

    /// Draw all columns fully matching each pattern, across all runs.
    ///
    /// Every pattern gets one figure; all of its matches from all runs
    /// share it.
    pub fn show_matching_scalars(
        &self,
        patterns: &[&str],
        opts: &GraphOptions,
    ) -> Result<Vec<Figure>> {
        let mut figures = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let re = full_match_regex(pattern)?;
            let names: BTreeSet<String> = self
                .get_cols()
                .into_iter()
                .filter(|name| re.is_match(name))
                .collect();

            let mut figure = Figure::new();
            for name in &names {
                for viz in &self.visualizers {
                    self.plot_tolerant(&mut figure, viz, name, opts)?;
                }
            }
            figures.push(figure);
        }
        Ok(figures)
    }

    /// Draw the given columns across all runs: everything on one figure,
    /// or one figure per column with that column's runs overlaid.
    pub fn show_scalars(
        &self,
        names: &[&str],
        overlay: bool,
        opts: &GraphOptions,
    ) -> Result<Vec<Figure>> {
        if overlay {
            let mut figure = Figure::new();
            for name in names {
                for viz in &self.visualizers {
                    self.plot_tolerant(&mut figure, viz, name, opts)?;
                }
            }
            Ok(vec![figure])
        } else {
            let mut figures = Vec::with_capacity(names.len());
            for name in names {
                let mut figure = Figure::new();
                for viz in &self.visualizers {
                    self.plot_tolerant(&mut figure, viz, name, opts)?;
                }
                figures.push(figure);
            }
            Ok(figures)
        }
    }

    /// Draw every column that is scalar-typed in at least one run.
    pub fn show_all_scalars(&self, overlay: bool, opts: &GraphOptions) -> Result<Vec<Figure>> {
        let names: BTreeSet<String> = self
            .visualizers
            .iter()
            .flat_map(|viz| viz.scalar_columns())
            .collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        self.show_scalars(&refs, overlay, opts)
    }

    /// The deduplicated union of all runs' column names.
    pub fn get_cols(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .visualizers
            .iter()
            .flat_map(|viz| viz.get_cols())
            .collect();
        names.into_iter().collect()
    }

    /// Per run, the iterations where `col` holds a value. Runs without
    /// the column contribute an empty list.
    pub fn get_non_null_index(&self, col: &str) -> Vec<Vec<i64>> {
        self.visualizers
            .iter()
            .map(|viz| viz.get_non_null_index(col).unwrap_or_default())
            .collect()
    }

    /// Draw one (run, column) pair, tolerating absent or mistyped
    /// columns in that run.
    fn plot_tolerant(
        &self,
        figure: &mut Figure,
        viz: &SingleRunVisualizer,
        name: &str,
        opts: &GraphOptions,
    ) -> Result<()> {
        match viz.plot_graph_on(figure, name, opts) {
            Ok(()) => Ok(()),
            Err(MnemosyneError::ColumnNotFound(_)) | Err(MnemosyneError::TypeMismatch { .. }) => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

//! # Mnemosyne - Training Run Logging and Visualization
//!
//! Mnemosyne records the metrics a training process produces (scalars,
//! text snippets, and images) into a run directory on disk, and plots
//! them back for inspection and cross-run comparison.
//!
//! ## Key Features
//!
//! - **Typed columns**: every series is scalar, text, or image for its
//!   whole lifetime; mismatched writes fail instead of corrupting data
//! - **Buffered persistence**: the table is written every `save_freq`
//!   mutating calls, with an explicit `flush()` for the tail of a run
//! - **Name scoping**: prefix/postfix state groups metrics (e.g. under
//!   `train/` or `eval/`) without assembling full names at every call
//! - **Comparison**: the same series from several runs overlaid on one
//!   figure, matched by name or by regular expression
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mnemosyne::logger::Logger;
//! use mnemosyne::visualization::{GraphOptions, SingleRunVisualizer};
//!
//! # fn main() -> mnemosyne::error::Result<()> {
//! // Log a short training run
//! let mut logger = Logger::open("runs/example", false)?;
//! for step in 0..100 {
//!     logger.add_scalar("train/loss", 1.0 / (step + 1) as f64, Some(step))?;
//! }
//! logger.flush()?;
//!
//! // Plot it
//! let viz = SingleRunVisualizer::new("runs/example")?;
//! let figure = viz.show_graph("train/loss", &GraphOptions::default())?;
//! figure.save_png("loss.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`error`] - Error types and result handling
//! - [`logger`] - The run logger: typed table, metadata, persistence
//! - [`visualization`] - Figures, smoothing, single- and multi-run views

pub mod error;
pub mod logger;
pub mod visualization;

#[cfg(test)]
mod tests;

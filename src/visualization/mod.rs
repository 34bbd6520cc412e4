//! Plotting and comparison of logged runs.

pub mod figure;
pub mod multi;
pub mod single;
pub mod smoothing;

pub use figure::{Figure, GraphOptions, ImageGrid, ImagePanel, Series, DEFAULT_FIGURE_SIZE};
pub use multi::MultiRunVisualizer;
pub use single::SingleRunVisualizer;
pub use smoothing::gaussian_smooth;

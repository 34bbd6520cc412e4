//! Gaussian-kernel smoothing for displayed scalar series.

use crate::error::{MnemosyneError, Result};

/// Smooth `data` with a normalized Gaussian kernel of length `window`
/// and bandwidth `sigma`.
///
/// The input is padded by replicating the first and last value `window/2`
/// samples on each side, then convolved in valid mode, so the output has
/// exactly the input's length. `window` must be odd, at least 1, and no
/// longer than the series.
pub fn gaussian_smooth(data: &[f64], window: usize, sigma: f64) -> Result<Vec<f64>> {
    if data.is_empty() {
        return Err(MnemosyneError::invalid_parameter(
            "data",
            "cannot smooth an empty series",
        ));
    }
    if window == 0 || window % 2 == 0 {
        return Err(MnemosyneError::invalid_parameter(
            "window".to_string(),
            format!("smoothing window must be odd and positive, got {}", window),
        ));
    }
    if window > data.len() {
        return Err(MnemosyneError::invalid_parameter(
            "window".to_string(),
            format!(
                "smoothing window {} exceeds series length {}",
                window,
                data.len()
            ),
        ));
    }
    if sigma <= 0.0 {
        return Err(MnemosyneError::invalid_parameter(
            "sigma".to_string(),
            format!("smoothing bandwidth must be positive, got {}", sigma),
        ));
    }

    let half = (window / 2) as i64;
    let norm = 1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    let mut kernel: Vec<f64> = (-half..=half)
        .map(|k| {
            let z = k as f64 / sigma;
            norm * (-0.5 * z * z).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }

    let half = window / 2;
    let mut padded = Vec::with_capacity(data.len() + window - 1);
    padded.extend(std::iter::repeat(data[0]).take(half));
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(data[data.len() - 1]).take(half));

    Ok(padded
        .windows(window)
        .map(|w| w.iter().zip(&kernel).map(|(x, k)| x * k).sum())
        .collect())
}

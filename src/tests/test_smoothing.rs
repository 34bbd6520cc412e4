use crate::visualization::gaussian_smooth;

#[test]
fn test_smoothing_preserves_length() {
    let input: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let out = gaussian_smooth(&input, 3, 6.0).unwrap();
    assert_eq!(out.len(), input.len());
}

#[test]
fn test_smoothing_preserves_length_for_all_valid_windows() {
    let input: Vec<f64> = (0..25).map(|i| (i as f64 * 0.3).sin()).collect();
    for window in (1..=25).step_by(2) {
        for sigma in [0.5, 1.0, 3.0, 10.0] {
            let out = gaussian_smooth(&input, window, sigma).unwrap();
            assert_eq!(out.len(), input.len(), "window={} sigma={}", window, sigma);
        }
    }
}

#[test]
fn test_window_of_one_is_identity() {
    let input = vec![3.0, -1.0, 4.0, 1.5];
    let out = gaussian_smooth(&input, 1, 3.0).unwrap();
    for (a, b) in input.iter().zip(&out) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn test_constant_series_stays_constant() {
    let input = vec![2.5; 12];
    let out = gaussian_smooth(&input, 5, 2.0).unwrap();
    for v in out {
        assert!((v - 2.5).abs() < 1e-12);
    }
}

#[test]
fn test_smoothing_dampens_oscillation() {
    let input: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
    let out = gaussian_smooth(&input, 5, 2.0).unwrap();
    let max_in = input.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let max_out = out.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    assert!(max_out < max_in);
}

#[test]
fn test_invalid_windows_are_rejected() {
    let input = vec![1.0, 2.0, 3.0];
    assert!(gaussian_smooth(&input, 0, 3.0).is_err());
    assert!(gaussian_smooth(&input, 2, 3.0).is_err());
    assert!(gaussian_smooth(&input, 5, 3.0).is_err());
    assert!(gaussian_smooth(&input, 3, 0.0).is_err());
    assert!(gaussian_smooth(&[], 1, 3.0).is_err());
}

#[test]
fn test_single_sample_series() {
    let out = gaussian_smooth(&[42.0], 1, 3.0).unwrap();
    assert_eq!(out.len(), 1);
    assert!((out[0] - 42.0).abs() < 1e-12);
}

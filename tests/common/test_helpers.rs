//! Helper functions for integration tests

/// Assert that two floats agree within tolerance.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64, message: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff < tolerance,
        "{}: {} differs from {} by {} (tolerance {})",
        message,
        actual,
        expected,
        diff,
        tolerance
    );
}

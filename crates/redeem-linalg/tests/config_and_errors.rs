//! Integration tests for LinalgConfig and the error types.

use redeem_linalg::{LinalgConfig, LinalgError, Matrix};

// ---------------------------------------------------------------------------
// LinalgConfig
// ---------------------------------------------------------------------------

#[test]
fn config_default_values() {
    let cfg = LinalgConfig::default();
    assert!((cfg.tolerance - 1.0e-6).abs() < 1e-18);
    assert_eq!(cfg.precision, 6);
}

#[test]
fn config_serializes_to_json() {
    let cfg = LinalgConfig::default();
    let json = cfg.to_json().unwrap();
    assert!(json.contains("tolerance"));
    assert!(json.contains("precision"));
}

#[test]
fn config_round_trips_json() {
    let cfg = LinalgConfig::new(1.0e-3, 2);
    let json = serde_json::to_string(&cfg).unwrap();
    let cfg2: LinalgConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(cfg, cfg2);
}

#[test]
fn config_partial_json_uses_defaults() {
    let cfg = LinalgConfig::from_json(r#"{ "precision": 3 }"#).unwrap();
    assert_eq!(cfg.precision, 3);
    assert_eq!(cfg.tolerance, LinalgConfig::DEFAULT_TOLERANCE);
}

#[test]
fn config_invalid_json_errors() {
    let err = LinalgConfig::from_json("{ precision: }").unwrap_err();
    assert!(err.to_string().contains("linalg config"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_messages() {
    assert_eq!(
        LinalgError::NonZeroReference { live_views: 2 }.to_string(),
        "cannot free memory with non-zero reference count (2 live views)"
    );
    assert_eq!(
        LinalgError::Index { index: 5, bound: 4 }.to_string(),
        "index 5 out of bounds for length 4"
    );
    assert!(LinalgError::Allocation { len: 3 }
        .to_string()
        .starts_with("memory allocation error"));
    assert_eq!(
        LinalgError::ShapeMismatch {
            expected: (2, 3),
            found: (3, 2)
        }
        .to_string(),
        "shape mismatch: expected (2, 3), found (3, 2)"
    );
    assert_eq!(
        LinalgError::LiveViews { live_views: 1 }.to_string(),
        "operation would invalidate 1 live views"
    );
    assert_eq!(
        LinalgError::Aliased.to_string(),
        "destination shares memory with an operand"
    );
}

#[test]
fn release_error_display_and_source() {
    use std::error::Error;

    let m = Matrix::zeros(2, 2).unwrap();
    let row = m.row_view(0).unwrap();
    let err = m.release().unwrap_err();
    assert!(err.to_string().starts_with("release failed"));
    assert!(err.source().is_some());
    drop(row);
    err.into_inner().release().unwrap();
}

#[test]
fn errors_compose_with_anyhow() {
    fn build() -> anyhow::Result<Matrix> {
        Ok(Matrix::from_slice(2, 2, &[1.0])?)
    }
    assert!(build().is_err());
}

#[test]
fn oversized_matrix_reports_allocation_error() {
    assert!(matches!(
        Matrix::new(usize::MAX, 2),
        Err(LinalgError::Allocation { .. })
    ));
}

//! Integration tests for the Vector engine.

use redeem_linalg::{LinalgConfig, LinalgError, Vector};

fn vec_of(values: &[f64]) -> Vector {
    Vector::from_slice(values).unwrap()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn vector_zeros() {
    let v = Vector::zeros(3).unwrap();
    let target = vec_of(&[0.0, 0.0, 0.0]);
    assert!(v.equal(&target, 1.0e-6));
}

#[test]
fn vector_ones() {
    let v = Vector::ones(3).unwrap();
    let target = vec_of(&[1.0, 1.0, 1.0]);
    assert!(v.equal(&target, 1.0e-6));
}

#[test]
fn vector_constant_any_length() {
    for len in [0usize, 1, 7, 64] {
        let v = Vector::constant(len, -2.5).unwrap();
        assert_eq!(v.len(), len);
        assert!(v.iter().all(|x| x == -2.5));
    }
}

#[test]
fn vector_linspace() {
    let v = Vector::linspace(3, 1.0, 3.0).unwrap();
    assert!(v.equal(&vec_of(&[1.0, 2.0, 3.0]), 1.0e-6));

    let v = Vector::linspace(5, 0.0, 1.0).unwrap();
    assert!(v.equal(&vec_of(&[0.0, 0.25, 0.5, 0.75, 1.0]), 1.0e-12));
}

#[test]
fn vector_linspace_degenerate_lengths() {
    let single = Vector::linspace(1, 4.0, 9.0).unwrap();
    assert_eq!(single.to_vec(), vec![4.0]);
    assert!(Vector::linspace(0, 4.0, 9.0).unwrap().is_empty());
}

#[test]
fn vector_from_vec_and_try_from() {
    let v = Vector::from_vec(vec![1.0, 2.0]).unwrap();
    let w = Vector::try_from(vec![1.0, 2.0]).unwrap();
    assert!(v.equal(&w, 0.0));
    assert!(!v.is_view());
    assert_eq!(v.live_view_count(), Some(0));
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[test]
fn vector_add_and_sub() {
    let a = vec_of(&[0.0, 1.0, 1.0]);
    let b = vec_of(&[1.0, 1.0, 1.0]);
    assert!(a.add(&b).unwrap().equal(&vec_of(&[1.0, 2.0, 2.0]), 1.0e-6));
    assert!(a.sub(&b).unwrap().equal(&vec_of(&[-1.0, 0.0, 0.0]), 1.0e-6));
}

#[test]
fn vector_add_into_existing_destination() {
    let a = vec_of(&[0.0, 1.0, 1.0]);
    let b = vec_of(&[1.0, 1.0, 1.0]);
    let dst = Vector::new(3).unwrap();
    dst.add_into(&a, &b).unwrap();
    assert_eq!(dst.to_vec(), vec![1.0, 2.0, 2.0]);
    dst.sub_into(&dst, &b).unwrap();
    assert_eq!(dst.to_vec(), a.to_vec());
}

#[test]
fn vector_length_mismatch_errors() {
    let a = vec_of(&[1.0, 2.0, 3.0]);
    let b = vec_of(&[1.0, 2.0]);
    assert!(matches!(a.add(&b), Err(LinalgError::ShapeMismatch { .. })));
    assert!(matches!(a.sub(&b), Err(LinalgError::ShapeMismatch { .. })));
    assert!(matches!(a.dot(&b), Err(LinalgError::ShapeMismatch { .. })));
    assert!(a.copy_into(&b).is_err());

    let dst = Vector::new(2).unwrap();
    assert!(dst.add_into(&a, &a).is_err());
    assert!(dst.scalar_mul_into(&a, 2.0).is_err());
    assert!(dst.normalize_into(&a).is_err());
}

#[test]
fn vector_scalar_mul() {
    let v = vec_of(&[0.0, 1.0, 1.0]);
    assert!(v.scalar_mul(2.0).unwrap().equal(&vec_of(&[0.0, 2.0, 2.0]), 1.0e-6));
}

#[test]
fn vector_dot_and_norm() {
    let a = vec_of(&[1.0, 1.0, 0.0]);
    let b = vec_of(&[0.0, 1.0, 1.0]);
    assert_eq!(a.dot(&b).unwrap(), 1.0);
    assert!((vec_of(&[1.0, 1.0, 1.0]).norm() - 3f64.sqrt()).abs() < 1.0e-12);
}

#[test]
fn vector_normalize() {
    let v = vec_of(&[1.0, 1.0, 0.0]);
    let h = 1.0 / 2f64.sqrt();
    assert!(v.normalize().unwrap().equal(&vec_of(&[h, h, 0.0]), 1.0e-6));
}

#[test]
fn vector_normalize_zero_is_nan() {
    let v = Vector::zeros(2).unwrap();
    let n = v.normalize().unwrap();
    assert!(n.iter().all(f64::is_nan));
}

// ---------------------------------------------------------------------------
// Copies and equality
// ---------------------------------------------------------------------------

#[test]
fn vector_copy_is_independent_owner() {
    let v = vec_of(&[3.0, 1.0, 4.0]);
    let c = v.copy().unwrap();
    assert!(c.equal(&v, 0.0));
    assert!(!c.is_view());

    c.set(0, 100.0).unwrap();
    assert_eq!(v.get(0), Some(3.0));

    c.release().unwrap();
    assert_eq!(v.to_vec(), vec![3.0, 1.0, 4.0]);
    v.release().unwrap();
}

#[test]
fn vector_equal_is_componentwise() {
    let a = vec_of(&[0.0, 0.0, 0.0]);
    let b = vec_of(&[0.5, 0.5, 0.5]);
    // Euclidean distance is ~0.87 but each component is within 0.5.
    assert!(a.equal(&b, 0.5));
    assert!(!a.equal(&vec_of(&[0.0, 0.6, 0.0]), 0.5));
    assert!(!a.equal(&vec_of(&[0.0, 0.0]), 10.0));
}

#[test]
fn vector_approx_eq_uses_config_tolerance() {
    let a = vec_of(&[1.0, 2.0]);
    let b = vec_of(&[1.0 + 1.0e-7, 2.0]);
    assert!(a.approx_eq(&b, &LinalgConfig::default()));
    assert!(!a.approx_eq(&b, &LinalgConfig::new(1.0e-9, 6)));
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn vector_to_string_six_decimals() {
    let v = vec_of(&[1.0, -0.5, 2.0 / 3.0]);
    assert_eq!(v.to_string(), "[1.000000, -0.500000, 0.666667]");
}

#[test]
fn vector_render_precision() {
    let v = vec_of(&[1.0, 2.25]);
    assert_eq!(v.render(2), "[1.00, 2.25]");
    assert_eq!(v.render_with(&LinalgConfig::new(1.0e-6, 0)), "[1, 2]");
}

#[test]
fn vector_get_set_bounds() {
    let v = Vector::zeros(2).unwrap();
    assert_eq!(v.get(2), None);
    assert_eq!(
        v.set(2, 1.0).unwrap_err(),
        LinalgError::Index { index: 2, bound: 2 }
    );
}

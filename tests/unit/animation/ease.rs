use super::*;

#[test]
fn endpoints_are_fixed() {
    assert_eq!(Ease::OutCubic.apply(0.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(1.0), 1.0);
}

#[test]
fn out_cubic_front_loads_motion() {
    assert!(Ease::OutCubic.apply(0.25) > 0.25);
    assert!((Ease::OutCubic.apply(0.5) - 0.875).abs() < 1e-12);
}

#[test]
fn progress_is_monotonic() {
    let samples: Vec<f64> = (0..=20).map(|i| Ease::OutCubic.apply(f64::from(i) / 20.0)).collect();
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::OutCubic.apply(-1.0), 0.0);
    assert_eq!(Ease::OutCubic.apply(2.0), 1.0);
}

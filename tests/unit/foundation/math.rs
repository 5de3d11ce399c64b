use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn rng_is_reproducible_for_a_seed() {
    let mut a = Rng64::new(42);
    let mut b = Rng64::new(42);
    for _ in 0..16 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
    let mut c = Rng64::new(43);
    assert_ne!(Rng64::new(42).next_u64(), c.next_u64());
}

#[test]
fn rng_ranges_are_respected() {
    let mut rng = Rng64::new(7);
    for _ in 0..1000 {
        let f = rng.next_f64_01();
        assert!((0.0..1.0).contains(&f));
        assert!(rng.next_below(4) < 4);
    }
    assert_eq!(rng.next_below(0), 0);
}

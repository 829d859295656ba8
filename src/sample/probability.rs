//! A representation of a numeric probability

#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub fn new(v: f64) -> Probability {
        assert!((0.0..=1.0).contains(&v), "{} ∉ [0.0..1.0]", v);
        Probability(v)
    }

    /// `num / den` forced into `[0, 1]`. Rounding can push a ratio of
    /// accumulated masses slightly past 1, and a zero denominator gives NaN,
    /// which is read as 0.
    pub fn from_ratio(num: f64, den: f64) -> Probability {
        let p = num / den;
        if p.is_nan() {
            Probability(0.0)
        } else {
            Probability(p.clamp(0.0, 1.0))
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

#[test]
fn test_from_ratio() {
    assert_eq!(Probability::from_ratio(1.0, 4.0).as_f64(), 0.25);
    assert_eq!(Probability::from_ratio(1.0 + 1e-15, 1.0).as_f64(), 1.0);
    assert_eq!(Probability::from_ratio(0.0, 0.0).as_f64(), 0.0);
    assert_eq!(Probability::from_ratio(3.0, 0.0).as_f64(), 1.0);
}

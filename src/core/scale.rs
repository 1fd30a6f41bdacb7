//! Continuous scales mapping a data domain onto a visual range.

/// Square-root scale: `range.0 + (range.1 - range.0) * sqrt(v / domain_max)`.
///
/// Inputs are clamped to `[0, domain_max]`, so the output always lies inside
/// the range and the mapping is monotonic. A degenerate domain (`domain_max <= 0`)
/// maps every input to the lower range bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain_max: f64,
    range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain_max: f64, range: (f64, f64)) -> Self {
        let domain_max = if domain_max.is_finite() { domain_max } else { 0.0 };
        Self { domain_max, range }
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        if self.domain_max <= 0.0 || value.is_nan() {
            return r0;
        }

        let t = (value.clamp(0.0, self.domain_max) / self.domain_max).sqrt();
        r0 + (r1 - r0) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let scale = SqrtScale::new(4.0, (0.0, 10.0));
        assert_eq!(scale.apply(0.0), 0.0);
        assert_eq!(scale.apply(4.0), 10.0);
        assert_eq!(scale.apply(1.0), 5.0);
    }

    #[test]
    fn test_monotonic() {
        let scale = SqrtScale::new(7.3, (0.0, 10.0));
        let mut previous = scale.apply(0.0);
        for step in 1..=100 {
            let r = scale.apply(step as f64 * 0.073);
            assert!(r >= previous);
            previous = r;
        }
    }

    #[test]
    fn test_out_of_domain_is_clamped() {
        let scale = SqrtScale::new(4.0, (0.0, 10.0));
        assert_eq!(scale.apply(-2.0), 0.0);
        assert_eq!(scale.apply(9.0), 10.0);
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = SqrtScale::new(0.0, (0.0, 10.0));
        assert_eq!(scale.apply(0.0), 0.0);
        assert_eq!(SqrtScale::new(f64::NAN, (1.0, 10.0)).apply(3.0), 1.0);
    }
}

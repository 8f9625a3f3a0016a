/// Linear map from a data domain onto a visual range, clamped to the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64), // Data min/max
    pub range: (f64, f64),  // Output min/max
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale from zero up to the largest value in `values`.
    ///
    /// Non-finite values are ignored. Without a positive maximum the domain
    /// collapses and every value maps to the bottom of the range.
    pub fn from_zero(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
        let max = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        Self::new((0.0, max), range)
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if !value.is_finite() || span <= 0.0 {
            return r0;
        }
        let t = ((value - d0) / span).clamp(0.0, 1.0);
        r0 + t * (r1 - r0)
    }
}

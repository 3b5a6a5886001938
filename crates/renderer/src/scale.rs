//! Value domain selection and normalization to palette indices.

use tracing::warn;

/// Lower percentile used for automatic color ranges.
pub const AUTO_RANGE_LOW_PERCENTILE: f64 = 2.0;
/// Upper percentile used for automatic color ranges.
pub const AUTO_RANGE_HIGH_PERCENTILE: f64 = 98.0;

/// Value range and gamma mapping data onto the 256 palette entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueDomain {
    pub lo: f64,
    pub hi: f64,
    pub gamma: f64,
}

impl ValueDomain {
    /// Build a domain, widening an empty or inverted range to `lo + 1`
    /// and replacing an unusable gamma with 1.0.
    pub fn new(lo: f64, hi: f64, gamma: f64) -> Self {
        let hi = if hi <= lo { lo + 1.0 } else { hi };
        Self {
            lo,
            hi,
            gamma: effective_gamma(gamma),
        }
    }

    /// Domain from an explicit "min,max" range, else the 2nd/98th
    /// percentiles of the finite values. Returns `None` when there is no
    /// finite value to derive a range from.
    pub fn resolve(values: &[f64], range: Option<&str>, gamma: f64) -> Option<Self> {
        if let Some(raw) = range {
            match parse_range(raw) {
                Some((lo, hi)) => return Some(Self::new(lo, hi, gamma)),
                None => warn!(colorscalerange = %raw, "Ignoring unparsable color scale range"),
            }
        }

        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(|a, b| a.total_cmp(b));

        let lo = percentile_sorted(&finite, AUTO_RANGE_LOW_PERCENTILE);
        let hi = percentile_sorted(&finite, AUTO_RANGE_HIGH_PERCENTILE);
        Some(Self::new(lo, hi, gamma))
    }

    /// Palette index for a finite value: `trunc(clamp(norm, 0, 1)^gamma * 255)`.
    pub fn index(&self, value: f64) -> u8 {
        let norm = ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        (norm.powf(self.gamma) * 255.0) as u8
    }
}

/// Gamma must be finite and positive; anything else means linear.
pub fn effective_gamma(gamma: f64) -> f64 {
    if gamma.is_finite() && gamma > 0.0 {
        gamma
    } else {
        1.0
    }
}

/// Parse "min,max" into two finite numbers.
pub fn parse_range(s: &str) -> Option<(f64, f64)> {
    let (lo, hi) = s.split_once(',')?;
    let lo: f64 = lo.trim().parse().ok()?;
    let hi: f64 = hi.trim().parse().ok()?;
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

/// Percentile of ascending `sorted` values, interpolating linearly between
/// the two closest ranks.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let below = rank.floor() as usize;
            let above = (below + 1).min(n - 1);
            let frac = rank - below as f64;
            sorted[below] + (sorted[above] - sorted[below]) * frac
        }
    }
}

//! Range narrowing used by biased integer generation.

/// Inclusive range of candidate integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiasedRange {
    pub min: i128,
    pub max: i128,
}

impl BiasedRange {
    pub fn new(min: i128, max: i128) -> Self {
        Self { min, max }
    }
}

/// `floor(log2(value))`, and `0` for non-positive inputs
pub fn integer_log_like(value: i128) -> i128 {
    if value <= 0 {
        return 0;
    }
    log_like_magnitude(value.unsigned_abs())
}

fn log_like_magnitude(value: u128) -> i128 {
    if value == 0 {
        return 0;
    }
    (127 - value.leading_zeros()) as i128
}

/// Sub-ranges of `[min, max]` where bugs tend to live.
///
/// - A single-value range is returned as is.
/// - A range straddling zero yields three ranges: around zero, close to
///   `max`, close to `min`.
/// - Otherwise two ranges of width `log2(max - min)`, the one closest to
///   zero first.
///
/// The first entry is the one picked most often by the caller.
pub fn bias_numeric_range(min: i128, max: i128) -> Vec<BiasedRange> {
    if min == max {
        return vec![BiasedRange::new(min, max)];
    }
    if min < 0 && max > 0 {
        let log_min = log_like_magnitude(min.unsigned_abs());
        let log_max = log_like_magnitude(max.unsigned_abs());
        return vec![
            BiasedRange::new(-log_min, log_max),
            BiasedRange::new(max - log_max, max),
            BiasedRange::new(min, min + log_min),
        ];
    }
    let log_gap = log_like_magnitude(max.abs_diff(min));
    let close_to_min = BiasedRange::new(min, min + log_gap);
    let close_to_max = BiasedRange::new(max - log_gap, max);
    if min < 0 {
        vec![close_to_max, close_to_min]
    } else {
        vec![close_to_min, close_to_max]
    }
}

//! Size tokens and their resolution into concrete length bounds and depth biases.
//!
//! Every function here is pure: the `*_with` forms take the global parameters
//! explicitly, the short forms read the current thread's parameters through
//! [`read_configure_global`] and delegate.

use std::fmt;
use std::str::FromStr;

use crate::config::{GlobalParameters, read_configure_global};
use crate::error::SizeParseError;

/// Upper bound applied to lengths when no maximum is given
pub const MAX_LENGTH_UPPER_BOUND: usize = 0x7fff_ffff;

/// Size used when neither the arbitrary nor the global parameters set one
pub const DEFAULT_SIZE: Size = Size::Small;

/// Ordered magnitude hint, `XSmall < Small < Medium < Large < XLarge`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Size {
    XSmall,
    Small,
    Medium,
    Large,
    XLarge,
}

impl Size {
    /// All sizes in increasing order
    pub const ALL: [Size; 5] = [
        Size::XSmall,
        Size::Small,
        Size::Medium,
        Size::Large,
        Size::XLarge,
    ];

    fn index(self) -> i32 {
        match self {
            Size::XSmall => 0,
            Size::Small => 1,
            Size::Medium => 2,
            Size::Large => 3,
            Size::XLarge => 4,
        }
    }

    fn from_index_clamped(index: i32) -> Size {
        Size::ALL[index.clamp(0, 4) as usize]
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Size::XSmall => "xsmall",
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
            Size::XLarge => "xlarge",
        };
        f.write_str(name)
    }
}

impl FromStr for Size {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xsmall" => Ok(Size::XSmall),
            "small" => Ok(Size::Small),
            "medium" => Ok(Size::Medium),
            "large" => Ok(Size::Large),
            "xlarge" => Ok(Size::XLarge),
            other => Err(SizeParseError::UnknownSize(other.to_string())),
        }
    }
}

/// Offset from the configured baseline size, between `-4` and `+4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RelativeSize {
    Minus4,
    Minus3,
    Minus2,
    Minus1,
    Equal,
    Plus1,
    Plus2,
    Plus3,
    Plus4,
}

impl RelativeSize {
    /// Signed offset in size buckets
    pub fn offset(self) -> i32 {
        match self {
            RelativeSize::Minus4 => -4,
            RelativeSize::Minus3 => -3,
            RelativeSize::Minus2 => -2,
            RelativeSize::Minus1 => -1,
            RelativeSize::Equal => 0,
            RelativeSize::Plus1 => 1,
            RelativeSize::Plus2 => 2,
            RelativeSize::Plus3 => 3,
            RelativeSize::Plus4 => 4,
        }
    }
}

impl fmt::Display for RelativeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset() {
            0 => f.write_str("="),
            offset => write!(f, "{:+}", offset),
        }
    }
}

impl FromStr for RelativeSize {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-4" => Ok(RelativeSize::Minus4),
            "-3" => Ok(RelativeSize::Minus3),
            "-2" => Ok(RelativeSize::Minus2),
            "-1" => Ok(RelativeSize::Minus1),
            "=" => Ok(RelativeSize::Equal),
            "+1" => Ok(RelativeSize::Plus1),
            "+2" => Ok(RelativeSize::Plus2),
            "+3" => Ok(RelativeSize::Plus3),
            "+4" => Ok(RelativeSize::Plus4),
            other => Err(SizeParseError::UnknownRelativeSize(other.to_string())),
        }
    }
}

/// Size hint accepted by length-bounded arbitraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeForArbitrary {
    Size(Size),
    Relative(RelativeSize),
    /// Use the maximal allowed bound
    Max,
}

impl From<Size> for SizeForArbitrary {
    fn from(size: Size) -> Self {
        SizeForArbitrary::Size(size)
    }
}

impl From<RelativeSize> for SizeForArbitrary {
    fn from(size: RelativeSize) -> Self {
        SizeForArbitrary::Relative(size)
    }
}

impl fmt::Display for SizeForArbitrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeForArbitrary::Size(size) => size.fmt(f),
            SizeForArbitrary::Relative(size) => size.fmt(f),
            SizeForArbitrary::Max => f.write_str("max"),
        }
    }
}

impl FromStr for SizeForArbitrary {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "max" {
            return Ok(SizeForArbitrary::Max);
        }
        if let Ok(size) = s.parse::<Size>() {
            return Ok(SizeForArbitrary::Size(size));
        }
        s.parse::<RelativeSize>()
            .map(SizeForArbitrary::Relative)
            .map_err(|_| SizeParseError::UnknownSize(s.to_string()))
    }
}

/// Depth hint accepted by recursive arbitraries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthSize {
    Size(SizeForArbitrary),
    /// Raw strictly positive factor; the bias is `1 / n`.
    ///
    /// Zero, negative and non-finite factors are ignored and the default
    /// depth size applies instead.
    Numeric(f64),
}

impl From<Size> for DepthSize {
    fn from(size: Size) -> Self {
        DepthSize::Size(size.into())
    }
}

impl From<RelativeSize> for DepthSize {
    fn from(size: RelativeSize) -> Self {
        DepthSize::Size(size.into())
    }
}

impl From<SizeForArbitrary> for DepthSize {
    fn from(size: SizeForArbitrary) -> Self {
        DepthSize::Size(size)
    }
}

impl FromStr for DepthSize {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(size) = s.parse::<SizeForArbitrary>() {
            return Ok(DepthSize::Size(size));
        }
        match s.parse::<f64>() {
            Ok(n) if n > 0.0 && n.is_finite() => Ok(DepthSize::Numeric(n)),
            _ => Err(SizeParseError::InvalidDepthSize(s.to_string())),
        }
    }
}

/// Upper length bound derived from a minimal length for a size bucket.
///
/// Monotonic in both `min_length` and `size`. Saturates instead of overflowing.
pub fn max_length_from_min_length(min_length: usize, size: Size) -> usize {
    match size {
        Size::XSmall => min_length
            .saturating_add(min_length / 10)
            .saturating_add(1),
        Size::Small => min_length.saturating_mul(2).saturating_add(10),
        Size::Medium => min_length.saturating_mul(11).saturating_add(100),
        Size::Large => min_length.saturating_mul(101).saturating_add(1000),
        Size::XLarge => min_length.saturating_mul(1001).saturating_add(10_000),
    }
}

/// Apply a relative offset to the baseline size, clamping at both ends
pub fn relative_size_to_size(size: RelativeSize, default_size: Size) -> Size {
    Size::from_index_clamped(default_size.index() + size.offset())
}

fn to_size(size: SizeForArbitrary, default_size: Size) -> Option<Size> {
    match size {
        SizeForArbitrary::Size(size) => Some(size),
        SizeForArbitrary::Relative(relative) => Some(relative_size_to_size(relative, default_size)),
        SizeForArbitrary::Max => None,
    }
}

fn defined_size(
    parameters: Option<&GlobalParameters>,
    size: Option<SizeForArbitrary>,
    specified_max: bool,
) -> (SizeForArbitrary, Size) {
    let default_size = parameters
        .and_then(|p| p.base_size)
        .unwrap_or(DEFAULT_SIZE);
    let to_max = parameters
        .and_then(|p| p.default_size_to_max_when_max_specified)
        .unwrap_or(false);

    let defined = match size {
        Some(size) => size,
        None if specified_max && to_max => SizeForArbitrary::Max,
        None => SizeForArbitrary::Size(default_size),
    };
    (defined, default_size)
}

/// Resolve an optional size hint into a concrete size.
///
/// `Max` resolves to the largest bucket.
pub fn resolve_size_with(
    parameters: Option<&GlobalParameters>,
    size: Option<SizeForArbitrary>,
) -> Size {
    let default_size = parameters
        .and_then(|p| p.base_size)
        .unwrap_or(DEFAULT_SIZE);
    match size {
        None => default_size,
        Some(size) => to_size(size, default_size).unwrap_or(Size::XLarge),
    }
}

/// [`resolve_size_with`] against the current thread's parameters
pub fn resolve_size(size: Option<SizeForArbitrary>) -> Size {
    resolve_size_with(read_configure_global().as_ref(), size)
}

/// Maximal length an arbitrary should generate, clamped to `[min_length, max_length]`.
///
/// Precedence: explicit size, then `max` when a maximum was specified and the
/// global parameters opt in, then the configured baseline.
pub fn max_generated_length_from_size_for_arbitrary_with(
    parameters: Option<&GlobalParameters>,
    size: Option<SizeForArbitrary>,
    min_length: usize,
    max_length: usize,
    specified_max_length: bool,
) -> usize {
    let (defined, default_size) = defined_size(parameters, size, specified_max_length);
    match to_size(defined, default_size) {
        None => max_length,
        Some(final_size) => max_length_from_min_length(min_length, final_size)
            .min(max_length)
            .max(min_length),
    }
}

/// [`max_generated_length_from_size_for_arbitrary_with`] against the current thread's parameters
pub fn max_generated_length_from_size_for_arbitrary(
    size: Option<SizeForArbitrary>,
    min_length: usize,
    max_length: usize,
    specified_max_length: bool,
) -> usize {
    max_generated_length_from_size_for_arbitrary_with(
        read_configure_global().as_ref(),
        size,
        min_length,
        max_length,
        specified_max_length,
    )
}

/// Depth bias coefficient for recursive arbitraries; `0.0` means no bias.
pub fn depth_bias_from_size_for_arbitrary_with(
    parameters: Option<&GlobalParameters>,
    depth_size: Option<DepthSize>,
    specified_max_depth: bool,
) -> f64 {
    let size = match depth_size {
        Some(DepthSize::Numeric(n)) if n > 0.0 && n.is_finite() => return 1.0 / n,
        Some(DepthSize::Numeric(n)) => {
            tracing::warn!(depth_size = n, "ignoring invalid numeric depth size");
            None
        }
        Some(DepthSize::Size(size)) => Some(size),
        None => None,
    };
    let (defined, default_size) = defined_size(parameters, size, specified_max_depth);
    match to_size(defined, default_size) {
        None => 0.0,
        Some(Size::XSmall) => 1.0,
        Some(Size::Small) => 0.5,
        Some(Size::Medium) => 0.25,
        Some(Size::Large) => 0.125,
        Some(Size::XLarge) => 0.0625,
    }
}

/// [`depth_bias_from_size_for_arbitrary_with`] against the current thread's parameters
pub fn depth_bias_from_size_for_arbitrary(
    depth_size: Option<DepthSize>,
    specified_max_depth: bool,
) -> f64 {
    depth_bias_from_size_for_arbitrary_with(
        read_configure_global().as_ref(),
        depth_size,
        specified_max_depth,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_length_from_min_length_buckets() {
        assert_eq!(max_length_from_min_length(0, Size::XSmall), 1);
        assert_eq!(max_length_from_min_length(10, Size::XSmall), 12);
        assert_eq!(max_length_from_min_length(0, Size::Small), 10);
        assert_eq!(max_length_from_min_length(5, Size::Small), 20);
        assert_eq!(max_length_from_min_length(1, Size::Medium), 111);
        assert_eq!(max_length_from_min_length(1, Size::Large), 1101);
        assert_eq!(max_length_from_min_length(1, Size::XLarge), 11001);
    }

    #[test]
    fn test_max_length_saturates() {
        assert_eq!(
            max_length_from_min_length(usize::MAX, Size::XLarge),
            usize::MAX
        );
    }

    #[test]
    fn test_size_monotonicity() {
        for min_length in [0, 1, 2, 7, 100, 12_345] {
            for pair in Size::ALL.windows(2) {
                assert!(
                    max_length_from_min_length(min_length, pair[0])
                        <= max_length_from_min_length(min_length, pair[1]),
                    "{} vs {} for min_length {}",
                    pair[0],
                    pair[1],
                    min_length
                );
            }
        }
    }

    #[test]
    fn test_relative_size_clamps() {
        assert_eq!(
            relative_size_to_size(RelativeSize::Plus1, Size::Small),
            Size::Medium
        );
        assert_eq!(
            relative_size_to_size(RelativeSize::Minus4, Size::Small),
            Size::XSmall
        );
        assert_eq!(
            relative_size_to_size(RelativeSize::Plus4, Size::Large),
            Size::XLarge
        );
        assert_eq!(
            relative_size_to_size(RelativeSize::Equal, Size::Large),
            Size::Large
        );
    }

    #[test]
    fn test_resolve_size_defaults() {
        assert_eq!(resolve_size_with(None, None), Size::Small);

        let params = GlobalParameters::new().with_base_size(Size::Medium);
        assert_eq!(resolve_size_with(Some(&params), None), Size::Medium);
        assert_eq!(
            resolve_size_with(Some(&params), Some(RelativeSize::Minus1.into())),
            Size::Small
        );
        assert_eq!(
            resolve_size_with(Some(&params), Some(Size::XLarge.into())),
            Size::XLarge
        );
    }

    #[test]
    fn test_explicit_max_returns_max_length() {
        let opted_in = GlobalParameters::new().with_default_size_to_max_when_max_specified(true);
        let opted_out = GlobalParameters::new()
            .with_default_size_to_max_when_max_specified(false)
            .with_base_size(Size::XSmall);

        for params in [None, Some(&opted_in), Some(&opted_out)] {
            assert_eq!(
                max_generated_length_from_size_for_arbitrary_with(
                    params,
                    Some(SizeForArbitrary::Max),
                    3,
                    50,
                    true
                ),
                50
            );
        }
    }

    #[test]
    fn test_max_generated_length_precedence() {
        // Baseline small: 2 * 3 + 10 = 16
        assert_eq!(
            max_generated_length_from_size_for_arbitrary_with(None, None, 3, 50, true),
            16
        );

        // Opted in: a specified max wins over the baseline
        let opted_in = GlobalParameters::new().with_default_size_to_max_when_max_specified(true);
        assert_eq!(
            max_generated_length_from_size_for_arbitrary_with(Some(&opted_in), None, 3, 50, true),
            50
        );
        // ... but not when the max was not specified
        assert_eq!(
            max_generated_length_from_size_for_arbitrary_with(
                Some(&opted_in),
                None,
                3,
                MAX_LENGTH_UPPER_BOUND,
                false
            ),
            16
        );

        // Explicit size wins over everything
        assert_eq!(
            max_generated_length_from_size_for_arbitrary_with(
                Some(&opted_in),
                Some(Size::XSmall.into()),
                3,
                50,
                true
            ),
            4
        );
    }

    #[test]
    fn test_max_generated_length_is_clamped() {
        assert_eq!(
            max_generated_length_from_size_for_arbitrary_with(
                None,
                Some(Size::XLarge.into()),
                0,
                7,
                true
            ),
            7
        );
        assert_eq!(
            max_generated_length_from_size_for_arbitrary_with(None, None, 4, 4, true),
            4
        );
    }

    #[test]
    fn test_depth_bias() {
        assert_eq!(depth_bias_from_size_for_arbitrary_with(None, None, false), 0.5);
        assert_eq!(
            depth_bias_from_size_for_arbitrary_with(None, Some(DepthSize::Numeric(4.0)), false),
            0.25
        );
        assert_eq!(
            depth_bias_from_size_for_arbitrary_with(
                None,
                Some(SizeForArbitrary::Max.into()),
                false,
            ),
            0.0
        );
        assert_eq!(
            depth_bias_from_size_for_arbitrary_with(None, Some(Size::XSmall.into()), false),
            1.0
        );
        assert_eq!(
            depth_bias_from_size_for_arbitrary_with(None, Some(Size::XLarge.into()), false),
            0.0625
        );

        let opted_in = GlobalParameters::new().with_default_size_to_max_when_max_specified(true);
        assert_eq!(
            depth_bias_from_size_for_arbitrary_with(Some(&opted_in), None, true),
            0.0
        );
    }

    #[test]
    fn test_invalid_numeric_depth_size_falls_back_to_default() {
        let default_bias = depth_bias_from_size_for_arbitrary_with(None, None, false);
        for n in [0.0, -0.0, -3.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let bias =
                depth_bias_from_size_for_arbitrary_with(None, Some(DepthSize::Numeric(n)), false);
            assert!(bias.is_finite());
            assert_eq!(bias, default_bias);
        }
    }

    #[test]
    fn test_depth_bias_decreases_with_size() {
        let biases: Vec<f64> = Size::ALL
            .iter()
            .map(|size| depth_bias_from_size_for_arbitrary_with(None, Some((*size).into()), false))
            .collect();
        assert!(biases.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("medium".parse::<Size>(), Ok(Size::Medium));
        assert_eq!("+2".parse::<RelativeSize>(), Ok(RelativeSize::Plus2));
        assert_eq!("=".parse::<SizeForArbitrary>(), Ok(RelativeSize::Equal.into()));
        assert_eq!("max".parse::<SizeForArbitrary>(), Ok(SizeForArbitrary::Max));
        assert_eq!("2.5".parse::<DepthSize>(), Ok(DepthSize::Numeric(2.5)));
        assert!("huge".parse::<SizeForArbitrary>().is_err());
        assert!("-1.0".parse::<DepthSize>().is_err());
        assert!("0".parse::<DepthSize>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for token in ["xsmall", "large", "-3", "=", "+4", "max"] {
            let parsed: SizeForArbitrary = token.parse().unwrap();
            assert_eq!(parsed.to_string(), token);
        }
    }

    #[test]
    fn test_short_forms_read_thread_local_parameters() {
        use crate::config::with_global_parameters;

        let params = GlobalParameters::new().with_base_size(Size::XSmall);
        with_global_parameters(params, || {
            assert_eq!(resolve_size(None), Size::XSmall);
            assert_eq!(
                max_generated_length_from_size_for_arbitrary(None, 0, 100, false),
                1
            );
            assert_eq!(depth_bias_from_size_for_arbitrary(None, false), 1.0);
        });
    }
}

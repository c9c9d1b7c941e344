//! Optional values, built as a two-arm [`FrequencyArbitrary`].

use crate::arbitrary::Arbitrary;
use crate::depth::DepthIdentifier;
use crate::frequency::{FrequencyArbitrary, OneOfConstraints, WeightedArbitrary};
use crate::rng::Random;
use crate::size::DepthSize;
use crate::stream::Stream;
use crate::value::{Context, Value};

/// Weight of the `Some` arm when none is configured (`None` weighs 1)
pub const DEFAULT_OPTION_FREQ: u32 = 5;

/// Options for [`option`]
#[derive(Debug, Clone)]
pub struct OptionConstraints {
    /// Weight of `Some` against a weight of 1 for `None`
    pub freq: u32,
    pub depth_size: Option<DepthSize>,
    pub max_depth: Option<usize>,
    pub depth_identifier: Option<DepthIdentifier>,
}

impl Default for OptionConstraints {
    fn default() -> Self {
        Self {
            freq: DEFAULT_OPTION_FREQ,
            depth_size: None,
            max_depth: None,
            depth_identifier: None,
        }
    }
}

impl OptionConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_freq(mut self, freq: u32) -> Self {
        self.freq = freq;
        self
    }

    pub fn with_depth_size(mut self, depth_size: impl Into<DepthSize>) -> Self {
        self.depth_size = Some(depth_size.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_depth_identifier(mut self, identifier: impl Into<DepthIdentifier>) -> Self {
        self.depth_identifier = Some(identifier.into());
        self
    }
}

/// Always `None`
struct NilArbitrary;

impl<T: 'static> Arbitrary<Option<T>> for NilArbitrary {
    fn generate(&self, _rng: &mut Random, _bias_factor: Option<u32>) -> Value<Option<T>> {
        Value::new(None, Context::none())
    }

    fn can_shrink_without_context(&self, value: &Option<T>) -> bool {
        value.is_none()
    }

    fn shrink(&self, _value: &Option<T>, _context: &Context) -> Stream<Value<Option<T>>> {
        Stream::nil()
    }
}

/// Optional values; anything present can shrink straight to `None`
pub type OptionArbitrary<T> = FrequencyArbitrary<Option<T>>;

/// `None` or a value from `arbitrary`.
///
/// Cross-shrink is always on, so the first shrink candidate of any `Some`
/// is `None`.
pub fn option<T, A>(arbitrary: A, constraints: OptionConstraints) -> OptionArbitrary<T>
where
    T: Clone + 'static,
    A: Arbitrary<T> + 'static,
{
    let warbs = vec![
        WeightedArbitrary::new(NilArbitrary, 1).with_fallback_value(None),
        WeightedArbitrary::new(
            arbitrary.map_with_unmapper(Some, |value: &Option<T>| value.clone()),
            constraints.freq,
        ),
    ];
    let frequency_constraints = OneOfConstraints {
        with_cross_shrink: true,
        depth_size: constraints.depth_size,
        max_depth: constraints.max_depth,
        depth_identifier: constraints.depth_identifier,
    };
    FrequencyArbitrary::build(warbs, frequency_constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infinite_stream::infinite_stream;
    use crate::primitives::{integer_in, nat};

    #[test]
    fn test_default_freq() {
        assert_eq!(OptionConstraints::default().freq, 5);
    }

    #[test]
    fn test_generates_both_variants() {
        let arb = option(nat(), OptionConstraints::default());
        let mut rng = Random::new(10);
        let drawn: Vec<Option<u32>> = (0..300)
            .map(|_| arb.generate(&mut rng, None).value())
            .collect();
        let nones = drawn.iter().filter(|v| v.is_none()).count();
        assert!(nones > 0);
        assert!(nones < 150, "None should be about one draw in six, got {}", nones);
    }

    #[test]
    fn test_zero_freq_always_none() {
        let arb = option(nat(), OptionConstraints::new().with_freq(0));
        let mut rng = Random::new(4);
        for _ in 0..100 {
            assert_eq!(arb.generate(&mut rng, Some(2)).value(), None);
        }
    }

    #[test]
    fn test_some_shrinks_to_none_first() {
        let arb = option(integer_in(10i32, 20).unwrap(), OptionConstraints::default());
        let mut rng = Random::new(6);
        let value = loop {
            let value = arb.generate(&mut rng, None);
            if matches!(value.value(), Some(v) if v > 10) {
                break value;
            }
        };

        let shrinks: Vec<Option<i32>> = arb
            .shrink(value.value_ref(), value.context())
            .take(2)
            .map(|v| v.value())
            .collect();
        assert_eq!(shrinks[0], None);
        assert_eq!(shrinks[1], Some(10));
    }

    #[test]
    fn test_shrink_foreign_values() {
        let arb = option(integer_in(0i32, 20).unwrap(), OptionConstraints::default());
        assert!(arb.can_shrink_without_context(&None));
        assert!(arb.can_shrink_without_context(&Some(12)));
        assert!(!arb.can_shrink_without_context(&Some(21)));

        let shrinks: Vec<Option<i32>> = arb
            .shrink(&Some(12), &Context::none())
            .map(|v| v.value())
            .collect();
        assert_eq!(shrinks[0], None);
        assert_eq!(shrinks[1], Some(0));
        assert!(arb.shrink(&None, &Context::none()).next().is_none());
    }

    #[test]
    fn test_shrinks_stay_shrinkable() {
        let arb = option(integer_in(5i64, 500).unwrap(), OptionConstraints::new().with_freq(2));
        for seed in 0..50 {
            let value = arb.generate(&mut Random::new(seed), Some(2));
            assert!(arb.can_shrink_without_context(value.value_ref()));
            for candidate in arb.shrink(value.value_ref(), value.context()).take(300) {
                assert!(arb.can_shrink_without_context(candidate.value_ref()));
            }
        }
    }

    #[test]
    fn test_max_depth_zero_is_none() {
        let arb = option(nat(), OptionConstraints::new().with_max_depth(0));
        let mut rng = Random::new(0);
        for _ in 0..20 {
            assert!(arb.generate(&mut rng, None).value().is_none());
        }
    }

    #[test]
    fn test_wrapped_cloneable_stays_cloneable() {
        let arb = option(infinite_stream(nat()), OptionConstraints::new().with_freq(1000));
        let mut rng = Random::new(1);
        let value = loop {
            let value = arb.generate(&mut rng, None);
            if value.value_ref().is_some() {
                break value;
            }
        };
        assert!(value.has_to_be_cloned());
        let first = value.value().map(|mut stream| stream.next());
        let second = value.value().map(|mut stream| stream.next());
        assert_eq!(first, second);
    }
}

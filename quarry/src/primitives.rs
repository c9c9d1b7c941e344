//! Leaf arbitraries: bounded integers, constants and booleans.

use std::fmt;

use num_traits::PrimInt;

use crate::arbitrary::Arbitrary;
use crate::bias::{BiasedRange, bias_numeric_range};
use crate::combinators::NoBiasArbitrary;
use crate::error::ArbitraryError;
use crate::rng::Random;
use crate::shrink::{integer_context, shrink_integer};
use crate::stream::Stream;
use crate::value::{CloneMethod, Cloner, Context, Value, clone_method_cloner};

/// Integer types usable as bounds of an [`IntegerArbitrary`].
///
/// All arithmetic is done on `i128`, so every implementor must fit in it.
pub trait IntegerBound: PrimInt + fmt::Debug + fmt::Display + 'static {
    /// Widen to `i128`
    fn to_wide(self) -> i128 {
        self.to_i128().unwrap_or(i128::MAX)
    }

    /// Narrow from `i128`, saturating at the type bounds
    fn from_wide(value: i128) -> Self {
        <Self as num_traits::NumCast>::from(value).unwrap_or_else(|| {
            if value < 0 {
                Self::min_value()
            } else {
                Self::max_value()
            }
        })
    }
}

macro_rules! impl_integer_bound {
    ($($t:ty),*) => {
        $(
            impl IntegerBound for $t {}
        )*
    };
}

impl_integer_bound!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

/// Integers drawn uniformly from `[min, max]`.
///
/// Shrinks toward `0` when it is in range, otherwise toward the bound
/// closest to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerArbitrary<N> {
    min: N,
    max: N,
}

impl<N: IntegerBound> IntegerArbitrary<N> {
    /// Create an arbitrary over `[min, max]`
    pub fn new(min: N, max: N) -> Result<Self, ArbitraryError> {
        if min > max {
            return Err(ArbitraryError::invalid_range(min, max));
        }
        Ok(Self { min, max })
    }

    /// Create an arbitrary over the full range of `N`
    pub fn full_range() -> Self {
        Self {
            min: N::min_value(),
            max: N::max_value(),
        }
    }

    /// Arbitrary over the range spanned by `a` and `b`, in either order
    pub(crate) fn spanning(a: N, b: N) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> N {
        self.min
    }

    pub fn max(&self) -> N {
        self.max
    }

    fn generate_range(&self, rng: &mut Random, bias_factor: Option<u32>) -> BiasedRange {
        let full = BiasedRange::new(self.min.to_wide(), self.max.to_wide());
        let biased = match bias_factor {
            Some(bias) => rng.next_int(1, i64::from(bias.max(1))) == 1,
            None => false,
        };
        if !biased {
            return full;
        }

        let ranges = bias_numeric_range(full.min, full.max);
        if ranges.len() == 1 {
            return ranges[0];
        }
        let last = ranges.len() as i64 - 2;
        let id = rng.next_int(-2 * (ranges.len() as i64 - 1), last);
        if id < 0 {
            ranges[0]
        } else {
            ranges[id as usize + 1]
        }
    }

    fn default_target(&self) -> i128 {
        let (min, max) = (self.min.to_wide(), self.max.to_wide());
        if min <= 0 && max >= 0 {
            0
        } else if min < 0 {
            max
        } else {
            min
        }
    }

    /// The previous candidate was one step away: only it remains to try.
    fn is_last_chance_try(&self, current: i128, previous: i128) -> bool {
        if current > 0 {
            previous.checked_add(1) == Some(current) && current > self.min.to_wide()
        } else if current < 0 {
            previous.checked_sub(1) == Some(current) && current < self.max.to_wide()
        } else {
            false
        }
    }

    fn is_valid_context(current: i128, previous: i128) -> bool {
        previous == 0 || current.signum() == previous.signum()
    }
}

impl<N: IntegerBound> Arbitrary<N> for IntegerArbitrary<N> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<N> {
        let range = self.generate_range(rng, bias_factor);
        let drawn = rng.next_big_int(range.min, range.max);
        Value::new(N::from_wide(drawn), Context::none())
    }

    fn can_shrink_without_context(&self, value: &N) -> bool {
        self.min <= *value && *value <= self.max
    }

    fn shrink(&self, value: &N, context: &Context) -> Stream<Value<N>> {
        let current = value.to_wide();
        let previous =
            integer_context(context).filter(|previous| Self::is_valid_context(current, *previous));

        let candidates = match previous {
            None => shrink_integer(current, self.default_target(), true),
            Some(previous) if self.is_last_chance_try(current, previous) => {
                Stream::once(Value::new(previous, Context::none()))
            }
            Some(previous) => shrink_integer(current, previous, false),
        };
        candidates.map(|candidate| {
            let (raw, meta) = candidate.into_parts();
            Value::new(N::from_wide(raw), meta.context)
        })
    }
}

/// Integers in `[min, max]`
pub fn integer_in<N: IntegerBound>(min: N, max: N) -> Result<IntegerArbitrary<N>, ArbitraryError> {
    IntegerArbitrary::new(min, max)
}

/// Any `i32`
pub fn integer() -> IntegerArbitrary<i32> {
    IntegerArbitrary::full_range()
}

/// Natural numbers in `[0, i32::MAX]`
pub fn nat() -> IntegerArbitrary<u32> {
    nat_max(i32::MAX as u32)
}

/// Natural numbers in `[0, max]`
pub fn nat_max(max: u32) -> IntegerArbitrary<u32> {
    IntegerArbitrary { min: 0, max }
}

/// One of a fixed set of values, shrinking toward the first one.
pub struct ConstantArbitrary<T> {
    values: Vec<T>,
    cloner: Option<Cloner<T>>,
}

impl<T: Clone + PartialEq + 'static> ConstantArbitrary<T> {
    /// Pick among `values`
    pub fn new(values: Vec<T>) -> Result<Self, ArbitraryError> {
        if values.is_empty() {
            return Err(ArbitraryError::NoEntries {
                label: "constant_from",
            });
        }
        Ok(Self {
            values,
            cloner: None,
        })
    }

    /// The candidate values, first one being the shrink target
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: CloneMethod + Clone + PartialEq + 'static> ConstantArbitrary<T> {
    /// Pick among stateful values, handing out fresh copies
    pub fn cloneable(values: Vec<T>) -> Result<Self, ArbitraryError> {
        let mut arbitrary = Self::new(values)?;
        arbitrary.cloner = Some(clone_method_cloner());
        Ok(arbitrary)
    }
}

impl<T: Clone + PartialEq + 'static> ConstantArbitrary<T> {
    fn value_at(&self, index: usize) -> Value<T> {
        let raw = match &self.cloner {
            Some(cloner) => cloner(&self.values[index]),
            None => self.values[index].clone(),
        };
        Value::from_parts(raw, Context::new(index), self.cloner.clone())
    }
}

impl<T: Clone + PartialEq + 'static> Arbitrary<T> for ConstantArbitrary<T> {
    fn generate(&self, rng: &mut Random, _bias_factor: Option<u32>) -> Value<T> {
        let index = if self.values.len() == 1 {
            0
        } else {
            rng.next_int(0, self.values.len() as i64 - 1) as usize
        };
        self.value_at(index)
    }

    fn can_shrink_without_context(&self, value: &T) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }

    fn shrink(&self, value: &T, context: &Context) -> Stream<Value<T>> {
        let already_first = context.downcast::<usize>().is_some_and(|index| *index == 0);
        if already_first || *value == self.values[0] {
            return Stream::nil();
        }
        Stream::once(self.value_at(0))
    }
}

/// Always `value`
pub fn constant<T: Clone + PartialEq + 'static>(value: T) -> ConstantArbitrary<T> {
    ConstantArbitrary {
        values: vec![value],
        cloner: None,
    }
}

/// One of `values`, shrinking toward `values[0]`
pub fn constant_from<T: Clone + PartialEq + 'static>(
    values: Vec<T>,
) -> Result<ConstantArbitrary<T>, ArbitraryError> {
    ConstantArbitrary::new(values)
}

/// `true` or `false`, shrinking toward `false`
pub fn boolean() -> NoBiasArbitrary<bool> {
    nat_max(1)
        .map_with_unmapper(|v| v == 1, |b: &bool| Some(u32::from(*b)))
        .no_bias()
}

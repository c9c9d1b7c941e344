//! Infinite streams of generated values, the canonical stateful value.

use std::fmt;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::rng::Random;
use crate::stream::Stream;
use crate::value::{CloneMethod, Context, Value};

/// Endless iterator drawing from an arbitrary.
///
/// Reading it advances its own [`Random`]; [`CloneMethod::clone_method`]
/// gives back an iterator positioned where this one started, with an empty
/// record of the values read so far.
pub struct InfiniteStream<T> {
    arbitrary: BoxedArbitrary<T>,
    bias_factor: Option<u32>,
    start: Random,
    rng: Random,
    seen: Vec<T>,
}

impl<T> InfiniteStream<T> {
    /// Values pulled so far, in order
    pub fn seen(&self) -> &[T] {
        &self.seen
    }
}

impl<T: Clone + 'static> Iterator for InfiniteStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let value = self.arbitrary.generate(&mut self.rng, self.bias_factor).value();
        self.seen.push(value.clone());
        Some(value)
    }
}

/// Snapshot: the copy continues from the current position
impl<T: Clone> Clone for InfiniteStream<T> {
    fn clone(&self) -> Self {
        Self {
            arbitrary: self.arbitrary.clone(),
            bias_factor: self.bias_factor,
            start: self.start.clone(),
            rng: self.rng.clone(),
            seen: self.seen.clone(),
        }
    }
}

impl<T> CloneMethod for InfiniteStream<T> {
    fn clone_method(&self) -> Self {
        Self {
            arbitrary: self.arbitrary.clone(),
            bias_factor: self.bias_factor,
            start: self.start.clone(),
            rng: self.start.clone(),
            seen: Vec::new(),
        }
    }
}

/// Renders the values read so far, e.g. `Stream(1,2,…)`
impl<T: fmt::Debug> fmt::Display for InfiniteStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stream(")?;
        for value in &self.seen {
            write!(f, "{:?},", value)?;
        }
        f.write_str("…)")
    }
}

impl<T: fmt::Debug> fmt::Debug for InfiniteStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Arbitrary producing [`InfiniteStream`]s
pub struct InfiniteStreamArbitrary<T> {
    arbitrary: BoxedArbitrary<T>,
}

impl<T: Clone + 'static> Arbitrary<InfiniteStream<T>> for InfiniteStreamArbitrary<T> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<InfiniteStream<T>> {
        let applied_bias = match bias_factor {
            Some(bias) if rng.next_int(1, i64::from(bias.max(1))) == 1 => Some(bias),
            _ => None,
        };
        let stream = InfiniteStream {
            arbitrary: self.arbitrary.clone(),
            bias_factor: applied_bias,
            start: rng.clone(),
            rng: rng.clone(),
            seen: Vec::new(),
        };
        Value::cloneable(stream, Context::none())
    }

    fn can_shrink_without_context(&self, _value: &InfiniteStream<T>) -> bool {
        false
    }

    fn shrink(
        &self,
        _value: &InfiniteStream<T>,
        _context: &Context,
    ) -> Stream<Value<InfiniteStream<T>>> {
        Stream::nil()
    }
}

/// Infinite streams of values drawn from `arbitrary`
pub fn infinite_stream<T, A>(arbitrary: A) -> InfiniteStreamArbitrary<T>
where
    T: Clone + 'static,
    A: Arbitrary<T> + 'static,
{
    InfiniteStreamArbitrary {
        arbitrary: arbitrary.boxed(),
    }
}

//! Derived arbitraries built on top of another one.

use std::rc::Rc;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::rng::Random;
use crate::stream::Stream;
use crate::value::{Cloner, Context, Value};

/// Number of draws a [`FilterArbitrary`] attempts before giving up
pub const MAX_FILTER_ATTEMPTS: usize = 1000;

type Mapper<T, U> = Rc<dyn Fn(T) -> U>;
type Unmapper<T, U> = Rc<dyn Fn(&U) -> Option<T>>;

/// Source value a mapped value was derived from
struct MapContext<T> {
    source: Rc<Value<T>>,
}

/// Arbitrary transformed through a mapping function.
pub struct MapArbitrary<T, U> {
    source: BoxedArbitrary<T>,
    mapper: Mapper<T, U>,
    unmapper: Option<Unmapper<T, U>>,
}

impl<T: Clone + 'static, U: 'static> MapArbitrary<T, U> {
    pub fn new(
        source: BoxedArbitrary<T>,
        mapper: Mapper<T, U>,
        unmapper: Option<Unmapper<T, U>>,
    ) -> Self {
        Self {
            source,
            mapper,
            unmapper,
        }
    }
}

fn map_source<T: Clone + 'static, U: 'static>(mapper: &Mapper<T, U>, source: Value<T>) -> Value<U> {
    let mapped = mapper(source.value());
    let source = Rc::new(source);

    // A stateful source makes the mapped value stateful too: copies are
    // rebuilt from a fresh copy of the source.
    let cloner = if source.has_to_be_cloned() {
        let mapper = Rc::clone(mapper);
        let source = Rc::clone(&source);
        let cloner: Cloner<U> = Rc::new(move |_: &U| mapper(source.value()));
        Some(cloner)
    } else {
        None
    };
    Value::from_parts(mapped, Context::new(MapContext { source }), cloner)
}

impl<T: Clone + 'static, U: 'static> Arbitrary<U> for MapArbitrary<T, U> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<U> {
        map_source(&self.mapper, self.source.generate(rng, bias_factor))
    }

    fn can_shrink_without_context(&self, value: &U) -> bool {
        match &self.unmapper {
            Some(unmapper) => match unmapper(value) {
                Some(source) => self.source.can_shrink_without_context(&source),
                None => false,
            },
            None => false,
        }
    }

    fn shrink(&self, value: &U, context: &Context) -> Stream<Value<U>> {
        let mapper = Rc::clone(&self.mapper);
        if let Some(context) = context.downcast::<MapContext<T>>() {
            let source = &context.source;
            return self
                .source
                .shrink(source.value_ref(), source.context())
                .map(move |shrunk| map_source(&mapper, shrunk));
        }

        let unmapped = self.unmapper.as_ref().and_then(|unmapper| unmapper(value));
        match unmapped {
            Some(source) if self.source.can_shrink_without_context(&source) => self
                .source
                .shrink(&source, &Context::none())
                .map(move |shrunk| map_source(&mapper, shrunk)),
            _ => Stream::nil(),
        }
    }
}

/// Arbitrary only keeping values matching a predicate.
///
/// Generation retries up to [`MAX_FILTER_ATTEMPTS`] times and panics past
/// that: a predicate that rejects nearly everything is a bug in the caller.
pub struct FilterArbitrary<T> {
    source: BoxedArbitrary<T>,
    predicate: Rc<dyn Fn(&T) -> bool>,
}

impl<T: 'static> FilterArbitrary<T> {
    pub fn new(source: BoxedArbitrary<T>, predicate: Rc<dyn Fn(&T) -> bool>) -> Self {
        Self { source, predicate }
    }
}

impl<T: 'static> Arbitrary<T> for FilterArbitrary<T> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<T> {
        for attempt in 0..MAX_FILTER_ATTEMPTS {
            let candidate = self.source.generate(rng, bias_factor);
            if (self.predicate)(candidate.value_ref()) {
                return candidate;
            }
            tracing::trace!(attempt, "filter rejected generated value");
        }
        panic!(
            "Filter failed to generate a valid value after {} attempts",
            MAX_FILTER_ATTEMPTS
        );
    }

    fn can_shrink_without_context(&self, value: &T) -> bool {
        self.source.can_shrink_without_context(value) && (self.predicate)(value)
    }

    fn shrink(&self, value: &T, context: &Context) -> Stream<Value<T>> {
        let predicate = Rc::clone(&self.predicate);
        self.source
            .shrink(value, context)
            .filter(move |candidate| predicate(candidate.value_ref()))
    }
}

/// Arbitrary whose values are never shrunk
pub struct NoShrinkArbitrary<T> {
    source: BoxedArbitrary<T>,
}

impl<T> NoShrinkArbitrary<T> {
    pub fn new(source: BoxedArbitrary<T>) -> Self {
        Self { source }
    }
}

impl<T: 'static> Arbitrary<T> for NoShrinkArbitrary<T> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<T> {
        self.source.generate(rng, bias_factor)
    }

    fn can_shrink_without_context(&self, value: &T) -> bool {
        self.source.can_shrink_without_context(value)
    }

    fn shrink(&self, _value: &T, _context: &Context) -> Stream<Value<T>> {
        Stream::nil()
    }
}

/// Arbitrary generating as if no bias factor was ever given
pub struct NoBiasArbitrary<T> {
    source: BoxedArbitrary<T>,
}

impl<T> NoBiasArbitrary<T> {
    pub fn new(source: BoxedArbitrary<T>) -> Self {
        Self { source }
    }
}

impl<T: 'static> Arbitrary<T> for NoBiasArbitrary<T> {
    fn generate(&self, rng: &mut Random, _bias_factor: Option<u32>) -> Value<T> {
        self.source.generate(rng, None)
    }

    fn can_shrink_without_context(&self, value: &T) -> bool {
        self.source.can_shrink_without_context(value)
    }

    fn shrink(&self, value: &T, context: &Context) -> Stream<Value<T>> {
        self.source.shrink(value, context)
    }
}

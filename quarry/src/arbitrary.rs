//! The [`Arbitrary`] capability shared by every leaf and combinator.

use std::rc::Rc;

use crate::combinators::{FilterArbitrary, MapArbitrary, NoBiasArbitrary, NoShrinkArbitrary};
use crate::rng::Random;
use crate::stream::Stream;
use crate::value::{Context, Value};

/// Something that can both generate values of type `T` and shrink them.
///
/// Implementations are stateless once built: two calls to [`generate`] with
/// a [`Random`] in the same state must produce equal values.
///
/// [`generate`]: Arbitrary::generate
pub trait Arbitrary<T> {
    /// Produce one value.
    ///
    /// `bias_factor`, when set, lets the arbitrary switch to a narrower
    /// edge-case oriented draw with probability `1 / bias_factor`.
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<T>;

    /// Whether `value` could have been produced by this arbitrary, so that it
    /// can be shrunk with an empty context.
    fn can_shrink_without_context(&self, value: &T) -> bool;

    /// Lazy stream of strictly simpler candidates.
    ///
    /// `context` must be either the one attached to `value` by [`generate`]
    /// (or by a previous shrink) or [`Context::none`] for a value accepted by
    /// [`can_shrink_without_context`].
    ///
    /// [`generate`]: Arbitrary::generate
    /// [`can_shrink_without_context`]: Arbitrary::can_shrink_without_context
    fn shrink(&self, value: &T, context: &Context) -> Stream<Value<T>>;

    /// Transform generated values, shrinking through the source
    fn map<U, F>(self, mapper: F) -> MapArbitrary<T, U>
    where
        Self: Sized + 'static,
        T: Clone + 'static,
        U: 'static,
        F: Fn(T) -> U + 'static,
    {
        MapArbitrary::new(self.boxed(), Rc::new(mapper), None)
    }

    /// Like [`map`](Arbitrary::map), with an inverse used to shrink values
    /// that were not produced by this arbitrary
    fn map_with_unmapper<U, F, G>(self, mapper: F, unmapper: G) -> MapArbitrary<T, U>
    where
        Self: Sized + 'static,
        T: Clone + 'static,
        U: 'static,
        F: Fn(T) -> U + 'static,
        G: Fn(&U) -> Option<T> + 'static,
    {
        MapArbitrary::new(self.boxed(), Rc::new(mapper), Some(Rc::new(unmapper)))
    }

    /// Only keep values matching `predicate`
    fn filter<F>(self, predicate: F) -> FilterArbitrary<T>
    where
        Self: Sized + 'static,
        T: 'static,
        F: Fn(&T) -> bool + 'static,
    {
        FilterArbitrary::new(self.boxed(), Rc::new(predicate))
    }

    /// Generate as usual but never shrink
    fn no_shrink(self) -> NoShrinkArbitrary<T>
    where
        Self: Sized + 'static,
        T: 'static,
    {
        NoShrinkArbitrary::new(self.boxed())
    }

    /// Generate ignoring any bias factor
    fn no_bias(self) -> NoBiasArbitrary<T>
    where
        Self: Sized + 'static,
        T: 'static,
    {
        NoBiasArbitrary::new(self.boxed())
    }

    /// Erase the concrete type
    fn boxed(self) -> BoxedArbitrary<T>
    where
        Self: Sized + 'static,
    {
        Rc::new(self)
    }
}

/// Shared, type-erased arbitrary
pub type BoxedArbitrary<T> = Rc<dyn Arbitrary<T>>;

impl<T, A> Arbitrary<T> for Rc<A>
where
    A: Arbitrary<T> + ?Sized,
{
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<T> {
        (**self).generate(rng, bias_factor)
    }

    fn can_shrink_without_context(&self, value: &T) -> bool {
        (**self).can_shrink_without_context(value)
    }

    fn shrink(&self, value: &T, context: &Context) -> Stream<Value<T>> {
        (**self).shrink(value, context)
    }
}

//! Weighted choice between arbitraries, with depth-biased recursion support.
//!
//! [`frequency`] and [`one_of`] pick one arm per generated value. When used to
//! describe recursive structures, the shared [`DepthContext`] pulls selection
//! toward the first arm as depth grows, and `max_depth` forces it once
//! reached. The first arm is therefore expected to be the terminal case.
//!
//! With cross-shrink enabled, shrinking a value produced by any other arm
//! first offers what the first arm would have produced at that point, which
//! lets deep recursive values collapse in a single step.

use std::cell::RefCell;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::depth::{DepthContext, DepthIdentifier, get_depth_context_for};
use crate::error::ArbitraryError;
use crate::rng::Random;
use crate::size::{DepthSize, depth_bias_from_size_for_arbitrary};
use crate::stream::Stream;
use crate::value::{Context, Value};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// One arm of a [`FrequencyArbitrary`]
pub struct WeightedArbitrary<T> {
    pub arbitrary: BoxedArbitrary<T>,
    pub weight: u32,
    /// Value offered by cross-shrink when shrinking without context
    pub fallback_value: Option<T>,
}

impl<T> WeightedArbitrary<T> {
    pub fn new<A>(arbitrary: A, weight: u32) -> Self
    where
        A: Arbitrary<T> + 'static,
    {
        Self {
            arbitrary: arbitrary.boxed(),
            weight,
            fallback_value: None,
        }
    }

    /// Weighted arm from an already boxed arbitrary
    pub fn from_boxed(arbitrary: BoxedArbitrary<T>, weight: u32) -> Self {
        Self {
            arbitrary,
            weight,
            fallback_value: None,
        }
    }

    pub fn with_fallback_value(mut self, value: T) -> Self {
        self.fallback_value = Some(value);
        self
    }
}

/// Options shared by [`frequency_with`] and [`one_of_with`]
#[derive(Debug, Clone, Default)]
pub struct OneOfConstraints {
    /// Offer the first arm's value as the first shrink candidate
    pub with_cross_shrink: bool,
    /// How fast selection is biased toward the first arm with depth
    pub depth_size: Option<DepthSize>,
    /// Depth from which only the first arm is generated
    pub max_depth: Option<usize>,
    /// Counter shared with other recursive arbitraries
    pub depth_identifier: Option<DepthIdentifier>,
}

impl OneOfConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cross_shrink(mut self, enabled: bool) -> Self {
        self.with_cross_shrink = enabled;
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

/// Shrink state of a value produced by a [`FrequencyArbitrary`]
struct FrequencyContext<T> {
    selected_index: usize,
    original_bias: Option<u32>,
    original_context: Context,
    /// Random state right after generation; set when cross-shrink applies
    cloned_random: Option<Random>,
    cached_first: RefCell<Option<Value<T>>>,
}

/// Weighted choice between arms
pub struct FrequencyArbitrary<T> {
    warbs: Vec<WeightedArbitrary<T>>,
    cumulated_weights: Vec<u64>,
    total_weight: u64,
    depth_bias: f64,
    max_depth: usize,
    with_cross_shrink: bool,
    depth_context: DepthContext,
}

impl<T: Clone + 'static> FrequencyArbitrary<T> {
    /// Validate the arms and build the arbitrary
    pub fn from(
        warbs: Vec<WeightedArbitrary<T>>,
        constraints: OneOfConstraints,
        label: &'static str,
    ) -> Result<Self, ArbitraryError> {
        if warbs.is_empty() {
            return Err(ArbitraryError::NoEntries { label });
        }
        let total_weight: u64 = warbs.iter().map(|warb| u64::from(warb.weight)).sum();
        if total_weight == 0 {
            return Err(ArbitraryError::ZeroTotalWeight { label });
        }
        Ok(Self::build(warbs, constraints))
    }

    /// Build from arms known to be valid
    pub(crate) fn build(warbs: Vec<WeightedArbitrary<T>>, constraints: OneOfConstraints) -> Self {
        let cumulated_weights: Vec<u64> = warbs
            .iter()
            .scan(0u64, |total, warb| {
                *total += u64::from(warb.weight);
                Some(*total)
            })
            .collect();
        let total_weight = cumulated_weights.last().copied().unwrap_or(0);

        Self {
            warbs,
            cumulated_weights,
            total_weight,
            depth_bias: depth_bias_from_size_for_arbitrary(
                constraints.depth_size,
                constraints.max_depth.is_some(),
            ),
            max_depth: constraints.max_depth.unwrap_or(usize::MAX),
            with_cross_shrink: constraints.with_cross_shrink,
            depth_context: get_depth_context_for(constraints.depth_identifier.as_ref()),
        }
    }

    /// Counter this arbitrary increments while generating an arm
    pub fn depth_context(&self) -> &DepthContext {
        &self.depth_context
    }

    fn must_generate_first(&self) -> bool {
        self.max_depth <= self.depth_context.depth()
    }

    fn must_fallback_to_first_in_shrink(&self, index: usize) -> bool {
        index != 0 && self.with_cross_shrink && self.warbs[0].weight != 0
    }

    /// Extra room below zero in the selection range, all of it won by the first arm
    fn compute_neg_depth_benefit(&self) -> i64 {
        if self.depth_bias <= 0.0 || self.warbs[0].weight == 0 {
            return 0;
        }
        let depth = self.depth_context.depth().min(i32::MAX as usize) as i32;
        let depth_benefit = (1.0 + self.depth_bias).powi(depth).floor() - 1.0;
        -((self.total_weight as f64) * depth_benefit).min(MAX_SAFE_INTEGER) as i64
    }

    fn safe_generate_for_index(
        &self,
        rng: &mut Random,
        index: usize,
        bias_factor: Option<u32>,
    ) -> Value<T> {
        let _guard = self.depth_context.enter();
        let value = self.warbs[index].arbitrary.generate(rng, bias_factor);
        let cloned_random = if self.must_fallback_to_first_in_shrink(index) {
            Some(rng.clone())
        } else {
            None
        };
        map_into_value(index, value, cloned_random, bias_factor)
    }

    /// Index of the arm able to shrink `value` without context
    fn can_shrink_without_context_index(&self, value: &T) -> Option<usize> {
        if self.must_generate_first() {
            return self.warbs[0]
                .arbitrary
                .can_shrink_without_context(value)
                .then_some(0);
        }
        let _guard = self.depth_context.enter();
        self.warbs
            .iter()
            .position(|warb| warb.weight != 0 && warb.arbitrary.can_shrink_without_context(value))
    }

    fn default_shrink_for_first(&self, selected_index: usize) -> Stream<Value<T>> {
        let fallback = {
            let _guard = self.depth_context.enter();
            if self.must_fallback_to_first_in_shrink(selected_index) {
                self.warbs[0].fallback_value.clone()
            } else {
                None
            }
        };
        match fallback {
            Some(fallback) => Stream::once(map_into_value(
                0,
                Value::new(fallback, Context::none()),
                None,
                None,
            )),
            None => Stream::nil(),
        }
    }
}

fn map_into_value<T: 'static>(
    index: usize,
    value: Value<T>,
    cloned_random: Option<Random>,
    bias_factor: Option<u32>,
) -> Value<T> {
    let (raw, meta) = value.into_parts();
    let context: FrequencyContext<T> = FrequencyContext {
        selected_index: index,
        original_bias: bias_factor,
        original_context: meta.context,
        cloned_random,
        cached_first: RefCell::new(None),
    };
    Value::from_parts(raw, Context::new(context), meta.cloner)
}

impl<T: Clone + 'static> Arbitrary<T> for FrequencyArbitrary<T> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<T> {
        if self.must_generate_first() {
            return self.safe_generate_for_index(rng, 0, bias_factor);
        }
        let selected = rng.next_int(
            self.compute_neg_depth_benefit(),
            self.total_weight as i64 - 1,
        );
        let index = self
            .cumulated_weights
            .iter()
            .position(|cumulated| selected < *cumulated as i64)
            .unwrap_or(self.warbs.len() - 1);
        self.safe_generate_for_index(rng, index, bias_factor)
    }

    fn can_shrink_without_context(&self, value: &T) -> bool {
        self.can_shrink_without_context_index(value).is_some()
    }

    fn shrink(&self, value: &T, context: &Context) -> Stream<Value<T>> {
        let frequency_context = context
            .downcast::<FrequencyContext<T>>()
            .filter(|context| context.selected_index < self.warbs.len());

        if let Some(context) = frequency_context {
            let index = context.selected_index;
            let bias = context.original_bias;
            let original_shrinks = self.warbs[index]
                .arbitrary
                .shrink(value, &context.original_context)
                .map(move |shrunk| map_into_value(index, shrunk, None, bias));

            let Some(cloned_random) = &context.cloned_random else {
                return original_shrinks;
            };
            let mut cached_first = context.cached_first.borrow_mut();
            let first = match &*cached_first {
                Some(first) => first.clone(),
                None => {
                    tracing::trace!(from_index = index, "generating first arm for cross-shrink");
                    let first = self.safe_generate_for_index(&mut cloned_random.clone(), 0, bias);
                    *cached_first = Some(first.clone());
                    first
                }
            };
            return Stream::once(first).join(original_shrinks);
        }

        match self.can_shrink_without_context_index(value) {
            Some(index) => self.default_shrink_for_first(index).join(
                self.warbs[index]
                    .arbitrary
                    .shrink(value, &Context::none())
                    .map(move |shrunk| map_into_value(index, shrunk, None, None)),
            ),
            None => Stream::nil(),
        }
    }
}

/// Weighted choice between `warbs`
pub fn frequency<T: Clone + 'static>(
    warbs: Vec<WeightedArbitrary<T>>,
) -> Result<FrequencyArbitrary<T>, ArbitraryError> {
    FrequencyArbitrary::from(warbs, OneOfConstraints::default(), "frequency")
}

/// Weighted choice between `warbs`, with recursion and shrink options
pub fn frequency_with<T: Clone + 'static>(
    constraints: OneOfConstraints,
    warbs: Vec<WeightedArbitrary<T>>,
) -> Result<FrequencyArbitrary<T>, ArbitraryError> {
    FrequencyArbitrary::from(warbs, constraints, "frequency")
}

/// Uniform choice between `arbitraries`
pub fn one_of<T: Clone + 'static>(
    arbitraries: Vec<BoxedArbitrary<T>>,
) -> Result<FrequencyArbitrary<T>, ArbitraryError> {
    one_of_with(OneOfConstraints::default(), arbitraries)
}

/// Uniform choice between `arbitraries`, with recursion and shrink options
pub fn one_of_with<T: Clone + 'static>(
    constraints: OneOfConstraints,
    arbitraries: Vec<BoxedArbitrary<T>>,
) -> Result<FrequencyArbitrary<T>, ArbitraryError> {
    let warbs = arbitraries
        .into_iter()
        .map(|arbitrary| WeightedArbitrary::from_boxed(arbitrary, 1))
        .collect();
    FrequencyArbitrary::from(warbs, constraints, "one_of")
}

/// Like [`one_of_with`] with explicit weights per arm
pub fn one_of_weighted<T: Clone + 'static>(
    constraints: OneOfConstraints,
    warbs: Vec<WeightedArbitrary<T>>,
) -> Result<FrequencyArbitrary<T>, ArbitraryError> {
    FrequencyArbitrary::from(warbs, constraints, "one_of")
}

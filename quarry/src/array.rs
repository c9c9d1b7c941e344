//! Variable-length arrays, optionally without duplicates.
//!
//! Shrinking tries, in order:
//! 1. shorter arrays, keeping the trailing items,
//! 2. the items one by one, starting from the context's `start_index`,
//! 3. the tail, recursively, with the head kept.
//!
//! Every stage is built lazily so that nested arrays never materialize their
//! whole shrink tree.

use std::rc::Rc;

use crate::arbitrary::{Arbitrary, BoxedArbitrary};
use crate::bias::integer_log_like;
use crate::combinators::FilterArbitrary;
use crate::depth::{DepthContext, DepthIdentifier, get_depth_context_for};
use crate::error::ArbitraryError;
use crate::primitives::IntegerArbitrary;
use crate::rng::Random;
use crate::size::{
    MAX_LENGTH_UPPER_BOUND, SizeForArbitrary, max_generated_length_from_size_for_arbitrary,
};
use crate::stream::Stream;
use crate::value::{Cloner, Context, Value, ValueMeta};

type IsDuplicate<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// Length and depth options for [`array`]
#[derive(Debug, Clone, Default)]
pub struct ArrayConstraints {
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub size: Option<SizeForArbitrary>,
    pub depth_identifier: Option<DepthIdentifier>,
}

impl ArrayConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_size(mut self, size: impl Into<SizeForArbitrary>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_depth_identifier(mut self, identifier: impl Into<DepthIdentifier>) -> Self {
        self.depth_identifier = Some(identifier.into());
        self
    }
}

/// Options for [`unique_array`]: length bounds plus the equality used to
/// detect duplicates
pub struct UniqueArrayConstraints<T> {
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub size: Option<SizeForArbitrary>,
    pub depth_identifier: Option<DepthIdentifier>,
    is_duplicate: IsDuplicate<T>,
}

impl<T: PartialEq + 'static> UniqueArrayConstraints<T> {
    /// Items are duplicates when equal
    pub fn new() -> Self {
        Self::by_comparator(|a: &T, b: &T| a == b)
    }
}

impl<T: PartialEq + 'static> Default for UniqueArrayConstraints<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> UniqueArrayConstraints<T> {
    /// Items are duplicates when `comparator` says so
    pub fn by_comparator<F>(comparator: F) -> Self
    where
        F: Fn(&T, &T) -> bool + 'static,
    {
        Self {
            min_length: 0,
            max_length: None,
            size: None,
            depth_identifier: None,
            is_duplicate: Rc::new(comparator),
        }
    }

    /// Items are duplicates when their selected keys are equal
    pub fn by_selector<K, F>(selector: F) -> Self
    where
        K: PartialEq,
        F: Fn(&T) -> K + 'static,
    {
        Self::by_comparator(move |a, b| selector(a) == selector(b))
    }

    /// Items are duplicates when `comparator` matches their selected keys
    pub fn by_selector_and_comparator<K, S, C>(selector: S, comparator: C) -> Self
    where
        S: Fn(&T) -> K + 'static,
        C: Fn(&K, &K) -> bool + 'static,
    {
        Self::by_comparator(move |a, b| comparator(&selector(a), &selector(b)))
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_size(mut self, size: impl Into<SizeForArbitrary>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_depth_identifier(mut self, identifier: impl Into<DepthIdentifier>) -> Self {
        self.depth_identifier = Some(identifier.into());
        self
    }
}

/// Shrink state attached to generated arrays
struct ArrayContext<T> {
    shrunk_once: bool,
    length_context: Context,
    items: Rc<Vec<ValueMeta<T>>>,
    start_index: usize,
}

/// Array being shrunk, seen from `offset` onwards
struct ShrinkState<T> {
    items: Rc<Vec<T>>,
    metas: Rc<Vec<ValueMeta<T>>>,
    offset: usize,
    shrunk_once: bool,
    length_context: Context,
    start_index: usize,
}

/// Candidate items, context for the length shrinker, next item to shrink
type Candidate<T> = (Vec<Value<T>>, Context, usize);

struct ArrayCore<T> {
    arbitrary: BoxedArbitrary<T>,
    min_length: usize,
    max_generated_length: usize,
    max_length: usize,
    length_arbitrary: IntegerArbitrary<usize>,
    depth_context: DepthContext,
    is_duplicate: Option<IsDuplicate<T>>,
}

/// Arrays of values drawn from an item arbitrary
pub struct ArrayArbitrary<T> {
    core: Rc<ArrayCore<T>>,
}

fn biased_max_length(min_length: usize, max_length: usize) -> usize {
    if min_length == max_length {
        return min_length;
    }
    min_length + integer_log_like((max_length - min_length) as i128) as usize
}

fn rebuild_at<T: Clone>(items: &[T], metas: &[ValueMeta<T>], index: usize) -> Value<T> {
    match metas.get(index) {
        Some(meta) => meta.rebuild(&items[index]),
        None => Value::new(items[index].clone(), Context::none()),
    }
}

impl<T: Clone + 'static> ArrayCore<T> {
    /// Length to generate and bias to hand to items
    fn apply_bias(&self, rng: &mut Random, bias_factor: Option<u32>) -> (usize, Option<u32>) {
        let Some(bias) = bias_factor else {
            return (self.generate_length(rng), None);
        };
        if self.min_length == self.max_generated_length {
            return (self.generate_length(rng), Some(bias));
        }
        let roll_max = i64::from(bias.max(1));
        if rng.next_int(1, roll_max) != 1 {
            return (self.generate_length(rng), None);
        }
        if rng.next_int(1, roll_max) != 1 {
            return (self.generate_length(rng), Some(bias));
        }
        let max_biased_length = biased_max_length(self.min_length, self.max_generated_length);
        let lengths = IntegerArbitrary::spanning(self.min_length, max_biased_length);
        (*lengths.generate(rng, None).value_ref(), Some(bias))
    }

    fn generate_length(&self, rng: &mut Random) -> usize {
        *self.length_arbitrary.generate(rng, None).value_ref()
    }

    fn generate_items(
        &self,
        length: usize,
        rng: &mut Random,
        bias_factor: Option<u32>,
    ) -> Vec<Value<T>> {
        let _guard = self.depth_context.enter();
        match &self.is_duplicate {
            None => (0..length)
                .map(|_| self.arbitrary.generate(rng, bias_factor))
                .collect(),
            Some(is_duplicate) => {
                self.generate_items_no_duplicates(is_duplicate, length, rng, bias_factor)
            }
        }
    }

    /// Stops after `max_generated_length` rejections in a row
    fn generate_items_no_duplicates(
        &self,
        is_duplicate: &IsDuplicate<T>,
        length: usize,
        rng: &mut Random,
        bias_factor: Option<u32>,
    ) -> Vec<Value<T>> {
        let mut items: Vec<Value<T>> = Vec::with_capacity(length);
        let mut skipped_in_row = 0;
        while items.len() < length && skipped_in_row < self.max_generated_length {
            let candidate = self.arbitrary.generate(rng, bias_factor);
            let duplicated = items
                .iter()
                .any(|item| is_duplicate(item.value_ref(), candidate.value_ref()));
            if duplicated {
                skipped_in_row += 1;
            } else {
                items.push(candidate);
                skipped_in_row = 0;
            }
        }
        if items.len() < length {
            tracing::debug!(
                target_length = length,
                generated = items.len(),
                "too many duplicates in a row, stopping unique generation early"
            );
        }
        items
    }

    /// Drop duplicates, keeping the first occurrence
    fn pre_filter(&self, items: Vec<Value<T>>) -> Vec<Value<T>> {
        let Some(is_duplicate) = &self.is_duplicate else {
            return items;
        };
        let mut kept: Vec<Value<T>> = Vec::with_capacity(items.len());
        for item in items {
            if !kept
                .iter()
                .any(|other| is_duplicate(other.value_ref(), item.value_ref()))
            {
                kept.push(item);
            }
        }
        kept
    }

    fn has_duplicates(&self, items: &[T]) -> bool {
        let Some(is_duplicate) = &self.is_duplicate else {
            return false;
        };
        items
            .iter()
            .enumerate()
            .any(|(index, item)| items[..index].iter().any(|other| is_duplicate(other, item)))
    }

    fn wrapper(
        &self,
        items: Vec<Value<T>>,
        shrunk_once: bool,
        length_context: Context,
        start_index: usize,
    ) -> Value<Vec<T>> {
        let raw_length = items.len();
        let items = if shrunk_once {
            self.pre_filter(items)
        } else {
            items
        };
        let length_context = if items.len() == raw_length {
            length_context
        } else {
            Context::none()
        };

        let (values, metas): (Vec<T>, Vec<ValueMeta<T>>) =
            items.into_iter().map(Value::into_parts).unzip();
        let metas = Rc::new(metas);

        let cloner = if metas.iter().any(|meta| meta.cloner.is_some()) {
            let metas = Rc::clone(&metas);
            let cloner: Cloner<Vec<T>> = Rc::new(move |values: &Vec<T>| {
                values
                    .iter()
                    .zip(metas.iter())
                    .map(|(value, meta)| meta.clone_value(value))
                    .collect()
            });
            Some(cloner)
        } else {
            None
        };

        let context = ArrayContext {
            shrunk_once,
            length_context,
            items: metas,
            start_index,
        };
        Value::from_parts(values, Context::new(context), cloner)
    }
}

fn shrink_item_by_item<T: Clone + 'static>(
    core: Rc<ArrayCore<T>>,
    items: Rc<Vec<T>>,
    metas: Rc<Vec<ValueMeta<T>>>,
    offset: usize,
    start_index: usize,
    end_index: usize,
) -> Stream<Candidate<T>> {
    Stream::new(start_index..end_index).flat_map(move |index| {
        let position = offset + index;
        let context = metas
            .get(position)
            .map(|meta| meta.context.clone())
            .unwrap_or_default();
        let items = Rc::clone(&items);
        let metas = Rc::clone(&metas);
        core.arbitrary
            .shrink(&items[position], &context)
            .map(move |shrunk| {
                let mut candidate = Vec::with_capacity(items.len() - offset);
                candidate.extend((offset..position).map(|i| rebuild_at(&items, &metas, i)));
                candidate.push(shrunk);
                candidate
                    .extend((position + 1..items.len()).map(|i| rebuild_at(&items, &metas, i)));
                (candidate, Context::none(), index)
            })
    })
}

fn shrink_impl<T: Clone + 'static>(
    core: &Rc<ArrayCore<T>>,
    state: ShrinkState<T>,
) -> Stream<Candidate<T>> {
    let ShrinkState {
        items,
        metas,
        offset,
        shrunk_once,
        length_context,
        start_index,
    } = state;
    let length = items.len() - offset;
    if length == 0 {
        return Stream::nil();
    }
    let min_length = core.min_length;

    let skipped = if shrunk_once && length_context.is_none() && length > min_length + 1 {
        1
    } else {
        0
    };
    let by_length = {
        let items = Rc::clone(&items);
        let metas = Rc::clone(&metas);
        core.length_arbitrary
            .shrink(&length, &length_context)
            .skip(skipped)
            .map(move |new_length| {
                let slice_start = offset + length - *new_length.value_ref();
                let candidate: Vec<Value<T>> = (slice_start..items.len())
                    .map(|i| rebuild_at(&items, &metas, i))
                    .collect();
                (candidate, new_length.context().clone(), 0)
            })
    };

    let by_item = {
        let core = Rc::clone(core);
        let items = Rc::clone(&items);
        let metas = Rc::clone(&metas);
        let end_index = if length > min_length { 1 } else { length };
        move || shrink_item_by_item(core, items, metas, offset, start_index, end_index)
    };

    let stream = by_length.join_lazy(by_item);
    if length <= min_length {
        return stream;
    }

    let core = Rc::clone(core);
    stream.join_lazy(move || {
        let head = rebuild_at(&items, &metas, offset);
        let tail = ShrinkState {
            items,
            metas,
            offset: offset + 1,
            shrunk_once: false,
            length_context: Context::none(),
            start_index: 0,
        };
        shrink_impl(&core, tail)
            .filter(move |(candidate, _, _)| min_length <= candidate.len() + 1)
            .map(move |(candidate, _, _)| {
                let mut with_head = Vec::with_capacity(candidate.len() + 1);
                with_head.push(head.clone());
                with_head.extend(candidate);
                (with_head, Context::none(), 0)
            })
    })
}

impl<T: Clone + 'static> ArrayArbitrary<T> {
    fn with_bounds(
        arbitrary: BoxedArbitrary<T>,
        min_length: usize,
        max_generated_length: usize,
        max_length: usize,
        depth_identifier: Option<&DepthIdentifier>,
        is_duplicate: Option<IsDuplicate<T>>,
    ) -> Self {
        Self {
            core: Rc::new(ArrayCore {
                arbitrary,
                min_length,
                max_generated_length,
                max_length,
                length_arbitrary: IntegerArbitrary::spanning(min_length, max_generated_length),
                depth_context: get_depth_context_for(depth_identifier),
                is_duplicate,
            }),
        }
    }

    pub fn min_length(&self) -> usize {
        self.core.min_length
    }

    pub fn max_length(&self) -> usize {
        self.core.max_length
    }

    /// Upper bound actually used when generating, after size resolution
    pub fn max_generated_length(&self) -> usize {
        self.core.max_generated_length
    }
}

impl<T: Clone + 'static> Arbitrary<Vec<T>> for ArrayArbitrary<T> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<Vec<T>> {
        let (length, items_bias) = self.core.apply_bias(rng, bias_factor);
        let items = self.core.generate_items(length, rng, items_bias);
        self.core.wrapper(items, false, Context::none(), 0)
    }

    fn can_shrink_without_context(&self, value: &Vec<T>) -> bool {
        if value.len() < self.core.min_length || value.len() > self.core.max_length {
            return false;
        }
        value
            .iter()
            .all(|item| self.core.arbitrary.can_shrink_without_context(item))
            && !self.core.has_duplicates(value)
    }

    fn shrink(&self, value: &Vec<T>, context: &Context) -> Stream<Value<Vec<T>>> {
        let items = Rc::new(value.clone());
        let state = match context.downcast::<ArrayContext<T>>() {
            Some(context) if context.items.len() == value.len() => ShrinkState {
                items,
                metas: Rc::clone(&context.items),
                offset: 0,
                shrunk_once: context.shrunk_once,
                length_context: context.length_context.clone(),
                start_index: context.start_index,
            },
            _ => ShrinkState {
                items,
                metas: Rc::new(Vec::new()),
                offset: 0,
                shrunk_once: false,
                length_context: Context::none(),
                start_index: 0,
            },
        };
        let core = Rc::clone(&self.core);
        shrink_impl(&self.core, state).map(move |(items, length_context, start_index)| {
            core.wrapper(items, true, length_context, start_index)
        })
    }
}

/// Resolve length bounds shared by [`array`] and [`unique_array`]
fn resolve_bounds(
    label: &'static str,
    min_length: usize,
    max_length: Option<usize>,
    size: Option<SizeForArbitrary>,
) -> Result<(usize, usize, usize), ArbitraryError> {
    let specified_max_length = max_length.is_some();
    let max_length = max_length.unwrap_or(MAX_LENGTH_UPPER_BOUND);
    if min_length > max_length {
        return Err(ArbitraryError::InvalidLengthBounds {
            label,
            min_length,
            max_length,
        });
    }
    let max_generated_length = max_generated_length_from_size_for_arbitrary(
        size,
        min_length,
        max_length,
        specified_max_length,
    );
    Ok((min_length, max_generated_length, max_length))
}

/// Arrays of items drawn from `arbitrary`
pub fn array<T, A>(
    arbitrary: A,
    constraints: ArrayConstraints,
) -> Result<ArrayArbitrary<T>, ArbitraryError>
where
    T: Clone + 'static,
    A: Arbitrary<T> + 'static,
{
    let (min_length, max_generated_length, max_length) = resolve_bounds(
        "array",
        constraints.min_length,
        constraints.max_length,
        constraints.size,
    )?;
    Ok(ArrayArbitrary::with_bounds(
        arbitrary.boxed(),
        min_length,
        max_generated_length,
        max_length,
        constraints.depth_identifier.as_ref(),
        None,
    ))
}

/// Arrays whose items are pairwise distinct
pub struct UniqueArrayArbitrary<T> {
    inner: BoxedArbitrary<Vec<T>>,
}

impl<T: Clone + 'static> Arbitrary<Vec<T>> for UniqueArrayArbitrary<T> {
    fn generate(&self, rng: &mut Random, bias_factor: Option<u32>) -> Value<Vec<T>> {
        self.inner.generate(rng, bias_factor)
    }

    fn can_shrink_without_context(&self, value: &Vec<T>) -> bool {
        self.inner.can_shrink_without_context(value)
    }

    fn shrink(&self, value: &Vec<T>, context: &Context) -> Stream<Value<Vec<T>>> {
        self.inner.shrink(value, context)
    }
}

/// Arrays of pairwise distinct items drawn from `arbitrary`.
///
/// When the item arbitrary cannot produce enough distinct values, generation
/// gives up after too many duplicates in a row; shorter results are then
/// rejected so that `min_length` always holds.
pub fn unique_array<T, A>(
    arbitrary: A,
    constraints: UniqueArrayConstraints<T>,
) -> Result<UniqueArrayArbitrary<T>, ArbitraryError>
where
    T: Clone + 'static,
    A: Arbitrary<T> + 'static,
{
    let (min_length, max_generated_length, max_length) = resolve_bounds(
        "unique_array",
        constraints.min_length,
        constraints.max_length,
        constraints.size,
    )?;
    let array = ArrayArbitrary::with_bounds(
        arbitrary.boxed(),
        min_length,
        max_generated_length,
        max_length,
        constraints.depth_identifier.as_ref(),
        Some(constraints.is_duplicate),
    );
    let inner = if min_length == 0 {
        array.boxed()
    } else {
        FilterArbitrary::new(
            array.boxed(),
            Rc::new(move |items: &Vec<T>| items.len() >= min_length),
        )
        .boxed()
    };
    Ok(UniqueArrayArbitrary { inner })
}

//! Numeric shrinking shared by the integer-backed arbitraries.

use crate::stream::Stream;
use crate::value::{Context, Value};

/// Halve the distance between `current` and `target`.
///
/// Candidates move from `target` back toward `current`:
/// `target, current - gap/2, current - gap/4, ..., current - 1`.
/// Each candidate carries the previous candidate as its context so that a
/// later shrink can resume from the last value that passed.
///
/// With `try_target_asap` the very first candidate is `target` itself and has
/// no context; otherwise the first candidate is halfway and its context is
/// `target`.
pub fn shrink_integer(current: i128, target: i128, try_target_asap: bool) -> Stream<Value<i128>> {
    let real_gap = current - target;
    let first_gap = if try_target_asap {
        real_gap
    } else {
        real_gap / 2
    };
    let mut previous = if try_target_asap { None } else { Some(target) };

    let gaps =
        std::iter::successors(Some(first_gap), |gap| Some(gap / 2)).take_while(|gap| *gap != 0);
    Stream::new(gaps.map(move |to_remove| {
        let next = if to_remove == real_gap {
            target
        } else {
            current - to_remove
        };
        let context = previous.map(Context::new).unwrap_or_default();
        previous = Some(next);
        Value::new(next, context)
    }))
}

/// Read back a context left by [`shrink_integer`]
pub fn integer_context(context: &Context) -> Option<i128> {
    context.downcast::<i128>().map(|previous| *previous)
}

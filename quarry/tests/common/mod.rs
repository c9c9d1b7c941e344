//! Helpers shared by the integration tests

#![allow(dead_code)]

use quarry::{Arbitrary, Random, Value};

/// Follow the shrink tree by always taking the first candidate, recording every step
pub fn minimize_path<T, A>(arbitrary: &A, start: Value<T>) -> Vec<T>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
{
    let mut path = vec![start.value()];
    let mut current = start;
    while let Some(next) = arbitrary
        .shrink(current.value_ref(), current.context())
        .next()
    {
        path.push(next.value());
        current = next;
    }
    path
}

/// Last value reached by [`minimize_path`]
pub fn minimize<T, A>(arbitrary: &A, start: Value<T>) -> T
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
{
    let mut path = minimize_path(arbitrary, start);
    path.pop().unwrap()
}

/// Draw values until one matches `predicate`
pub fn generate_until<T, A, F>(arbitrary: &A, seed: u64, predicate: F) -> Value<T>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    F: Fn(&T) -> bool,
{
    let mut rng = Random::new(seed);
    for _ in 0..10_000 {
        let value = arbitrary.generate(&mut rng, Some(2));
        if predicate(value.value_ref()) {
            return value;
        }
    }
    panic!("no matching value within 10000 draws");
}

//! End-to-end shrinking scenarios
//!
//! Each test builds a composite arbitrary through the public API, generates a
//! value and walks its shrink tree the way a test runner would.

mod common;

use common::{generate_until, minimize, minimize_path};
use quarry::size::max_generated_length_from_size_for_arbitrary;
use quarry::{
    Arbitrary, ArrayConstraints, Context, GlobalParameters, OneOfConstraints, OptionConstraints,
    Random, Size, SizeForArbitrary, array, constant, infinite_stream, nat, one_of_with, option,
    tuple2, with_global_parameters,
};

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Zero,
    Items(Vec<u32>),
}

#[test]
fn test_bounded_array_minimizes_to_min_length_of_zeros() {
    let arbitrary = array(
        nat(),
        ArrayConstraints::new().with_min_length(2).with_max_length(4),
    )
    .unwrap();

    for seed in 0..20 {
        let start = generate_until(&arbitrary, seed, |v: &Vec<u32>| {
            v.iter().any(|&item| item != 0)
        });
        let len = start.value_ref().len();
        assert!((2..=4).contains(&len));
        assert_eq!(minimize(&arbitrary, start), vec![0, 0]);
    }
}

#[test]
fn test_array_shrink_path_never_goes_below_min_length() {
    let arbitrary = array(nat(), ArrayConstraints::new().with_min_length(3)).unwrap();
    let start = generate_until(&arbitrary, 5, |v: &Vec<u32>| v.len() > 5);

    for step in minimize_path(&arbitrary, start) {
        assert!(step.len() >= 3);
    }
}

#[test]
fn test_option_draws_both_variants() {
    let arbitrary = option(constant(true), OptionConstraints::new().with_freq(1));
    let mut rng = Random::new(123);

    let drawn: Vec<Option<bool>> = (0..1000)
        .map(|_| arbitrary.generate(&mut rng, None).value())
        .collect();

    assert!(drawn.contains(&Some(true)));
    assert!(drawn.contains(&None));
    assert!(drawn.iter().all(|v| matches!(v, None | Some(true))));
}

#[test]
fn test_cross_shrink_jumps_to_first_arm() {
    let arbitrary = one_of_with(
        OneOfConstraints::new().with_cross_shrink(true),
        vec![
            constant(Shape::Zero).boxed(),
            array(nat(), ArrayConstraints::new().with_min_length(5))
                .unwrap()
                .map(Shape::Items)
                .boxed(),
        ],
    )
    .unwrap();

    let start = generate_until(&arbitrary, 9, |v: &Shape| matches!(v, Shape::Items(_)));
    let first = arbitrary
        .shrink(start.value_ref(), start.context())
        .next()
        .map(|candidate| candidate.value());
    assert_eq!(first, Some(Shape::Zero));
}

#[test]
fn test_cross_shrink_disabled_stays_in_arm() {
    let arbitrary = one_of_with(
        OneOfConstraints::new(),
        vec![
            constant(Shape::Zero).boxed(),
            array(nat(), ArrayConstraints::new().with_min_length(5))
                .unwrap()
                .map(Shape::Items)
                .boxed(),
        ],
    )
    .unwrap();

    let start = generate_until(&arbitrary, 9, |v: &Shape| {
        matches!(v, Shape::Items(items) if items.len() > 5)
    });
    let candidates: Vec<Shape> = arbitrary
        .shrink(start.value_ref(), start.context())
        .take(20)
        .map(|candidate| candidate.value())
        .collect();
    assert!(!candidates.is_empty());
    assert!(candidates.iter().all(|c| matches!(c, Shape::Items(items) if items.len() >= 5)));
}

#[test]
fn test_pair_shrinks_one_coordinate_at_a_time() {
    let arbitrary = tuple2(nat(), nat());
    let path = minimize_path(&arbitrary, quarry::Value::new((100, 50), Context::none()));

    assert_eq!(path.first(), Some(&(100, 50)));
    assert_eq!(path.last(), Some(&(0, 0)));
    for step in path.windows(2) {
        let (before, after) = (step[0], step[1]);
        assert!(!(after.0 > before.0 && after.1 > before.1));
        assert!(after.0 == before.0 || after.1 == before.1);
    }
}

#[test]
fn test_explicit_max_size_ignores_global_parameters() {
    let expected = 50;
    assert_eq!(
        max_generated_length_from_size_for_arbitrary(Some(SizeForArbitrary::Max), 3, 50, true),
        expected
    );

    for size in Size::ALL {
        for to_max in [false, true] {
            let parameters = GlobalParameters::new()
                .with_base_size(size)
                .with_default_size_to_max_when_max_specified(to_max);
            let length = with_global_parameters(parameters, || {
                max_generated_length_from_size_for_arbitrary(
                    Some(SizeForArbitrary::Max),
                    3,
                    50,
                    true,
                )
            });
            assert_eq!(length, expected);
        }
    }
}

#[test]
fn test_global_base_size_changes_generated_lengths() {
    let max_generated = |size: Size| {
        with_global_parameters(GlobalParameters::new().with_base_size(size), || {
            array(nat(), ArrayConstraints::new())
                .unwrap()
                .max_generated_length()
        })
    };
    assert!(max_generated(Size::XSmall) < max_generated(Size::Small));
    assert!(max_generated(Size::Small) < max_generated(Size::Large));

    let xsmall = GlobalParameters::new().with_base_size(Size::XSmall);
    let arbitrary =
        with_global_parameters(xsmall, || array(nat(), ArrayConstraints::new()).unwrap());
    let mut rng = Random::new(77);
    for _ in 0..100 {
        let len = arbitrary.generate(&mut rng, None).value_ref().len();
        assert!(len <= arbitrary.max_generated_length());
    }
}

#[test]
fn test_infinite_stream_inside_array_replays() {
    let arbitrary = array(
        infinite_stream(nat()),
        ArrayConstraints::new().with_min_length(1).with_max_length(3),
    )
    .unwrap();
    let value = arbitrary.generate(&mut Random::new(8), Some(2));

    let first: Vec<Vec<u32>> = value
        .value()
        .into_iter()
        .map(|stream| stream.take(4).collect())
        .collect();
    let second: Vec<Vec<u32>> = value
        .value()
        .into_iter()
        .map(|stream| stream.take(4).collect())
        .collect();
    assert_eq!(first, second);
}

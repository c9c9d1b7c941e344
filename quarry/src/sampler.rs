//! Generation helpers to eyeball what an arbitrary produces.

use std::collections::HashMap;

use rand::RngCore;

use crate::arbitrary::Arbitrary;
use crate::rng::Random;

/// Runs used by [`sample`] when none are requested
pub const DEFAULT_SAMPLE_RUNS: usize = 10;
/// Runs used by [`statistics`] when none are requested
pub const DEFAULT_STATISTICS_RUNS: usize = 100;

/// How many values to draw and from which seed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleParameters {
    /// Seed of the first run; drawn from entropy when unset
    pub seed: Option<u64>,
    pub num_runs: Option<usize>,
    /// Never pass a bias factor to the arbitrary
    pub unbiased: bool,
}

impl SampleParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_num_runs(mut self, num_runs: usize) -> Self {
        self.num_runs = Some(num_runs);
        self
    }

    pub fn unbiased(mut self) -> Self {
        self.unbiased = true;
        self
    }
}

/// Bias factor of the `run`-th value: `2 + floor(log10(run + 1))`.
///
/// Early runs are strongly biased toward edge cases, later ones less so.
pub fn bias_factor_for_run(run: usize) -> u32 {
    2 + ((run + 1) as f64).log10().floor() as u32
}

fn generate_runs<T, A>(arbitrary: &A, parameters: &SampleParameters, default_runs: usize) -> Vec<T>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
{
    let num_runs = parameters.num_runs.unwrap_or(default_runs);
    let mut seeds = match parameters.seed {
        Some(seed) => Random::new(seed),
        None => Random::from_entropy(),
    };
    tracing::debug!(
        seed = ?parameters.seed,
        num_runs,
        unbiased = parameters.unbiased,
        "sampling arbitrary"
    );

    (0..num_runs)
        .map(|run| {
            let bias_factor = if parameters.unbiased {
                None
            } else {
                Some(bias_factor_for_run(run))
            };
            let mut rng = Random::new(seeds.next_u64());
            arbitrary.generate(&mut rng, bias_factor).value()
        })
        .collect()
}

/// Draw values from `arbitrary`
pub fn sample<T, A>(arbitrary: &A, parameters: SampleParameters) -> Vec<T>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
{
    generate_runs(arbitrary, &parameters, DEFAULT_SAMPLE_RUNS)
}

/// Share of drawn values falling in each class, in percent, most frequent first.
///
/// `classify` may put a value in several classes (or none).
pub fn statistics<T, A, F>(
    arbitrary: &A,
    classify: F,
    parameters: SampleParameters,
) -> Vec<(String, f64)>
where
    T: Clone,
    A: Arbitrary<T> + ?Sized,
    F: Fn(&T) -> Vec<String>,
{
    let values = generate_runs(arbitrary, &parameters, DEFAULT_STATISTICS_RUNS);
    let num_runs = values.len();

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in &values {
        for class in classify(value) {
            *counts.entry(class).or_insert(0) += 1;
        }
    }

    let mut shares: Vec<(String, usize)> = counts.into_iter().collect();
    shares.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares
        .into_iter()
        .map(|(class, count)| {
            let percent = if num_runs == 0 {
                0.0
            } else {
                count as f64 * 100.0 / num_runs as f64
            };
            tracing::debug!(class = %class, percent, "classification");
            (class, percent)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ArrayConstraints, array};
    use crate::primitives::{integer_in, nat};

    #[test]
    fn test_bias_factor_for_run() {
        assert_eq!(bias_factor_for_run(0), 2);
        assert_eq!(bias_factor_for_run(8), 2);
        assert_eq!(bias_factor_for_run(9), 3);
        assert_eq!(bias_factor_for_run(98), 3);
        assert_eq!(bias_factor_for_run(99), 4);
    }

    #[test]
    fn test_sample_default_runs() {
        let values = sample(&nat(), SampleParameters::new().with_seed(1));
        assert_eq!(values.len(), DEFAULT_SAMPLE_RUNS);
    }

    #[test]
    fn test_sample_is_reproducible_with_seed() {
        let arb = array(nat(), ArrayConstraints::default()).unwrap();
        let params = SampleParameters::new().with_seed(42).with_num_runs(25);
        assert_eq!(sample(&arb, params.clone()), sample(&arb, params));
    }

    #[test]
    fn test_statistics_shares() {
        let arb = integer_in(0u32, 9).unwrap();
        let shares = statistics(
            &arb,
            |v: &u32| {
                if v % 2 == 0 {
                    vec!["even".to_string()]
                } else {
                    vec!["odd".to_string()]
                }
            },
            SampleParameters::new().with_seed(7).with_num_runs(200).unbiased(),
        );

        assert_eq!(shares.len(), 2);
        let total: f64 = shares.iter().map(|(_, share)| share).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(shares[0].1 >= shares[1].1);
    }

    #[test]
    fn test_statistics_with_no_runs() {
        let shares = statistics(
            &nat(),
            |_| vec!["any".to_string()],
            SampleParameters::new().with_seed(0).with_num_runs(0),
        );
        assert!(shares.is_empty());
    }
}

/**
 * RecoFactor
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use scoped_pool::Pool;

use config::SvdConfig;
use dataset::{Dataset, Renaming};
use error::{Error, Result};
use evaluation;
use models::{Model, Svd};
use utils;

/// Candidate values per hyperparameter, every list must hold at least one value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSearchParams {
    pub num_epochs: Vec<usize>,
    pub num_factors: Vec<usize>,
    pub regularization: Vec<f64>,
    pub learning_rate: Vec<f64>,
    pub init_std_dev: Vec<f64>,
}

/// Outcome of training and scoring a single combination of hyperparameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSearchTestResult {
    pub num_epochs: usize,
    pub num_factors: usize,
    pub regularization: f64,
    pub learning_rate: f64,
    pub init_std_dev: f64,
    /// RMSE on the test dataset
    pub loss: f64,
    pub runtime: Duration,
}

#[derive(Clone, Debug)]
struct Combination {
    num_epochs: usize,
    num_factors: usize,
    regularization: f64,
    learning_rate: f64,
    init_std_dev: f64,
}

impl GridSearchParams {

    pub fn num_combinations(&self) -> usize {
        self.num_epochs.len() * self.num_factors.len() * self.regularization.len() *
            self.learning_rate.len() * self.init_std_dev.len()
    }

    fn validate(&self) -> Result<()> {
        let lengths = [
            ("num_epochs", self.num_epochs.len()),
            ("num_factors", self.num_factors.len()),
            ("regularization", self.regularization.len()),
            ("learning_rate", self.learning_rate.len()),
            ("init_std_dev", self.init_std_dev.len()),
        ];

        for &(name, length) in lengths.iter() {
            if length == 0 {
                return Err(Error::Configuration(
                    format!("grid search needs at least one value for {}", name)));
            }
        }

        Ok(())
    }

    /// The cross product, epochs vary slowest and init stddev fastest.
    fn combinations(&self) -> Vec<Combination> {
        let mut combinations = Vec::with_capacity(self.num_combinations());

        for &num_epochs in self.num_epochs.iter() {
            for &num_factors in self.num_factors.iter() {
                for &regularization in self.regularization.iter() {
                    for &learning_rate in self.learning_rate.iter() {
                        for &init_std_dev in self.init_std_dev.iter() {
                            combinations.push(Combination {
                                num_epochs,
                                num_factors,
                                regularization,
                                learning_rate,
                                init_std_dev,
                            });
                        }
                    }
                }
            }
        }

        combinations
    }
}

/// Trains a fresh SVD model on `train` for every combination of hyperparameters and scores it
/// with its RMSE on `test`. Combination `k` initializes its model from a generator seeded with
/// `seed + k`. Results come in the order of the combinations.
pub fn grid_search(
    train: &Dataset,
    test: &Dataset,
    params: &GridSearchParams,
    seed: u64,
) -> Result<Vec<GridSearchTestResult>> {

    params.validate()?;
    ensure_test_ratings(test)?;

    let renaming = Renaming::from(test);
    let combinations = params.combinations();

    let mut results = Vec::with_capacity(combinations.len());

    for (index, combination) in combinations.iter().enumerate() {
        let result =
            run_combination(train, test, &renaming, combination, seed, index, combinations.len())?;
        results.push(result);
    }

    Ok(results)
}

/// Same as `grid_search`, but evaluates the combinations concurrently on a pool of
/// `pool_size` threads. Setting `cancelled` stops combinations which have not started yet,
/// their results are missing from the output. A failing combination cancels the remaining
/// ones and its error is returned.
pub fn grid_search_pooled(
    train: &Dataset,
    test: &Dataset,
    params: &GridSearchParams,
    seed: u64,
    pool_size: usize,
    cancelled: &AtomicBool,
) -> Result<Vec<GridSearchTestResult>> {

    params.validate()?;
    ensure_test_ratings(test)?;

    let renaming = Renaming::from(test);
    let combinations = params.combinations();
    let num_combinations = combinations.len();

    // One slot per combination, so workers never contend on a shared output
    let slots: Vec<Mutex<Option<Result<GridSearchTestResult>>>> =
        (0..num_combinations).map(|_| Mutex::new(None)).collect();

    let failed = AtomicBool::new(false);

    let pool = Pool::new(pool_size.max(1));

    pool.scoped(|scope| {
        for (index, combination) in combinations.iter().enumerate() {

            let slot = &slots[index];
            let reference_to_renaming = &renaming;
            let reference_to_failed = &failed;

            scope.execute(move || {

                if cancelled.load(Ordering::SeqCst) || reference_to_failed.load(Ordering::SeqCst) {
                    return;
                }

                let outcome = run_combination(train, test, reference_to_renaming, combination,
                    seed, index, num_combinations);

                if outcome.is_err() {
                    reference_to_failed.store(true, Ordering::SeqCst);
                }

                *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(outcome);
            });
        }
    });

    pool.shutdown();

    let mut results = Vec::with_capacity(num_combinations);

    for slot in slots.into_iter() {
        match slot.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()) {
            Some(Ok(result)) => results.push(result),
            Some(Err(e)) => return Err(e),
            None => {},
        }
    }

    if results.len() < num_combinations {
        warn!("grid search cancelled, {} of {} combinations were skipped",
            num_combinations - results.len(), num_combinations);
    }

    Ok(results)
}

fn ensure_test_ratings(test: &Dataset) -> Result<()> {
    if test.is_empty() {
        return Err(Error::Configuration(
            "grid search needs a test dataset with at least one rating".to_string()));
    }
    Ok(())
}

fn run_combination(
    train: &Dataset,
    test: &Dataset,
    renaming: &Renaming,
    combination: &Combination,
    seed: u64,
    index: usize,
    num_combinations: usize,
) -> Result<GridSearchTestResult> {

    info!("running grid search test {} / {}", index + 1, num_combinations);

    let config = SvdConfig::new()
        .num_factors(combination.num_factors)
        .regularization(combination.regularization)
        .learning_rate(combination.learning_rate)
        .init_std_dev(combination.init_std_dev);

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));

    let start = Instant::now();

    let mut model = Svd::new(train, &config, &mut rng)?;
    model.fit(combination.num_epochs);
    let loss = evaluation::evaluate(&model, test, renaming)?;

    let runtime = start.elapsed();

    info!("grid search test {} / {}: rmse {:.4}, {}ms", index + 1, num_combinations, loss,
        utils::to_millis(runtime));

    Ok(GridSearchTestResult {
        num_epochs: combination.num_epochs,
        num_factors: combination.num_factors,
        regularization: combination.regularization,
        learning_rate: combination.learning_rate,
        init_std_dev: combination.init_std_dev,
        loss,
        runtime,
    })
}


#[cfg(test)]
mod tests {

    use std::sync::atomic::AtomicBool;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use dataset::Dataset;
    use error::Error;
    use grid_search;
    use grid_search::GridSearchParams;

    fn train_and_test() -> (Dataset, Dataset) {
        let mut data = Dataset::new();
        for user in 0..15 {
            for item in 0..8 {
                if (user * 3 + item) % 4 != 0 {
                    let rating = 1 + (user % 3 + item % 4) % 5;
                    data.append(&format!("user{}", user), &format!("item{}", item),
                        rating as f32);
                }
            }
        }

        data.split(0.2, &mut StdRng::seed_from_u64(17)).unwrap()
    }

    fn params() -> GridSearchParams {
        GridSearchParams {
            num_epochs: vec![5],
            num_factors: vec![2, 4, 8],
            regularization: vec![0.02],
            learning_rate: vec![0.01],
            init_std_dev: vec![0.1],
        }
    }

    #[test]
    fn one_result_per_combination() {
        let (train, test) = train_and_test();

        let results = grid_search::grid_search(&train, &test, &params(), 42).unwrap();

        assert_eq!(results.len(), 3);

        let factors: Vec<usize> = results.iter().map(|result| result.num_factors).collect();
        assert_eq!(factors, vec![2, 4, 8]);

        for result in results.iter() {
            assert!(result.loss >= 0.0);
            assert!(result.loss.is_finite());
            assert_eq!(result.num_epochs, 5);
        }
    }

    #[test]
    fn combinations_are_nested_in_order() {
        let params = GridSearchParams {
            num_epochs: vec![1, 2],
            num_factors: vec![3],
            regularization: vec![0.01, 0.02],
            learning_rate: vec![0.005],
            init_std_dev: vec![0.05, 0.1],
        };

        assert_eq!(params.num_combinations(), 8);

        let order: Vec<(usize, f64, f64)> = params.combinations().iter()
            .map(|c| (c.num_epochs, c.regularization, c.init_std_dev))
            .collect();

        assert_eq!(order, vec![
            (1, 0.01, 0.05), (1, 0.01, 0.1), (1, 0.02, 0.05), (1, 0.02, 0.1),
            (2, 0.01, 0.05), (2, 0.01, 0.1), (2, 0.02, 0.05), (2, 0.02, 0.1),
        ]);
    }

    #[test]
    fn empty_candidate_lists_are_configuration_errors() {
        let (train, test) = train_and_test();

        let mut invalid = Vec::new();
        for field in 0..5 {
            let mut params = params();
            match field {
                0 => params.num_epochs.clear(),
                1 => params.num_factors.clear(),
                2 => params.regularization.clear(),
                3 => params.learning_rate.clear(),
                _ => params.init_std_dev.clear(),
            }
            invalid.push(params);
        }

        for params in invalid.iter() {
            match grid_search::grid_search(&train, &test, params, 1) {
                Err(Error::Configuration(_)) => {},
                other => panic!("expected a configuration error, got {:?}", other),
            }

            let cancelled = AtomicBool::new(false);
            match grid_search::grid_search_pooled(&train, &test, params, 1, 2, &cancelled) {
                Err(Error::Configuration(_)) => {},
                other => panic!("expected a configuration error, got {:?}", other),
            }
        }
    }

    #[test]
    fn pooled_search_matches_sequential_search() {
        let (train, test) = train_and_test();
        let cancelled = AtomicBool::new(false);

        let sequential = grid_search::grid_search(&train, &test, &params(), 7).unwrap();
        let pooled =
            grid_search::grid_search_pooled(&train, &test, &params(), 7, 3, &cancelled).unwrap();

        assert_eq!(sequential.len(), pooled.len());

        for (a, b) in sequential.iter().zip(pooled.iter()) {
            assert_eq!(a.num_factors, b.num_factors);
            assert_eq!(a.loss, b.loss);
        }
    }

    #[test]
    fn cancelled_search_skips_all_combinations() {
        let (train, test) = train_and_test();
        let cancelled = AtomicBool::new(true);

        let results =
            grid_search::grid_search_pooled(&train, &test, &params(), 7, 2, &cancelled).unwrap();

        assert!(results.is_empty());
    }

    #[test]
    fn invalid_init_std_dev_fails_the_search() {
        let (train, test) = train_and_test();
        let mut params = params();
        params.init_std_dev = vec![-1.0];

        match grid_search::grid_search(&train, &test, &params, 1) {
            Err(Error::InvalidArgument(_)) => {},
            other => panic!("expected an invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn invalid_init_std_dev_fails_the_pooled_search() {
        let (train, test) = train_and_test();
        let mut params = params();
        params.init_std_dev = vec![0.1, -1.0];

        let cancelled = AtomicBool::new(false);
        match grid_search::grid_search_pooled(&train, &test, &params, 1, 3, &cancelled) {
            Err(Error::InvalidArgument(_)) => {},
            other => panic!("expected an invalid argument, got {:?}", other),
        }
    }

    #[test]
    fn empty_test_set_is_a_configuration_error() {
        let (train, _) = train_and_test();
        let test = Dataset::new();
        assert!(test.is_empty());

        match grid_search::grid_search(&train, &test, &params(), 1) {
            Err(Error::Configuration(_)) => {},
            other => panic!("expected a configuration error, got {:?}", other),
        }

        let cancelled = AtomicBool::new(false);
        match grid_search::grid_search_pooled(&train, &test, &params(), 1, 2, &cancelled) {
            Err(Error::Configuration(_)) => {},
            other => panic!("expected a configuration error, got {:?}", other),
        }
    }
}

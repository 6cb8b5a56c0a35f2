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

use rand::Rng;
use fnv::FnvHashSet;

use config::SvdConfig;
use dataset::Dataset;
use error::Result;
use models;
use models::{BiasedFactors, Model};
use types;
use types::{DenseMatrix, DenseVector};

/// The distinct items rated per user, in the order of their first rating. All histories live in
/// one flat array, user `u` owns the range `offsets[u]..offsets[u + 1]`.
#[derive(Debug)]
struct UserHistories {
    offsets: Vec<usize>,
    item_ids: Vec<u32>,
}

impl UserHistories {

    fn build(dataset: &Dataset) -> Self {

        let num_users = dataset.num_users();

        let mut seen: FnvHashSet<(u32, u32)> =
            FnvHashSet::with_capacity_and_hasher(dataset.num_ratings(), Default::default());
        let mut distinct: Vec<(u32, u32)> = Vec::with_capacity(dataset.num_ratings());
        let mut history_lengths = vec![0usize; num_users];

        for (&user, &item) in dataset.users().iter().zip(dataset.items().iter()) {
            if seen.insert((user, item)) {
                distinct.push((user, item));
                history_lengths[user as usize] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(num_users + 1);
        offsets.push(0);
        for length in history_lengths.iter() {
            let end = offsets[offsets.len() - 1] + length;
            offsets.push(end);
        }

        let mut next_slot: Vec<usize> = offsets[..num_users].to_vec();
        let mut item_ids = vec![0u32; distinct.len()];

        for &(user, item) in distinct.iter() {
            let slot = &mut next_slot[user as usize];
            item_ids[*slot] = item;
            *slot += 1;
        }

        UserHistories { offsets, item_ids }
    }

    #[inline(always)]
    fn of(&self, user_idx: usize) -> &[u32] {
        &self.item_ids[self.offsets[user_idx]..self.offsets[user_idx + 1]]
    }
}

/// SVD with implicit feedback: the user factors are complemented by the normalized sum of
/// implicit item factors `yj` over all items the user rated.
#[derive(Debug)]
pub struct SvdPlusPlus<'a> {
    dataset: &'a Dataset,
    config: SvdConfig,
    params: BiasedFactors,
    implicit_factors: DenseMatrix,
    histories: UserHistories,
}

impl<'a> SvdPlusPlus<'a> {

    /// Builds an untrained model over `dataset`, drawing the user, item and implicit factors
    /// from `rng` in this order.
    pub fn new<R: Rng>(dataset: &'a Dataset, config: &SvdConfig, rng: &mut R) -> Result<Self> {

        let config = config.resolved();
        let params = BiasedFactors::new(dataset, &config, rng)?;

        let implicit_factors = DenseMatrix::random(dataset.num_items(), config.num_factors,
            config.init_mean, config.init_std_dev, rng)?;

        if config.verbose {
            info!("svd++: caching the rated items of {} users", dataset.num_users());
        }

        let histories = UserHistories::build(dataset);

        Ok(SvdPlusPlus { dataset, config, params, implicit_factors, histories })
    }

    pub fn config(&self) -> &SvdConfig {
        &self.config
    }

    pub fn global_mean(&self) -> f64 {
        self.params.global_mean
    }

    pub fn user_bias(&self, user_idx: u32) -> f64 {
        self.params.user_biases[user_idx as usize]
    }

    pub fn item_bias(&self, item_idx: u32) -> f64 {
        self.params.item_biases[item_idx as usize]
    }

    pub fn user_factors(&self, user_idx: u32) -> &[f64] {
        self.params.user_factors.row(user_idx as usize)
    }

    pub fn item_factors(&self, item_idx: u32) -> &[f64] {
        self.params.item_factors.row(item_idx as usize)
    }

    pub fn implicit_item_factors(&self, item_idx: u32) -> &[f64] {
        self.implicit_factors.row(item_idx as usize)
    }

    /// Items rated by the user, each listed once.
    pub fn history(&self, user_idx: u32) -> &[u32] {
        self.histories.of(user_idx as usize)
    }
}

/// Writes `sum(yj for j in history) / sqrt(|history|)` into `implicit`.
fn implicit_feedback(implicit_factors: &DenseMatrix, history: &[u32], implicit: &mut [f64]) {

    for value in implicit.iter_mut() {
        *value = 0.0;
    }

    if history.is_empty() {
        return;
    }

    for &item in history {
        for (value, yj) in implicit.iter_mut().zip(implicit_factors.row(item as usize)) {
            *value += *yj;
        }
    }

    let sqrt_count = (history.len() as f64).sqrt();
    for value in implicit.iter_mut() {
        *value /= sqrt_count;
    }
}

impl<'a> Model for SvdPlusPlus<'a> {

    fn fit(&mut self, num_epochs: usize) {

        let dataset = self.dataset;
        let lr = self.config.learning_rate;
        let reg = self.config.regularization;
        let num_factors = self.config.num_factors;

        let mut implicit: DenseVector = types::new_dense_vector(num_factors);
        let mut item_factors_before: DenseVector = types::new_dense_vector(num_factors);

        for epoch in 0..num_epochs {

            models::log_epoch("svd++", self.config.verbose, epoch, num_epochs);

            let observations = dataset.users().iter()
                .zip(dataset.items().iter())
                .zip(dataset.ratings().iter());

            for ((&user, &item), &rating) in observations {

                let user_idx = user as usize;
                let item_idx = item as usize;

                let history = self.histories.of(user_idx);
                let sqrt_count = (history.len() as f64).sqrt();

                implicit_feedback(&self.implicit_factors, history, &mut implicit);

                let params = &mut self.params;

                let err = {
                    let user_factors = params.user_factors.row(user_idx);
                    let item_factors = params.item_factors.row(item_idx);

                    let dot: f64 = user_factors.iter()
                        .zip(implicit.iter())
                        .zip(item_factors.iter())
                        .map(|((pu, imp), qi)| (pu + imp) * qi)
                        .sum();

                    rating as f64 - (params.global_mean + params.user_biases[user_idx] +
                        params.item_biases[item_idx] + dot)
                };

                params.update_biases(user_idx, item_idx, err, lr, reg);

                let user_factors = params.user_factors.row_mut(user_idx);
                let item_factors = params.item_factors.row_mut(item_idx);

                item_factors_before.copy_from_slice(item_factors);

                for f in 0..num_factors {
                    let (pu, qi) = (user_factors[f], item_factors[f]);
                    user_factors[f] = pu + lr * (err * qi - reg * pu);
                    item_factors[f] = qi + lr * (err * (pu + implicit[f]) - reg * qi);
                }

                // Every item in the history moves, not only the rated one
                for &other_item in history {
                    let yj = self.implicit_factors.row_mut(other_item as usize);
                    for (y, qi) in yj.iter_mut().zip(item_factors_before.iter()) {
                        let value = *y;
                        *y = value + lr * (err * qi / sqrt_count - reg * value);
                    }
                }
            }
        }
    }

    fn predict(&self, user: &str, item: &str) -> f64 {
        let user_idx = self.dataset.user_id(user);
        let item_idx = self.dataset.item_id(item);

        let mut prediction = self.params.baseline(user_idx, item_idx);

        if let (Some(user_idx), Some(item_idx)) = (user_idx, item_idx) {
            let mut implicit = types::new_dense_vector(self.config.num_factors);
            implicit_feedback(&self.implicit_factors, self.histories.of(user_idx as usize),
                &mut implicit);

            let user_factors = self.params.user_factors.row(user_idx as usize);
            let item_factors = self.params.item_factors.row(item_idx as usize);

            for (f, pu) in user_factors.iter().enumerate() {
                prediction += pu * (item_factors[f] + implicit[f]);
            }
        }

        prediction
    }

    fn dataset(&self) -> &Dataset {
        self.dataset
    }
}

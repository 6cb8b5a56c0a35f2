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

use config::SvdConfig;
use dataset::Dataset;
use error::Result;
use models;
use models::{BiasedFactors, Model};
use types;

/// Biased matrix factorization: a rating is modelled as the global mean plus a user bias, an
/// item bias and the dot product of user and item factors.
#[derive(Debug)]
pub struct Svd<'a> {
    dataset: &'a Dataset,
    config: SvdConfig,
    params: BiasedFactors,
}

impl<'a> Svd<'a> {

    /// Builds an untrained model over `dataset`. Latent factors are drawn from `rng`, biases
    /// start at zero. Fails for an empty dataset or a negative init stddev.
    pub fn new<R: Rng>(dataset: &'a Dataset, config: &SvdConfig, rng: &mut R) -> Result<Self> {
        let config = config.resolved();
        let params = BiasedFactors::new(dataset, &config, rng)?;

        Ok(Svd { dataset, config, params })
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
}

impl<'a> Model for Svd<'a> {

    fn fit(&mut self, num_epochs: usize) {

        let dataset = self.dataset;
        let lr = self.config.learning_rate;
        let reg = self.config.regularization;
        let params = &mut self.params;

        for epoch in 0..num_epochs {

            models::log_epoch("svd", self.config.verbose, epoch, num_epochs);

            let observations = dataset.users().iter()
                .zip(dataset.items().iter())
                .zip(dataset.ratings().iter());

            for ((&user, &item), &rating) in observations {

                let user_idx = user as usize;
                let item_idx = item as usize;

                let err = {
                    let user_factors = params.user_factors.row(user_idx);
                    let item_factors = params.item_factors.row(item_idx);
                    let dot = types::dot(user_factors, item_factors);

                    rating as f64 - (params.global_mean + params.user_biases[user_idx] +
                        params.item_biases[item_idx] + dot)
                };

                params.update_biases(user_idx, item_idx, err, lr, reg);

                let user_factors = params.user_factors.row_mut(user_idx);
                let item_factors = params.item_factors.row_mut(item_idx);

                // Both updates must see the factors from before this step
                for (puf, qif) in user_factors.iter_mut().zip(item_factors.iter_mut()) {
                    let (pu, qi) = (*puf, *qif);
                    *puf = pu + lr * (err * qi - reg * pu);
                    *qif = qi + lr * (err * pu - reg * qi);
                }
            }
        }
    }

    fn predict(&self, user: &str, item: &str) -> f64 {
        let user_idx = self.dataset.user_id(user);
        let item_idx = self.dataset.item_id(item);

        let mut prediction = self.params.baseline(user_idx, item_idx);

        if let (Some(user_idx), Some(item_idx)) = (user_idx, item_idx) {
            prediction += types::dot(
                self.params.user_factors.row(user_idx as usize),
                self.params.item_factors.row(item_idx as usize),
            );
        }

        prediction
    }

    fn dataset(&self) -> &Dataset {
        self.dataset
    }
}

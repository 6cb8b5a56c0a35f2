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
use error::{Error, Result};
use types;
use types::{DenseMatrix, DenseVector};

pub mod svd;
pub mod svdpp;

pub use self::svd::Svd;
pub use self::svdpp::SvdPlusPlus;

/// Common contract of the factorization models. A model borrows the dataset it was built from
/// and never changes it, predictions are requested with the original string identifiers.
pub trait Model {
    /// Runs `num_epochs` passes of stochastic gradient descent over the ratings in the order in
    /// which they were appended.
    fn fit(&mut self, num_epochs: usize);

    /// Predicted rating of `item` by `user`. Identifiers unknown to the dataset contribute
    /// neither bias nor latent factors, so for two unknown identifiers this is the global mean.
    fn predict(&self, user: &str, item: &str) -> f64;

    fn dataset(&self) -> &Dataset;
}

/// Parameters shared by SVD and SVD++: latent factors plus biases around the global mean.
#[derive(Debug)]
struct BiasedFactors {
    user_factors: DenseMatrix,
    item_factors: DenseMatrix,
    user_biases: DenseVector,
    item_biases: DenseVector,
    global_mean: f64,
}

impl BiasedFactors {

    fn new<R: Rng>(dataset: &Dataset, config: &SvdConfig, rng: &mut R) -> Result<Self> {

        let global_mean = dataset.global_mean()
            .ok_or_else(|| Error::InvalidArgument(
                "cannot build a model from a dataset without ratings".to_owned()))?;

        let user_factors = DenseMatrix::random(dataset.num_users(), config.num_factors,
            config.init_mean, config.init_std_dev, rng)?;
        let item_factors = DenseMatrix::random(dataset.num_items(), config.num_factors,
            config.init_mean, config.init_std_dev, rng)?;

        Ok(BiasedFactors {
            user_factors,
            item_factors,
            user_biases: types::new_dense_vector(dataset.num_users()),
            item_biases: types::new_dense_vector(dataset.num_items()),
            global_mean,
        })
    }

    /// Global mean plus the biases of whichever identifiers are known.
    fn baseline(&self, user: Option<u32>, item: Option<u32>) -> f64 {
        let mut prediction = self.global_mean;

        if let Some(user_idx) = user {
            prediction += self.user_biases[user_idx as usize];
        }

        if let Some(item_idx) = item {
            prediction += self.item_biases[item_idx as usize];
        }

        prediction
    }

    /// Gradient step on both biases for a rating predicted with error `err`.
    #[inline(always)]
    fn update_biases(&mut self, user_idx: usize, item_idx: usize, err: f64, lr: f64, reg: f64) {
        let user_bias = self.user_biases[user_idx];
        self.user_biases[user_idx] = user_bias + lr * (err - reg * user_bias);

        let item_bias = self.item_biases[item_idx];
        self.item_biases[item_idx] = item_bias + lr * (err - reg * item_bias);
    }
}

fn log_epoch(model: &str, verbose: bool, epoch: usize, num_epochs: usize) {
    if verbose {
        info!("{}: running epoch {} / {}", model, epoch + 1, num_epochs);
    } else {
        debug!("{}: running epoch {} / {}", model, epoch + 1, num_epochs);
    }
}

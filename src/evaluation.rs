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

use dataset::{Dataset, Renaming};
use error;
use error::{Error, Result};
use models::Model;

/// Root-mean-square error between aligned predictions and actual ratings.
pub fn rmse(predicted: &[f64], actual: &[f64]) -> Result<f64> {

    error::ensure_same_length(predicted.len(), actual.len())?;

    if predicted.is_empty() {
        return Err(Error::InvalidArgument(
            "cannot compute the rmse of zero predictions".to_owned()));
    }

    let squared_error: f64 = predicted.iter()
        .zip(actual.iter())
        .map(|(prediction, rating)| (prediction - rating).powi(2))
        .sum();

    Ok((squared_error / predicted.len() as f64).sqrt())
}

/// RMSE of `model` on the ratings of `test`. The test dataset has its own id space, so every
/// observation is mapped back to its original identifiers via `renaming` (built from `test`)
/// and the model resolves them against its own training data.
pub fn evaluate<M>(model: &M, test: &Dataset, renaming: &Renaming) -> Result<f64>
    where M: Model + ?Sized {

    let mut predicted = Vec::with_capacity(test.num_ratings());
    let mut actual = Vec::with_capacity(test.num_ratings());

    let observations = test.users().iter()
        .zip(test.items().iter())
        .zip(test.ratings().iter());

    for ((&user_idx, &item_idx), &rating) in observations {

        let user = renaming.user_name(user_idx)
            .ok_or_else(|| Error::Configuration(
                format!("user id {} of the test dataset has no original identifier", user_idx)))?;

        let item = renaming.item_name(item_idx)
            .ok_or_else(|| Error::Configuration(
                format!("item id {} of the test dataset has no original identifier", item_idx)))?;

        predicted.push(model.predict(user, item));
        actual.push(rating as f64);
    }

    rmse(&predicted, &actual)
}

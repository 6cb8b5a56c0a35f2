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

#[cfg(test)]
mod tests {

    use std::sync::atomic::AtomicBool;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::super::{grid_search, grid_search_pooled, recommend, evaluate};
    use super::super::{datasets_from_slices, GridSearchParams, Model, Renaming, Svd, SvdPlusPlus,
        SvdConfig};

    #[test]
    fn programmatic_usage() {

        /* Our input data comprises of ratings which users gave to items. The identifiers used
           can be strings of arbitrary length and structure. */
        let mut users = Vec::new();
        let mut items = Vec::new();
        let mut ratings = Vec::new();

        for user in 0..30 {
            for item in 0..12 {
                if (user + 2 * item) % 3 != 0 {
                    users.push(format!("user{}", user));
                    items.push(format!("item{}", item));
                    ratings.push((1 + (user % 4 + item % 3) % 5) as f32);
                }
            }
        }

        /* The generator drives both the train/test split and the initialization of the latent
           factors, fixing its seed makes the whole run reproducible. */
        let mut rng = StdRng::seed_from_u64(2018);

        /* Train and test set encode their identifiers independently of each other. */
        let (train, test) = datasets_from_slices(&users, &items, &ratings, 0.2, &mut rng).unwrap();

        assert_eq!(train.num_ratings() + test.num_ratings(), ratings.len());

        /* We search over a small grid of hyperparameters, every combination trains a fresh
           SVD model on the train set and reports its RMSE on the test set. */
        let params = GridSearchParams {
            num_epochs: vec![10, 20],
            num_factors: vec![4, 8],
            regularization: vec![0.02],
            learning_rate: vec![0.01],
            init_std_dev: vec![0.1],
        };

        let results = grid_search(&train, &test, &params, 7).unwrap();
        assert_eq!(results.len(), 4);

        let cancelled = AtomicBool::new(false);
        let pooled_results = grid_search_pooled(&train, &test, &params, 7, 2, &cancelled).unwrap();
        assert_eq!(results.len(), pooled_results.len());

        let best = results.iter()
            .min_by(|a, b| a.loss.partial_cmp(&b.loss).unwrap())
            .unwrap();

        println!("Best rmse {} with {} factors after {} epochs", best.loss, best.num_factors,
            best.num_epochs);

        /* With the best hyperparameters we train an SVD++ model, which additionally learns from
           which items users rated. */
        let config = SvdConfig::new()
            .num_factors(best.num_factors)
            .regularization(best.regularization)
            .learning_rate(best.learning_rate)
            .init_std_dev(best.init_std_dev);

        let mut model = SvdPlusPlus::new(&train, &config, &mut rng).unwrap();
        model.fit(best.num_epochs);

        let svdpp_loss = evaluate(&model, &test, &Renaming::from(&test)).unwrap();
        assert!(svdpp_loss.is_finite());

        /* Finally, we compute the five items with the highest predicted ratings for a user. */
        for recommended in recommend(&model, "user3", 5).iter() {
            println!("\t{}: {}", recommended.item, recommended.score);
        }

        /* Both model variants are interchangeable behind the model trait. */
        let baseline = Svd::new(&train, &config, &mut rng).unwrap();
        let models: [&dyn Model; 2] = [&model, &baseline];
        for model in models.iter() {
            assert_eq!(model.dataset().num_ratings(), train.num_ratings());
        }
    }
}

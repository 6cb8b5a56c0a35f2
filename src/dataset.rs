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
use rand::seq::SliceRandom;
use fnv::FnvHashMap;

use error;
use error::{Error, Result};

/// Rating observations with their user and item identifiers encoded as consecutive integers.
/// Identifiers receive ids in the order in which they are first seen, starting at zero. Two
/// independently built datasets do not share ids, correspondence between them has to go
/// through the original identifiers.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    user_index: FnvHashMap<String,u32>,
    item_index: FnvHashMap<String,u32>,
    users: Vec<u32>,
    items: Vec<u32>,
    ratings: Vec<f32>,
}

impl Dataset {

    pub fn new() -> Self {
        Dataset::default()
    }

    /// Records a single observation, assigning fresh ids to identifiers we have not seen yet.
    pub fn append(&mut self, user: &str, item: &str, rating: f32) {
        let user_id = encode(&mut self.user_index, user);
        let item_id = encode(&mut self.item_index, item);

        self.users.push(user_id);
        self.items.push(item_id);
        self.ratings.push(rating);
    }

    pub fn num_users(&self) -> usize {
        self.user_index.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_index.len()
    }

    pub fn num_ratings(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn user_id(&self, user: &str) -> Option<u32> {
        self.user_index.get(user).cloned()
    }

    pub fn item_id(&self, item: &str) -> Option<u32> {
        self.item_index.get(item).cloned()
    }

    pub fn users(&self) -> &[u32] {
        &self.users
    }

    pub fn items(&self) -> &[u32] {
        &self.items
    }

    pub fn ratings(&self) -> &[f32] {
        &self.ratings
    }

    /// Arithmetic mean of all ratings, `None` for an empty dataset.
    pub fn global_mean(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }

        let sum: f64 = self.ratings.iter().map(|rating| *rating as f64).sum();
        Some(sum / self.ratings.len() as f64)
    }

    /// Randomly splits the observations into a train and a test dataset, see
    /// `datasets_from_slices`. Both outputs encode their identifiers from scratch.
    pub fn split<R: Rng>(&self, test_fraction: f64, rng: &mut R) -> Result<(Dataset, Dataset)> {

        let renaming = Renaming::from(self);

        let users: Vec<&str> = self.users.iter()
            .map(|user_id| renaming.user_names[*user_id as usize].as_str())
            .collect();

        let items: Vec<&str> = self.items.iter()
            .map(|item_id| renaming.item_names[*item_id as usize].as_str())
            .collect();

        datasets_from_slices(&users, &items, &self.ratings, test_fraction, rng)
    }
}

fn encode(index: &mut FnvHashMap<String,u32>, name: &str) -> u32 {
    if let Some(id) = index.get(name) {
        return *id;
    }

    let id = index.len() as u32;
    index.insert(name.to_owned(), id);
    id
}

/// Builds a train and a test dataset from aligned slices of observations. The observations are
/// randomly permuted, the last `round(n * test_fraction)` of them form the test set.
pub fn datasets_from_slices<S, R>(
    users: &[S],
    items: &[S],
    ratings: &[f32],
    test_fraction: f64,
    rng: &mut R,
) -> Result<(Dataset, Dataset)>
    where S: AsRef<str>, R: Rng {

    error::ensure_same_length(users.len(), items.len())?;
    error::ensure_same_length(users.len(), ratings.len())?;

    if !(test_fraction >= 0.0 && test_fraction <= 1.0) {
        return Err(Error::InvalidArgument(
            format!("test fraction must be between 0 and 1, got {}", test_fraction)));
    }

    let num_observations = ratings.len();
    let num_test = (num_observations as f64 * test_fraction).round() as usize;

    let mut permutation: Vec<usize> = (0..num_observations).collect();
    permutation.shuffle(rng);

    let (train_indices, test_indices) = permutation.split_at(num_observations - num_test);

    let mut train = Dataset::new();
    for &index in train_indices {
        train.append(users[index].as_ref(), items[index].as_ref(), ratings[index]);
    }

    let mut test = Dataset::new();
    for &index in test_indices {
        test.append(users[index].as_ref(), items[index].as_ref(), ratings[index]);
    }

    Ok((train, test))
}

/// Reverse lookup from the integer ids of a dataset back to the original identifiers.
pub struct Renaming {
    user_names: Vec<String>,
    item_names: Vec<String>,
}

impl Renaming {

    pub fn user_name(&self, user_id: u32) -> Option<&str> {
        self.user_names.get(user_id as usize).map(|name| name.as_str())
    }

    pub fn item_name(&self, item_id: u32) -> Option<&str> {
        self.item_names.get(item_id as usize).map(|name| name.as_str())
    }
}

impl<'a> From<&'a Dataset> for Renaming {

    fn from(dataset: &'a Dataset) -> Self {
        Renaming {
            user_names: invert(&dataset.user_index),
            item_names: invert(&dataset.item_index),
        }
    }
}

// Ids are dense, so every slot gets overwritten
fn invert(index: &FnvHashMap<String,u32>) -> Vec<String> {
    let mut names = vec![String::new(); index.len()];
    for (name, id) in index.iter() {
        names[*id as usize] = name.clone();
    }
    names
}


#[cfg(test)]
mod tests {

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use dataset;
    use dataset::{Dataset, Renaming};
    use error::Error;

    fn triples(dataset: &Dataset) -> Vec<(String, String, f32)> {
        let renaming = Renaming::from(dataset);
        let mut triples: Vec<(String, String, f32)> = (0..dataset.num_ratings())
            .map(|index| (
                renaming.user_name(dataset.users()[index]).unwrap().to_owned(),
                renaming.item_name(dataset.items()[index]).unwrap().to_owned(),
                dataset.ratings()[index],
            ))
            .collect();
        triples.sort_by(|a, b| a.partial_cmp(b).unwrap());
        triples
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut data = Dataset::new();
        assert!(data.is_empty());

        data.append("carol", "pony", 4.0);
        assert!(!data.is_empty());
        data.append("alice", "apple", 3.0);
        data.append("carol", "bike", 5.0);
        data.append("bob", "pony", 1.0);

        assert_eq!(data.num_ratings(), 4);
        assert_eq!(data.users().len(), 4);
        assert_eq!(data.items().len(), 4);

        assert_eq!(data.num_users(), 3);
        assert_eq!(data.user_id("carol"), Some(0));
        assert_eq!(data.user_id("alice"), Some(1));
        assert_eq!(data.user_id("bob"), Some(2));
        assert_eq!(data.user_id("dave"), None);

        assert_eq!(data.num_items(), 3);
        assert_eq!(data.item_id("pony"), Some(0));
        assert_eq!(data.item_id("apple"), Some(1));
        assert_eq!(data.item_id("bike"), Some(2));

        assert_eq!(data.users(), &[0, 1, 0, 2]);
        assert_eq!(data.items(), &[0, 1, 2, 0]);
        assert_eq!(data.ratings(), &[4.0, 3.0, 5.0, 1.0]);
    }

    #[test]
    fn global_mean() {
        let mut data = Dataset::new();
        assert_eq!(data.global_mean(), None);

        data.append("a", "x", 1.0);
        data.append("b", "x", 4.0);
        assert_eq!(data.global_mean(), Some(2.5));
    }

    #[test]
    fn renaming_inverts_the_encoding() {
        let mut data = Dataset::new();
        data.append("alice", "apple", 3.0);
        data.append("bob", "dog", 2.0);

        let renaming = Renaming::from(&data);

        assert_eq!(renaming.user_name(0), Some("alice"));
        assert_eq!(renaming.user_name(1), Some("bob"));
        assert_eq!(renaming.item_name(1), Some("dog"));
        assert_eq!(renaming.item_name(2), None);
    }

    #[test]
    fn split_sizes() {
        let users = ["a", "b", "c", "d", "e"];
        let items = ["v", "w", "x", "y", "z"];
        let ratings = [1.0, 2.0, 3.0, 4.0, 5.0];

        let (train, test) = dataset::datasets_from_slices(
            &users, &items, &ratings, 0.4, &mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(train.num_ratings() + test.num_ratings(), 5);
        assert_eq!(test.num_ratings(), 2);
        assert_eq!(train.num_ratings(), 3);
    }

    #[test]
    fn split_boundaries() {
        let users = ["a", "b", "c"];
        let items = ["x", "y", "z"];
        let ratings = [1.0, 2.0, 3.0];

        let (train, test) = dataset::datasets_from_slices(
            &users, &items, &ratings, 0.0, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!((train.num_ratings(), test.num_ratings()), (3, 0));

        let (train, test) = dataset::datasets_from_slices(
            &users, &items, &ratings, 1.0, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!((train.num_ratings(), test.num_ratings()), (0, 3));
    }

    #[test]
    fn split_rejects_mismatched_lengths() {
        let result = dataset::datasets_from_slices(
            &["a", "b", "c"], &["x", "y"], &[1.0, 2.0, 3.0], 0.2, &mut StdRng::seed_from_u64(1));

        match result {
            Err(Error::LengthMismatch { .. }) => {},
            other => panic!("expected a length mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn split_rejects_invalid_fractions() {
        for fraction in &[1.5, -0.1, ::std::f64::NAN] {
            let result = dataset::datasets_from_slices(
                &["a"], &["x"], &[1.0], *fraction, &mut StdRng::seed_from_u64(1));

            match result {
                Err(Error::InvalidArgument(_)) => {},
                other => panic!("expected an invalid argument, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[test]
    fn split_encodes_each_side_from_scratch() {
        let mut data = Dataset::new();
        for user in 0..20 {
            for item in 0..5 {
                data.append(&format!("user{}", user), &format!("item{}", item),
                    ((user + item) % 5 + 1) as f32);
            }
        }

        let (train, test) = data.split(0.25, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(test.num_ratings(), 25);
        assert_eq!(train.num_ratings(), 75);

        for dataset in &[&train, &test] {
            assert!(dataset.users().iter().all(|id| (*id as usize) < dataset.num_users()));
            assert!(dataset.items().iter().all(|id| (*id as usize) < dataset.num_items()));
            assert_eq!(dataset.users()[0], 0);
            assert_eq!(dataset.items()[0], 0);
        }

        let mut recombined = triples(&train);
        recombined.extend(triples(&test));
        recombined.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_eq!(recombined, triples(&data));
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let mut data = Dataset::new();
        for index in 0..50 {
            data.append(&format!("u{}", index % 7), &format!("i{}", index % 11), 3.0);
        }

        let (train_a, test_a) = data.split(0.3, &mut StdRng::seed_from_u64(9)).unwrap();
        let (train_b, test_b) = data.split(0.3, &mut StdRng::seed_from_u64(9)).unwrap();

        assert_eq!(train_a.users(), train_b.users());
        assert_eq!(train_a.items(), train_b.items());
        assert_eq!(test_a.users(), test_b.users());
        assert_eq!(test_a.items(), test_b.items());
    }
}

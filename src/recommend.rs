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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use dataset::Renaming;
use models::Model;

/// An item together with its predicted rating.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ScoredItem {
    pub item: String,
    pub score: f64,
}

/// Candidate in the top-n heap, refers to the item by its integer id.
#[derive(PartialEq, Debug)]
struct Candidate {
    item: u32,
    score: f64,
}

/// Ordering for our max-heap, reversed so that the weakest candidate is on top. There is no total
/// order on floating point numbers, so incomparable scores count as equal.
fn cmp_reverse(candidate_a: &Candidate, candidate_b: &Candidate) -> Ordering {
    match candidate_a.score.partial_cmp(&candidate_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Scores every item of the model's dataset for `user` and returns the `num_items` items with
/// the highest predicted ratings, best first. Users unknown to the model are ranked by item
/// biases alone.
pub fn recommend<M>(model: &M, user: &str, num_items: usize) -> Vec<ScoredItem>
    where M: Model + ?Sized {

    if num_items == 0 {
        return Vec::new();
    }

    let dataset = model.dataset();
    let renaming = Renaming::from(dataset);

    let mut heap = BinaryHeap::with_capacity(num_items);

    for item_idx in 0..dataset.num_items() as u32 {

        let score = match renaming.item_name(item_idx) {
            Some(item) => model.predict(user, item),
            None => continue,
        };

        let candidate = Candidate { item: item_idx, score };

        if heap.len() < num_items {
            heap.push(candidate);
        } else if let Some(mut top) = heap.peek_mut() {
            if candidate < *top {
                *top = candidate;
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .filter_map(|candidate| {
            renaming.item_name(candidate.item)
                .map(|item| ScoredItem { item: item.to_owned(), score: candidate.score })
        })
        .collect()
}

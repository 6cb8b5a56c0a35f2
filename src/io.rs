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

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::path::Path;

use csv;
use serde_json;

use dataset::Dataset;
use error::Result;
use grid_search::GridSearchTestResult;
use recommend::ScoredItem;

/// Reader for delimited rating data. We expect NO headers, and a user, item and rating per line.
pub fn csv_reader<R: io::Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .from_reader(input)
}

/// The (user, item, rating) triples of a reader. Rows which cannot be parsed are skipped.
pub fn ratings_from_csv<'a, R>(
    reader: &'a mut csv::Reader<R>
) -> impl Iterator<Item=(String, String, f32)> + 'a
    where R: io::Read {

    reader.deserialize::<(String, String, f32)>()
        .filter_map(|result| {
            match result {
                Ok(rating) => Some(rating),
                Err(e) => {
                    warn!("skipping malformed row: {}", e);
                    None
                },
            }
        })
}

/// Encodes all ratings of `input` into a fresh dataset.
pub fn dataset_from_reader<R: io::Read>(input: R, delimiter: u8) -> Dataset {
    let mut reader = csv_reader(input, delimiter);
    let mut dataset = Dataset::new();

    for (user, item, rating) in ratings_from_csv(&mut reader) {
        dataset.append(&user, &item, rating);
    }

    dataset
}

pub fn read_dataset(path: &str, delimiter: u8) -> Result<Dataset> {
    let file = File::open(&Path::new(path))?;
    let dataset = dataset_from_reader(io::BufReader::new(file), delimiter);

    info!(
        "Found {} ratings between {} users and {} items in {}.",
        dataset.num_ratings(),
        dataset.num_users(),
        dataset.num_items(),
        path
    );

    Ok(dataset)
}

/// Struct used for JSON serialization of recommendations. Field names will be used in JSON.
#[derive(Serialize)]
struct Recommendations<'a> {
    for_user: &'a str,
    recommended_items: &'a [ScoredItem],
}

/// If a `path` is supplied, we write to a file at the specified path, otherwise, we output to
/// stdout.
fn output(path: Option<String>) -> io::Result<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    Ok(out)
}

/// Outputs one JSON object per grid search result.
pub fn write_grid_search_results(
    results: &[GridSearchTestResult],
    path: Option<String>,
) -> Result<()> {
    let mut out = output(path)?;
    grid_search_results_as_json(results, &mut out)
}

/// Outputs the recommendations for `user` as a single JSON object.
pub fn write_recommendations(
    user: &str,
    recommended_items: &[ScoredItem],
    path: Option<String>,
) -> Result<()> {
    let mut out = output(path)?;
    recommendations_as_json(user, recommended_items, &mut out)
}

fn grid_search_results_as_json<W: Write>(
    results: &[GridSearchTestResult],
    out: &mut W,
) -> Result<()> {
    for result in results.iter() {
        write!(out, "{}\n", serde_json::to_string(result)?)?;
    }
    out.flush()?;

    Ok(())
}

fn recommendations_as_json<W: Write>(
    user: &str,
    recommended_items: &[ScoredItem],
    out: &mut W,
) -> Result<()> {
    let recommendations = Recommendations { for_user: user, recommended_items };
    write!(out, "{}\n", serde_json::to_string(&recommendations)?)?;
    out.flush()?;

    Ok(())
}


#[cfg(test)]
mod tests {

    use std::time::Duration;

    use serde_json;
    use serde_json::Value;

    use grid_search::GridSearchTestResult;
    use io;
    use recommend::ScoredItem;

    #[test]
    fn reads_ratings_and_skips_malformed_rows() {
        let input = "alice\tapple\t5\nbob\tdog\tnot-a-number\nbob\tapple\t2.5\ncharles\tpony\n";

        let dataset = io::dataset_from_reader(input.as_bytes(), b'\t');

        assert_eq!(dataset.num_ratings(), 2);
        assert_eq!(dataset.num_users(), 2);
        assert_eq!(dataset.num_items(), 1);
        assert_eq!(dataset.ratings(), &[5.0, 2.5]);
    }

    #[test]
    fn reads_comma_separated_ratings() {
        let dataset = io::dataset_from_reader("u1,i1,4\nu2,i1,3\n".as_bytes(), b',');

        assert_eq!(dataset.num_ratings(), 2);
        assert_eq!(dataset.user_id("u2"), Some(1));
    }

    #[test]
    fn grid_search_results_as_json_lines() {
        let results = vec![
            GridSearchTestResult {
                num_epochs: 20,
                num_factors: 50,
                regularization: 0.02,
                learning_rate: 0.005,
                init_std_dev: 0.1,
                loss: 0.93,
                runtime: Duration::from_millis(1500),
            },
            GridSearchTestResult {
                num_epochs: 20,
                num_factors: 100,
                regularization: 0.02,
                learning_rate: 0.005,
                init_std_dev: 0.1,
                loss: 0.91,
                runtime: Duration::from_millis(2500),
            },
        ];

        let mut out: Vec<u8> = Vec::new();
        io::grid_search_results_as_json(&results, &mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: GridSearchTestResult = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, results[1]);
    }

    #[test]
    fn recommendations_as_json() {
        let items = vec![
            ScoredItem { item: "pony".to_owned(), score: 4.5 },
            ScoredItem { item: "dog".to_owned(), score: 3.0 },
        ];

        let mut out: Vec<u8> = Vec::new();
        io::recommendations_as_json("alice", &items, &mut out).unwrap();

        let json: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["for_user"], "alice");
        assert_eq!(json["recommended_items"][0]["item"], "pony");
        assert_eq!(json["recommended_items"][1]["score"], 3.0);
    }
}

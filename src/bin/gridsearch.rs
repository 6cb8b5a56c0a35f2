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

extern crate env_logger;
extern crate getopts;
#[macro_use]
extern crate log;
extern crate num_cpus;
extern crate rand;
extern crate recofactor;

use std::env;
use std::error::Error;
use std::process;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use getopts::{Matches, Options};
use rand::SeedableRng;
use rand::rngs::StdRng;

use recofactor::{config, io, utils};
use recofactor::GridSearchParams;

fn main() {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of ratings \
        which users gave to items. The input file must contain a user, an item and a rating per \
        line, separated by the delimiter.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("d", "delimiter", "Field delimiter of the input file (optional, defaults to \
        tab).", "CHAR");
    opts.optopt("t", "test-fraction", "Fraction of the ratings held out for testing (optional, \
        defaults to 0.2).", "NUMBER");
    opts.optopt("", "epochs", "Comma separated numbers of epochs to try (optional, defaults to \
        20).", "LIST");
    opts.optopt("", "factors", "Comma separated numbers of latent factors to try (optional, \
        defaults to 50).", "LIST");
    opts.optopt("", "reg", "Comma separated regularization weights to try (optional, defaults \
        to 0.02).", "LIST");
    opts.optopt("", "lr", "Comma separated learning rates to try (optional, defaults to \
        0.005).", "LIST");
    opts.optopt("", "init-std-dev", "Comma separated standard deviations for the initialization \
        of latent factors to try (optional, defaults to 0.1).", "LIST");
    opts.optopt("s", "seed", "Seed for the random number generator (optional, defaults to \
        42).", "NUMBER");
    opts.optopt("p", "threads", "Number of threads evaluating combinations in parallel \
        (optional, defaults to the number of CPUs).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let ratings_path = match matches.opt_str("i") {
        Some(path) => path,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        ),
    };

    let options = match parse_options(&matches) {
        Ok(options) => options,
        Err(failure) => {
            let hint = format!("Problem with options: {}", failure);
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if let Err(failure) = run_grid_search(&ratings_path, matches.opt_str("o"), options) {
        error!("{}", failure);
        process::exit(1);
    }
}

struct GridSearchOptions {
    delimiter: u8,
    test_fraction: f64,
    seed: u64,
    num_threads: usize,
    params: GridSearchParams,
}

fn parse_options(matches: &Matches) -> Result<GridSearchOptions, Box<dyn Error>> {

    let delimiter = matches.opt_str("d").unwrap_or_else(|| "\t".to_owned());
    let delimiter = utils::parse_delimiter(&delimiter)?;

    let params = GridSearchParams {
        num_epochs: list_or_default(matches, "epochs", config::DEFAULT_NUM_EPOCHS)?,
        num_factors: list_or_default(matches, "factors", config::DEFAULT_NUM_FACTORS)?,
        regularization: list_or_default(matches, "reg", config::DEFAULT_REGULARIZATION)?,
        learning_rate: list_or_default(matches, "lr", config::DEFAULT_LEARNING_RATE)?,
        init_std_dev: list_or_default(matches, "init-std-dev", config::DEFAULT_INIT_STD_DEV)?,
    };

    Ok(GridSearchOptions {
        delimiter,
        test_fraction: matches.opt_get_default("t", 0.2)?,
        seed: matches.opt_get_default("s", 42)?,
        num_threads: matches.opt_get_default("p", num_cpus::get())?,
        params,
    })
}

fn list_or_default<T: FromStr>(
    matches: &Matches,
    name: &str,
    default: T,
) -> Result<Vec<T>, Box<dyn Error>> {
    match matches.opt_str(name) {
        Some(values) => Ok(utils::parse_list(&values)?),
        None => Ok(vec![default]),
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
    process::exit(2);
}

fn run_grid_search(
    ratings_path: &str,
    results_path: Option<String>,
    options: GridSearchOptions,
) -> Result<(), Box<dyn Error>> {

    info!("Reading ratings from {}", ratings_path);
    let ratings = io::read_dataset(ratings_path, options.delimiter)?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let (train, test) = ratings.split(options.test_fraction, &mut rng)?;

    info!(
        "Holding out {} of {} ratings, searching {} combinations on {} threads",
        test.num_ratings(),
        ratings.num_ratings(),
        options.params.num_combinations(),
        options.num_threads
    );

    let cancelled = AtomicBool::new(false);
    let mut results = recofactor::grid_search_pooled(
        &train,
        &test,
        &options.params,
        options.seed,
        options.num_threads,
        &cancelled,
    )?;

    results.sort_by(|a, b| {
        a.loss.partial_cmp(&b.loss).unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(best) = results.first() {
        info!(
            "Best rmse {:.4}: {} epochs, {} factors, reg {}, lr {}, init stddev {}",
            best.loss,
            best.num_epochs,
            best.num_factors,
            best.regularization,
            best.learning_rate,
            best.init_std_dev
        );
    }

    info!("Writing grid search results...");
    io::write_grid_search_results(&results, results_path)?;

    Ok(())
}

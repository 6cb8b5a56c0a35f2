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
extern crate rand;
extern crate recofactor;

use std::env;
use std::error::Error;
use std::process;

use getopts::{Matches, Options};
use rand::SeedableRng;
use rand::rngs::StdRng;

use recofactor::{config, io, utils};
use recofactor::{Model, ScoredItem, Svd, SvdConfig, SvdPlusPlus};

fn main() {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input file must contain a \
        user, an item and a rating per line, separated by the delimiter.", "PATH");
    opts.optopt("u", "user", "User to compute recommendations for (required).", "USER");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("d", "delimiter", "Field delimiter of the input file (optional, defaults to \
        tab).", "CHAR");
    opts.optopt("n", "num-items", "Number of items to recommend (optional, defaults to 50).",
        "NUMBER");
    opts.optopt("m", "model", "Model to train, either svd or svdpp (optional, defaults to \
        svd).", "MODEL");
    opts.optopt("e", "epochs", "Number of training epochs (optional, defaults to 20).", "NUMBER");
    opts.optopt("f", "factors", "Number of latent factors (optional, defaults to 50).", "NUMBER");
    opts.optopt("s", "seed", "Seed for the random number generator (optional, defaults to \
        42).", "NUMBER");
    opts.optflag("v", "verbose", "Log the progress of training");
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

    if !matches.opt_present("i") || !matches.opt_present("u") {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile and a user via --user."),
        );
    }

    if let Err(failure) = compute_recommendations(&matches) {
        error!("{}", failure);
        process::exit(1);
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

fn compute_recommendations(matches: &Matches) -> Result<(), Box<dyn Error>> {

    let ratings_path = matches.opt_str("i").unwrap_or_default();
    let user = matches.opt_str("u").unwrap_or_default();
    let delimiter = matches.opt_str("d").unwrap_or_else(|| "\t".to_owned());
    let delimiter = utils::parse_delimiter(&delimiter)?;
    let num_items: usize = matches.opt_get_default("n", 50)?;
    let num_epochs: usize = matches.opt_get_default("e", config::DEFAULT_NUM_EPOCHS)?;
    let num_factors: usize = matches.opt_get_default("f", config::DEFAULT_NUM_FACTORS)?;
    let seed: u64 = matches.opt_get_default("s", 42)?;
    let model_name = matches.opt_str("m").unwrap_or_else(|| "svd".to_owned());

    info!("Reading ratings from {}", ratings_path);
    let ratings = io::read_dataset(&ratings_path, delimiter)?;

    if ratings.user_id(&user).is_none() {
        warn!("{} has no ratings, recommendations are based on item biases only", user);
    }

    let config = SvdConfig::new()
        .num_factors(num_factors)
        .verbose(matches.opt_present("v"));

    let mut rng = StdRng::seed_from_u64(seed);

    let recommendations = match model_name.as_str() {
        "svd" => train_and_recommend(
            Svd::new(&ratings, &config, &mut rng)?, num_epochs, &user, num_items),
        "svdpp" => train_and_recommend(
            SvdPlusPlus::new(&ratings, &config, &mut rng)?, num_epochs, &user, num_items),
        other => return Err(format!("unknown model '{}', use svd or svdpp", other).into()),
    };

    info!("Writing {} recommendations for {}...", recommendations.len(), user);
    io::write_recommendations(&user, &recommendations, matches.opt_str("o"))?;

    Ok(())
}

fn train_and_recommend<M: Model>(
    mut model: M,
    num_epochs: usize,
    user: &str,
    num_items: usize,
) -> Vec<ScoredItem> {

    info!("Training for {} epochs", num_epochs);
    model.fit(num_epochs);

    recofactor::recommend(&model, user, num_items)
}

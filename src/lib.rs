//! # recofactor
//!
//! Latent factor models for explicit ratings: biased matrix factorization (SVD) and its
//! implicit feedback variant (SVD++), trained with stochastic gradient descent, plus a grid
//! search which scores every combination of hyperparameters by its RMSE on held-out ratings.
//!
//! ```rust
//! # extern crate rand;
//! # extern crate recofactor;
//! # use rand::SeedableRng;
//! # use rand::rngs::StdRng;
//! use recofactor::{Dataset, Model, Svd, SvdConfig};
//!
//! let mut ratings = Dataset::new();
//! ratings.append("alice", "apple", 5.0);
//! ratings.append("alice", "dog", 2.0);
//! ratings.append("bob", "apple", 4.0);
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut model = Svd::new(&ratings, &SvdConfig::new().num_factors(8), &mut rng).unwrap();
//! model.fit(20);
//!
//! println!("bob would rate dog with {}", model.predict("bob", "dog"));
//! ```

extern crate csv;
extern crate fnv;
extern crate rand;
extern crate rand_distr;
extern crate scoped_pool;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[macro_use]
extern crate log;

pub mod error;
pub mod types;
pub mod dataset;
pub mod config;
pub mod models;
pub mod evaluation;
pub mod grid_search;
pub mod recommend;
pub mod io;
pub mod utils;

mod usage_tests;

pub use config::SvdConfig;
pub use dataset::{datasets_from_slices, Dataset, Renaming};
pub use error::{Error, Result};
pub use evaluation::{evaluate, rmse};
pub use grid_search::{grid_search, grid_search_pooled, GridSearchParams, GridSearchTestResult};
pub use models::{Model, Svd, SvdPlusPlus};
pub use recommend::{recommend, ScoredItem};

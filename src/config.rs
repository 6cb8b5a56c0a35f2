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

pub const DEFAULT_NUM_FACTORS: usize = 50;
pub const DEFAULT_INIT_MEAN: f64 = 0.0;
pub const DEFAULT_INIT_STD_DEV: f64 = 0.1;
pub const DEFAULT_LEARNING_RATE: f64 = 0.005;
pub const DEFAULT_REGULARIZATION: f64 = 0.02;
/// Epochs are an argument of `fit`, the binaries fall back to this value.
pub const DEFAULT_NUM_EPOCHS: usize = 20;

/// Hyperparameters shared by both factorization models. Fields left at zero are replaced by
/// their defaults when a model gets built, bias vectors always start at zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SvdConfig {
    pub num_factors: usize,
    pub init_mean: f64,
    pub init_std_dev: f64,
    pub learning_rate: f64,
    pub regularization: f64,
    pub verbose: bool,
}

impl Default for SvdConfig {
    fn default() -> Self {
        SvdConfig {
            num_factors: DEFAULT_NUM_FACTORS,
            init_mean: DEFAULT_INIT_MEAN,
            init_std_dev: DEFAULT_INIT_STD_DEV,
            learning_rate: DEFAULT_LEARNING_RATE,
            regularization: DEFAULT_REGULARIZATION,
            verbose: false,
        }
    }
}

impl SvdConfig {

    pub fn new() -> Self {
        SvdConfig::default()
    }

    pub fn num_factors(mut self, num_factors: usize) -> Self {
        self.num_factors = num_factors;
        self
    }

    pub fn init_mean(mut self, init_mean: f64) -> Self {
        self.init_mean = init_mean;
        self
    }

    pub fn init_std_dev(mut self, init_std_dev: f64) -> Self {
        self.init_std_dev = init_std_dev;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Copy of this config with every zero-valued field replaced by its default.
    pub fn resolved(&self) -> Self {
        SvdConfig {
            num_factors: if self.num_factors == 0 { DEFAULT_NUM_FACTORS } else { self.num_factors },
            init_mean: self.init_mean,
            init_std_dev: or_default(self.init_std_dev, DEFAULT_INIT_STD_DEV),
            learning_rate: or_default(self.learning_rate, DEFAULT_LEARNING_RATE),
            regularization: or_default(self.regularization, DEFAULT_REGULARIZATION),
            verbose: self.verbose,
        }
    }
}

fn or_default(value: f64, default: f64) -> f64 {
    if value == 0.0 { default } else { value }
}

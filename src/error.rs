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

use std::error;
use std::fmt;
use std::io;
use std::result;

use csv;
use serde_json;

/// All errors surfaced by the library. Nothing in here panics or exits, the binaries decide
/// whether an error aborts the run.
#[derive(Debug)]
pub enum Error {
    /// A caller supplied an argument outside of its valid domain (split fraction, init stddev,
    /// empty inputs).
    InvalidArgument(String),
    /// Two sequences that must be aligned differ in length.
    LengthMismatch { expected: usize, actual: usize },
    /// The run is misconfigured or an encoding invariant broke mid-search. Not recoverable
    /// within a grid search.
    Configuration(String),
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

pub type Result<T> = result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidArgument(ref msg) => write!(f, "invalid argument: {}", msg),
            Error::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {} elements, found {}", expected, actual)
            },
            Error::Configuration(ref msg) => write!(f, "configuration error: {}", msg),
            Error::Io(ref e) => write!(f, "io error: {}", e),
            Error::Csv(ref e) => write!(f, "csv error: {}", e),
            Error::Json(ref e) => write!(f, "json error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::Csv(ref e) => Some(e),
            Error::Json(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Fails with `LengthMismatch` unless both lengths agree.
pub fn ensure_same_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { expected, actual });
    }
    Ok(())
}

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

use std::str::FromStr;
use std::time::Duration;

use error::{Error, Result};

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

/// Parses a comma separated list of values like `0.01,0.02,0.05`. Whitespace around values is
/// ignored, an empty list is an error.
pub fn parse_list<T: FromStr>(values: &str) -> Result<Vec<T>> {

    let parsed: Vec<T> = values.split(',')
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.parse::<T>()
            .map_err(|_| Error::InvalidArgument(format!("cannot parse '{}'", value))))
        .collect::<Result<Vec<T>>>()?;

    if parsed.is_empty() {
        return Err(Error::InvalidArgument(format!("no values found in '{}'", values)));
    }

    Ok(parsed)
}

/// Field delimiter given on the command line, `\t` denotes a tab.
pub fn parse_delimiter(delimiter: &str) -> Result<u8> {
    match delimiter {
        "\\t" | "\t" | "tab" => Ok(b'\t'),
        other if other.len() == 1 => Ok(other.as_bytes()[0]),
        other => Err(Error::InvalidArgument(
            format!("delimiter must be a single character, got '{}'", other))),
    }
}

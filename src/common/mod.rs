// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod resource_key;

pub use resource_key::{DEFAULT_NAMESPACE_NAME, ResourceKey, ResourceKeyError};

const BINARY_SUFFIXES: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SUFFIXES: [&str; 9] = ["n", "u", "m", "k", "M", "G", "T", "P", "E"];

pub fn format_resource<R>() -> &'static str {
    std::any::type_name::<R>().split("::").last().unwrap_or_default()
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn strip_exponent(value: &str) -> Option<&str> {
    let (number, exponent) = value.split_once(['e', 'E'])?;
    let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
    is_digits(exponent).then_some(number)
}

/// Accepts non-negative Kubernetes quantities: plain decimals, binary (`16Gi`) and decimal (`500m`, `1P`) suffixes and
/// decimal exponents (`1e3`). `1E` is the exa suffix, `1E3` an exponent.
pub fn is_valid_quantity(value: &str) -> bool {
    let number = BINARY_SUFFIXES
        .iter()
        .find_map(|suffix| value.strip_suffix(suffix))
        .or_else(|| strip_exponent(value))
        .or_else(|| DECIMAL_SUFFIXES.iter().find_map(|suffix| value.strip_suffix(suffix)))
        .unwrap_or(value);
    match number.split_once('.') {
        Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
        None => is_digits(number),
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_quantity;

    #[test]
    fn test_quantities() {
        for valid in ["16Gi", "40Gi", "256Gi", "500m", "1", "1.5", "2k", "1P", "1E", "2Ei", "1e3", "1E3", "1.5e-3", "12e+6"] {
            assert!(is_valid_quantity(valid), "{valid}");
        }
        for invalid in ["", "Gi", "16 Gi", "16GiB", "-1Gi", "1.", ".5", "sixteen", "1e", "e3", "1e3Gi", "1Ki3"] {
            assert!(!is_valid_quantity(invalid), "{invalid}");
        }
    }
}

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Binary image of a fitted filter.
//!
//! All integers are little-endian. The image starts with an 8-byte preamble:
//!
//! | byte | field                                   |
//! |------|-----------------------------------------|
//! | 0    | preamble longs                          |
//! | 1    | serial version                          |
//! | 2    | family id                               |
//! | 3    | lower length bound kind                 |
//! | 4    | upper length bound kind                 |
//! | 5    | flags                                   |
//! | 6..8 | unused                                  |
//!
//! followed by the configuration, the resolved bounds, the reservoir, the deny-list, the
//! frequency table in first-insertion order, and the most-common vocabulary.

use std::collections::BTreeSet;
use std::collections::HashSet;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::ensure_preamble_longs_in;
use crate::codec::ensure_serial_version_is;
use crate::codec::insufficient_data;
use crate::error::Error;
use crate::filter::FilterConfig;
use crate::filter::LengthBound;
use crate::filter::TokenFilter;
use crate::frequencies::TokenCounter;
use crate::reservoir::LengthReservoir;

const SERIAL_VERSION: u8 = 1;
const PREAMBLE_LONGS: u8 = 1;

const BOUND_ABSOLUTE: u8 = 0;
const BOUND_QUANTILE: u8 = 1;
const BOUND_UNBOUNDED: u8 = 2;

const FLAG_FITTED: u8 = 1 << 0;
const FLAG_HAS_MAX_FEATURES: u8 = 1 << 1;
const FLAG_HAS_MAX_LENGTH: u8 = 1 << 2;
const FLAG_HAS_MOST_COMMON: u8 = 1 << 3;

impl TokenFilter<StdRng> {
    /// Deserializes a filter, seeding a fresh random source from the OS.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_rng(bytes, StdRng::from_os_rng())
    }
}

impl<R: Rng> TokenFilter<R> {
    /// Deserializes a filter with an injected random source.
    ///
    /// The random source is not part of the image, so a restored filter samples
    /// differently from the filter that was serialized.
    pub fn deserialize_with_rng(bytes: &[u8], rng: R) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let preamble_longs = cursor
            .read_u8()
            .map_err(insufficient_data("preamble_longs"))?;
        let serial_version = cursor
            .read_u8()
            .map_err(insufficient_data("serial_version"))?;
        let family_id = cursor.read_u8().map_err(insufficient_data("family_id"))?;
        Family::TOKEN_FILTER.validate_id(family_id)?;
        ensure_serial_version_is(SERIAL_VERSION, serial_version)?;
        ensure_preamble_longs_in(&[PREAMBLE_LONGS], preamble_longs)?;

        let min_kind = cursor.read_u8().map_err(insufficient_data("min_kind"))?;
        let max_kind = cursor.read_u8().map_err(insufficient_data("max_kind"))?;
        let flags = cursor.read_u8().map_err(insufficient_data("flags"))?;
        cursor.read_exact(2).map_err(insufficient_data("preamble"))?;

        let min_value = cursor.read_u64_le().map_err(insufficient_data("min_length"))?;
        let max_value = cursor.read_u64_le().map_err(insufficient_data("max_length"))?;
        let frequency_lower = cursor
            .read_f64_le()
            .map_err(insufficient_data("frequency_range"))?;
        let frequency_upper = cursor
            .read_f64_le()
            .map_err(insufficient_data("frequency_range"))?;
        let max_features = cursor
            .read_u64_le()
            .map_err(insufficient_data("max_features"))?;
        let max_memory = cursor
            .read_u64_le()
            .map_err(insufficient_data("max_memory"))?;

        let resolved_min = cursor
            .read_f64_le()
            .map_err(insufficient_data("resolved_min_length"))?;
        let resolved_max = cursor
            .read_f64_le()
            .map_err(insufficient_data("resolved_max_length"))?;

        let num_seen = cursor.read_u64_le().map_err(insufficient_data("num_seen"))?;
        let num_lengths = cursor
            .read_u64_le()
            .map_err(insufficient_data("num_lengths"))?;
        let num_lengths = to_usize(num_lengths, "num_lengths")?;
        let mut lengths = Vec::with_capacity(num_lengths.min(cursor.remaining() / 8));
        for _ in 0..num_lengths {
            let length = cursor.read_u64_le().map_err(insufficient_data("lengths"))?;
            lengths.push(to_usize(length, "reservoir length")?);
        }

        let num_negative = cursor
            .read_u64_le()
            .map_err(insufficient_data("num_negative"))?;
        let mut negative = BTreeSet::new();
        for _ in 0..num_negative {
            let token = cursor.read_str().map_err(insufficient_data("negative"))?;
            if !negative.insert(token.to_owned()) {
                return Err(Error::deserial(format!("duplicate negative token {token:?}")));
            }
        }

        let num_tokens = cursor
            .read_u64_le()
            .map_err(insufficient_data("num_tokens"))?;
        let mut frequencies = TokenCounter::new();
        for _ in 0..num_tokens {
            let token = cursor.read_str().map_err(insufficient_data("tokens"))?;
            let count = cursor.read_u64_le().map_err(insufficient_data("counts"))?;
            if count == 0 {
                return Err(Error::deserial(format!("token {token:?} has zero count")));
            }
            if frequencies.count(token) > 0 {
                return Err(Error::deserial(format!("duplicate token {token:?}")));
            }
            frequencies.update_with_count(token, count);
        }

        let most_common = if flags & FLAG_HAS_MOST_COMMON != 0 {
            let num_common = cursor
                .read_u64_le()
                .map_err(insufficient_data("num_most_common"))?;
            let mut vocabulary = HashSet::new();
            for _ in 0..num_common {
                let token = cursor.read_str().map_err(insufficient_data("most_common"))?;
                if frequencies.count(token) == 0 {
                    return Err(Error::deserial(format!(
                        "most-common token {token:?} missing from frequency table"
                    )));
                }
                if !vocabulary.insert(token.to_owned()) {
                    return Err(Error::deserial(format!(
                        "duplicate most-common token {token:?}"
                    )));
                }
            }
            Some(vocabulary)
        } else {
            None
        };

        let config = FilterConfig {
            negative,
            min_length: decode_bound(min_kind, min_value)?,
            max_length: decode_bound(max_kind, max_value)?,
            frequency_range: (frequency_lower, frequency_upper),
            max_features: if flags & FLAG_HAS_MAX_FEATURES != 0 {
                Some(to_usize(max_features, "max_features")?)
            } else {
                None
            },
            max_memory: to_usize(max_memory, "max_memory")?,
        };
        config.validate().map_err(|err| {
            Error::deserial(format!("invalid configuration: {}", err.message()))
        })?;

        let expected_len = num_seen.min(config.max_memory as u64);
        if lengths.len() as u64 != expected_len {
            return Err(Error::deserial(format!(
                "reservoir holds {} lengths, expected {expected_len}",
                lengths.len()
            )));
        }
        if frequencies.total_weight() != num_seen {
            return Err(Error::deserial(format!(
                "frequency table weight {} does not match {num_seen} observed tokens",
                frequencies.total_weight()
            )));
        }

        let fitted = flags & FLAG_FITTED != 0;
        let max_length = (flags & FLAG_HAS_MAX_LENGTH != 0).then_some(resolved_max);
        check_vocabulary(&config, fitted, most_common.as_ref())?;
        check_resolved_bounds(&config, resolved_min, max_length)?;

        let reservoir = LengthReservoir::from_parts(config.max_memory, lengths, num_seen, rng);
        Ok(TokenFilter {
            config,
            reservoir,
            frequencies,
            min_length: resolved_min,
            max_length,
            most_common,
            fitted,
        })
    }
}

impl<R> TokenFilter<R> {
    /// Serializes the configuration and all learned state into bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = SketchBytes::with_capacity(128);
        let (min_kind, min_value) = encode_bound(self.config.min_length);
        let (max_kind, max_value) = encode_bound(self.config.max_length);
        let mut flags = 0u8;
        if self.fitted {
            flags |= FLAG_FITTED;
        }
        if self.config.max_features.is_some() {
            flags |= FLAG_HAS_MAX_FEATURES;
        }
        if self.max_length.is_some() {
            flags |= FLAG_HAS_MAX_LENGTH;
        }
        if self.most_common.is_some() {
            flags |= FLAG_HAS_MOST_COMMON;
        }

        out.write_u8(PREAMBLE_LONGS);
        out.write_u8(SERIAL_VERSION);
        out.write_u8(Family::TOKEN_FILTER.id);
        out.write_u8(min_kind);
        out.write_u8(max_kind);
        out.write_u8(flags);
        out.write_u8(0);
        out.write_u8(0);

        out.write_u64_le(min_value);
        out.write_u64_le(max_value);
        let (frequency_lower, frequency_upper) = self.config.frequency_range;
        out.write_f64_le(frequency_lower);
        out.write_f64_le(frequency_upper);
        out.write_u64_le(self.config.max_features.unwrap_or(0) as u64);
        out.write_u64_le(self.config.max_memory as u64);
        out.write_f64_le(self.min_length);
        out.write_f64_le(self.max_length.unwrap_or(0.0));

        out.write_u64_le(self.reservoir.num_seen());
        out.write_u64_le(self.reservoir.len() as u64);
        for &length in self.reservoir.lengths() {
            out.write_u64_le(length as u64);
        }

        out.write_u64_le(self.config.negative.len() as u64);
        for token in &self.config.negative {
            out.write_str(token);
        }

        out.write_u64_le(self.frequencies.num_tokens() as u64);
        for (token, count) in self.frequencies.iter() {
            out.write_str(token);
            out.write_u64_le(count);
        }

        if let Some(vocabulary) = &self.most_common {
            out.write_u64_le(vocabulary.len() as u64);
            // counter order keeps the image deterministic
            for (token, _) in self.frequencies.iter() {
                if vocabulary.contains(token) {
                    out.write_str(token);
                }
            }
        }
        out.into_bytes()
    }
}

/// Checks the most-common vocabulary against the vocabulary cap.
///
/// A fitted filter with a cap always carries a vocabulary; an unfitted one never does.
fn check_vocabulary(
    config: &FilterConfig,
    fitted: bool,
    vocabulary: Option<&HashSet<String>>,
) -> Result<(), Error> {
    match (config.max_features, vocabulary) {
        (None, Some(_)) => Err(Error::deserial(
            "most-common vocabulary present without max_features",
        )),
        (Some(_), Some(_)) if !fitted => Err(Error::deserial(
            "most-common vocabulary present on an unfitted filter",
        )),
        (Some(_), None) if fitted => Err(Error::deserial(
            "most-common vocabulary missing on a fitted filter with max_features",
        )),
        (Some(max_features), Some(vocabulary)) if vocabulary.len() > max_features => {
            Err(Error::deserial(format!(
                "most-common vocabulary holds {} tokens, max_features is {max_features}",
                vocabulary.len()
            )))
        }
        _ => Ok(()),
    }
}

/// Checks resolved length bounds against the configured ones.
///
/// Absolute bounds resolve to themselves and an unbounded maximum never resolves.
fn check_resolved_bounds(
    config: &FilterConfig,
    resolved_min: f64,
    resolved_max: Option<f64>,
) -> Result<(), Error> {
    let min_ok = match config.min_length {
        LengthBound::Absolute(n) => resolved_min == n as f64,
        _ => resolved_min.is_finite() && resolved_min >= 0.0,
    };
    if !min_ok {
        return Err(Error::deserial(format!(
            "resolved minimum length {resolved_min} contradicts {:?}",
            config.min_length
        )));
    }
    let max_ok = match (config.max_length, resolved_max) {
        (LengthBound::Absolute(n), Some(max)) => max == n as f64,
        (LengthBound::Absolute(_), None) => false,
        (LengthBound::Unbounded, max) => max.is_none(),
        (LengthBound::Quantile(_), Some(max)) => max.is_finite() && max >= 0.0,
        (LengthBound::Quantile(_), None) => true,
    };
    if !max_ok {
        return Err(Error::deserial(format!(
            "resolved maximum length {resolved_max:?} contradicts {:?}",
            config.max_length
        )));
    }
    Ok(())
}

fn encode_bound(bound: LengthBound) -> (u8, u64) {
    match bound {
        LengthBound::Absolute(n) => (BOUND_ABSOLUTE, n as u64),
        LengthBound::Quantile(q) => (BOUND_QUANTILE, q.to_bits()),
        LengthBound::Unbounded => (BOUND_UNBOUNDED, 0),
    }
}

fn decode_bound(kind: u8, value: u64) -> Result<LengthBound, Error> {
    match kind {
        BOUND_ABSOLUTE => Ok(LengthBound::Absolute(to_usize(value, "length bound")?)),
        BOUND_QUANTILE => Ok(LengthBound::Quantile(f64::from_bits(value))),
        BOUND_UNBOUNDED => Ok(LengthBound::Unbounded),
        _ => Err(Error::deserial(format!("unknown length bound kind {kind}"))),
    }
}

fn to_usize(value: u64, what: &'static str) -> Result<usize, Error> {
    usize::try_from(value)
        .map_err(|_| Error::deserial(format!("{what} {value} overflows usize")))
}

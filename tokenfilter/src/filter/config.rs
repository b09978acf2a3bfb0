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

//! Static filter configuration and its builder.

use std::collections::BTreeSet;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::filter::TokenFilter;
use crate::reservoir::DEFAULT_CAPACITY;

/// A lower or upper bound on token length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthBound {
    /// A fixed number of characters.
    Absolute(usize),
    /// A fraction in `[0, 1]`, resolved against the sampled length distribution.
    Quantile(f64),
    /// No bound. Only valid as an upper bound.
    Unbounded,
}

impl LengthBound {
    /// Returns true if the bound is learned from data.
    pub fn is_quantile(&self) -> bool {
        matches!(self, LengthBound::Quantile(_))
    }
}

/// Immutable configuration of a [`TokenFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub(crate) negative: BTreeSet<String>,
    pub(crate) min_length: LengthBound,
    pub(crate) max_length: LengthBound,
    pub(crate) frequency_range: (f64, f64),
    pub(crate) max_features: Option<usize>,
    pub(crate) max_memory: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            negative: BTreeSet::new(),
            min_length: LengthBound::Absolute(0),
            max_length: LengthBound::Unbounded,
            frequency_range: (0.0, 1.0),
            max_features: None,
            max_memory: DEFAULT_CAPACITY,
        }
    }
}

impl FilterConfig {
    /// Tokens that never pass.
    pub fn negative(&self) -> &BTreeSet<String> {
        &self.negative
    }

    /// Configured lower length bound.
    pub fn min_length(&self) -> LengthBound {
        self.min_length
    }

    /// Configured upper length bound.
    pub fn max_length(&self) -> LengthBound {
        self.max_length
    }

    /// Inclusive relative frequency range.
    pub fn frequency_range(&self) -> (f64, f64) {
        self.frequency_range
    }

    /// Vocabulary cap, if any.
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Reservoir capacity.
    pub fn max_memory(&self) -> usize {
        self.max_memory
    }

    /// Checks every field and the relations between them.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        match self.min_length {
            LengthBound::Unbounded => {
                return Err(Error::invalid_argument(
                    "minimum length must be absolute or a quantile",
                )
                .with_context("field", "min_length"));
            }
            LengthBound::Quantile(q) => ensure_fraction("min_length", q)?,
            LengthBound::Absolute(_) => {}
        }
        if let LengthBound::Quantile(q) = self.max_length {
            ensure_fraction("max_length", q)?;
        }
        if let (LengthBound::Absolute(lower), LengthBound::Absolute(upper)) =
            (self.min_length, self.max_length)
        {
            if lower > upper {
                return Err(Error::invalid_argument(format!(
                    "minimum length {lower} exceeds maximum length {upper}"
                ))
                .with_context("field", "length_range"));
            }
        }
        if let (LengthBound::Quantile(lower), LengthBound::Quantile(upper)) =
            (self.min_length, self.max_length)
        {
            if lower > upper {
                return Err(Error::invalid_argument(format!(
                    "minimum length quantile {lower} exceeds maximum length quantile {upper}"
                ))
                .with_context("field", "length_range"));
            }
        }

        let (lower, upper) = self.frequency_range;
        ensure_fraction("frequency_range", lower)?;
        ensure_fraction("frequency_range", upper)?;
        if lower > upper {
            return Err(Error::invalid_argument(format!(
                "frequency lower bound {lower} exceeds upper bound {upper}"
            ))
            .with_context("field", "frequency_range"));
        }

        if self.max_features == Some(0) {
            return Err(Error::invalid_argument("max_features must be positive")
                .with_context("field", "max_features"));
        }
        if self.max_memory == 0 {
            return Err(Error::invalid_argument("max_memory must be positive")
                .with_context("field", "max_memory"));
        }
        Ok(())
    }
}

fn ensure_fraction(field: &'static str, value: f64) -> Result<(), Error> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(
            Error::invalid_argument(format!("expected a fraction in [0, 1], got {value}"))
                .with_context("field", field),
        )
    }
}

/// Builder for [`TokenFilter`].
///
/// All settings are optional. A filter built from the defaults passes every token.
#[derive(Debug, Clone, Default)]
pub struct TokenFilterBuilder {
    config: FilterConfig,
    seed: Option<u64>,
}

impl TokenFilterBuilder {
    /// Sets the tokens to remove, such as stop words.
    pub fn negative<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.negative = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Sets both length bounds.
    pub fn length_range(self, lower: LengthBound, upper: LengthBound) -> Self {
        self.min_length(lower).max_length(upper)
    }

    /// Sets the lower length bound. [`LengthBound::Unbounded`] is rejected by `build`.
    pub fn min_length(mut self, bound: LengthBound) -> Self {
        self.config.min_length = bound;
        self
    }

    /// Sets the upper length bound.
    pub fn max_length(mut self, bound: LengthBound) -> Self {
        self.config.max_length = bound;
        self
    }

    /// Sets the inclusive relative frequency range, both ends in `[0, 1]`.
    pub fn frequency_range(mut self, lower: f64, upper: f64) -> Self {
        self.config.frequency_range = (lower, upper);
        self
    }

    /// Caps the vocabulary at the `max_features` most common tokens.
    pub fn max_features(mut self, max_features: usize) -> Self {
        self.config.max_features = Some(max_features);
        self
    }

    /// Sets the reservoir capacity used for length quantiles.
    ///
    /// Lower values trade estimate quality for memory.
    pub fn max_memory(mut self, max_memory: usize) -> Self {
        self.config.max_memory = max_memory;
        self
    }

    /// Seeds the reservoir's random source. Ignored by [`Self::build_with_rng`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the filter with a [`StdRng`], seeded from [`Self::seed`] or from the OS.
    pub fn build(self) -> Result<TokenFilter<StdRng>, Error> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.build_with_rng(rng)
    }

    /// Builds the filter with an injected random source.
    pub fn build_with_rng<R: Rng>(self, rng: R) -> Result<TokenFilter<R>, Error> {
        self.config.validate()?;
        Ok(TokenFilter::from_config(self.config, rng))
    }
}

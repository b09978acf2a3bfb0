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

use std::collections::HashSet;

use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;
use tracing::warn;

use crate::filter::FilterConfig;
use crate::filter::LengthBound;
use crate::filter::TokenFilterBuilder;
use crate::frequencies::TokenCounter;
use crate::reservoir::LengthReservoir;

/// Streaming token filter.
///
/// See [`crate::filter`] for the pass criteria and the fitting lifecycle.
#[derive(Debug, Clone)]
pub struct TokenFilter<R = StdRng> {
    pub(crate) config: FilterConfig,
    pub(crate) reservoir: LengthReservoir<R>,
    pub(crate) frequencies: TokenCounter,
    pub(crate) min_length: f64,
    pub(crate) max_length: Option<f64>,
    pub(crate) most_common: Option<HashSet<String>>,
    pub(crate) fitted: bool,
}

impl TokenFilter<StdRng> {
    /// Creates a new builder for `TokenFilter`.
    pub fn builder() -> TokenFilterBuilder {
        TokenFilterBuilder::default()
    }
}

impl<R: Rng> TokenFilter<R> {
    /// Creates an unfitted filter from a validated configuration.
    pub(crate) fn from_config(config: FilterConfig, rng: R) -> Self {
        let min_length = match config.min_length {
            LengthBound::Absolute(n) => n as f64,
            _ => 0.0,
        };
        let max_length = match config.max_length {
            LengthBound::Absolute(n) => Some(n as f64),
            _ => None,
        };
        let reservoir = LengthReservoir::new(config.max_memory, rng);
        Self {
            config,
            reservoir,
            frequencies: TokenCounter::new(),
            min_length,
            max_length,
            most_common: None,
            fitted: false,
        }
    }

    /// Fits the filter to `documents`.
    ///
    /// This accumulates on top of any earlier fitting call exactly like
    /// [`Self::partial_fit`]; build a new filter for a clean fit.
    pub fn fit<I, D, T>(&mut self, documents: I) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.partial_fit(documents)
    }

    /// Fits the filter incrementally on a batch of tokenized documents.
    ///
    /// Every token is sampled into the length reservoir and counted, in document order then
    /// token order. Afterwards quantile length bounds are re-resolved from the reservoir and
    /// the most-common vocabulary is recomputed if a cap is configured.
    pub fn partial_fit<I, D, T>(&mut self, documents: I) -> &mut Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut num_tokens = 0u64;
        for document in documents {
            for token in document {
                let token = token.as_ref();
                self.reservoir.observe(token);
                self.frequencies.update_with_count(token, 1);
                num_tokens += 1;
            }
        }
        self.fitted = true;
        self.resolve_length_bounds();
        if let Some(max_features) = self.config.max_features {
            let vocabulary = self
                .frequencies
                .most_common(max_features)
                .into_iter()
                .map(|(token, _)| token.to_owned())
                .collect();
            self.most_common = Some(vocabulary);
        }
        debug!(
            num_tokens,
            num_seen = self.reservoir.num_seen(),
            distinct_tokens = self.frequencies.num_tokens(),
            min_length = self.min_length,
            max_length = ?self.max_length,
            "fitted token filter batch"
        );
        self
    }

    fn resolve_length_bounds(&mut self) {
        if !self.config.min_length.is_quantile() && !self.config.max_length.is_quantile() {
            return;
        }
        if self.reservoir.is_empty() {
            warn!("length quantiles requested before any token was observed; keeping defaults");
            return;
        }
        if let LengthBound::Quantile(q) = self.config.min_length {
            if let Some(value) = self.reservoir.quantile(q) {
                self.min_length = value;
            }
        }
        if let LengthBound::Quantile(q) = self.config.max_length {
            self.max_length = self.reservoir.quantile(q);
        }
    }
}

impl<R> TokenFilter<R> {
    /// Returns true if `token` passes every criterion.
    ///
    /// A token passes iff it is not denied, its length lies within the resolved bounds, its
    /// relative frequency lies within the frequency range, and it belongs to the most-common
    /// vocabulary when one is configured.
    pub fn passes(&self, token: &str) -> bool {
        if self.config.negative.contains(token) {
            return false;
        }
        let length = token.chars().count() as f64;
        if self.max_length.is_some_and(|max| length > max) {
            return false;
        }
        if length < self.min_length {
            return false;
        }
        let (lower, upper) = self.config.frequency_range;
        let frequency = self.frequencies.frequency(token);
        if frequency < lower || frequency > upper {
            return false;
        }
        match &self.most_common {
            Some(vocabulary) => vocabulary.contains(token),
            None => true,
        }
    }

    /// Removes the tokens that do not pass from every document.
    ///
    /// Document order and token order are preserved. The filter is not modified.
    pub fn transform<I, D, T>(&self, documents: I) -> Vec<Vec<String>>
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        documents
            .into_iter()
            .map(|document| {
                document
                    .into_iter()
                    .filter(|token| self.passes(token.as_ref()))
                    .map(|token| token.as_ref().to_owned())
                    .collect()
            })
            .collect()
    }

    /// Returns true once any fitting call has been made.
    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Returns the resolved minimum token length.
    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    /// Returns the resolved maximum token length, `None` if unbounded.
    pub fn max_length(&self) -> Option<f64> {
        self.max_length
    }

    /// Returns the relative frequency of `token` across all fitting calls.
    pub fn frequency(&self, token: &str) -> f64 {
        self.frequencies.frequency(token)
    }

    /// Returns the most-common vocabulary, `None` when no cap is configured.
    pub fn most_common(&self) -> Option<&HashSet<String>> {
        self.most_common.as_ref()
    }

    /// Returns the length reservoir.
    pub fn reservoir(&self) -> &LengthReservoir<R> {
        &self.reservoir
    }

    /// Returns the token counter.
    pub fn frequencies(&self) -> &TokenCounter {
        &self.frequencies
    }
}

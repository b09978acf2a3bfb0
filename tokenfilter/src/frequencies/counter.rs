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

use std::collections::HashMap;

/// Exact, insertion-ordered token counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
    total_weight: u64,
}

impl TokenCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no token has been counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of distinct tokens.
    pub fn num_tokens(&self) -> usize {
        self.entries.len()
    }

    /// Returns the sum of all counts.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the count for `token`, or zero if it was never seen.
    pub fn count(&self, token: &str) -> u64 {
        match self.index.get(token) {
            Some(&slot) => self.entries[slot].1,
            None => 0,
        }
    }

    /// Returns `count(token) / total_weight`, or zero when nothing has been counted.
    pub fn frequency(&self, token: &str) -> f64 {
        if self.total_weight == 0 {
            return 0.0;
        }
        self.count(token) as f64 / self.total_weight as f64
    }

    /// Increments the count of every token in `tokens` by one.
    pub fn update<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.update_with_count(token.as_ref(), 1);
        }
    }

    /// Adds `count` to the count of `token`.
    ///
    /// A count of zero is a no-op and does not register the token.
    pub fn update_with_count(&mut self, token: &str, count: u64) {
        if count == 0 {
            return;
        }
        self.total_weight += count;
        match self.index.get(token) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(token.to_owned(), self.entries.len());
                self.entries.push((token.to_owned(), count));
            }
        }
    }

    /// Returns up to `k` tokens with the highest counts, highest first.
    ///
    /// Ties are broken by first-insertion order.
    pub fn most_common(&self, k: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self.iter().collect();
        // stable: equal counts keep insertion order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// Returns an iterator over `(token, count)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries
            .iter()
            .map(|(token, count)| (token.as_str(), *count))
    }
}

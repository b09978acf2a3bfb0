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

use rand::Rng;

/// Reservoir sample of token lengths.
///
/// See [`crate::reservoir`] for the sampling guarantees.
#[derive(Debug, Clone)]
pub struct LengthReservoir<R> {
    capacity: usize,
    lengths: Vec<usize>,
    num_seen: u64,
    rng: R,
}

impl<R: Rng> LengthReservoir<R> {
    /// Creates an empty reservoir retaining at most `capacity` lengths.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, rng: R) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            capacity,
            lengths: Vec::new(),
            num_seen: 0,
            rng,
        }
    }

    /// Records the length of `token`, measured in Unicode scalar values.
    pub fn observe(&mut self, token: &str) {
        self.observe_length(token.chars().count());
    }

    /// Records a raw length.
    pub fn observe_length(&mut self, length: usize) {
        if self.num_seen < self.capacity as u64 {
            self.lengths.push(length);
        } else {
            let j = self.rng.random_range(0..=self.num_seen);
            if j < self.capacity as u64 {
                self.lengths[j as usize] = length;
            }
        }
        self.num_seen += 1;
    }

    /// Rebuilds a reservoir from a previously retained sample.
    pub(crate) fn from_parts(capacity: usize, lengths: Vec<usize>, num_seen: u64, rng: R) -> Self {
        debug_assert!(lengths.len() <= capacity);
        Self {
            capacity,
            lengths,
            num_seen,
            rng,
        }
    }
}

impl<R> LengthReservoir<R> {
    /// Returns the maximum number of retained lengths.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of retained lengths, `min(num_seen, capacity)`.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Returns true if nothing has been observed.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Returns the number of lengths observed since construction.
    ///
    /// This is not bounded by the capacity.
    pub fn num_seen(&self) -> u64 {
        self.num_seen
    }

    /// Returns the retained sample in slot order.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Returns the `q`-th quantile of the retained lengths, or `None` if the reservoir is empty.
    ///
    /// Uses linear interpolation between the order statistics around `q * (len - 1)`.
    /// `q` is clamped into `[0, 1]`.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        if self.lengths.is_empty() {
            return None;
        }
        let mut sorted = self.lengths.clone();
        sorted.sort_unstable();
        Some(interpolate(&sorted, q))
    }
}

fn interpolate(sorted: &[usize], q: f64) -> f64 {
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let below = sorted[lo] as f64;
    let above = sorted[hi] as f64;
    below + (above - below) * (rank - lo as f64)
}

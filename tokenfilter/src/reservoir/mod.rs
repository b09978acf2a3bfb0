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

//! Bounded-memory reservoir of token lengths for quantile estimation.
//!
//! # Overview
//!
//! The reservoir keeps a uniform random sample, without replacement, of the lengths of all
//! tokens observed so far. It implements the classic "Algorithm R": the first `capacity`
//! lengths are stored verbatim, and the `n`-th length after that (zero based) replaces a
//! random slot with probability `capacity / (n + 1)`. By induction on arrival order every
//! observed token is represented with equal probability `capacity / num_seen`.
//!
//! Quantiles are computed from the retained sample with linear interpolation between
//! adjacent order statistics, the same definition used by the common interpolated
//! percentile functions.
//!
//! # Randomness
//!
//! The sampler owns its random source. Any [`rand::Rng`] can be injected, which makes
//! sampling reproducible under a fixed seed.
//!
//! # Examples
//!
//! ```
//! # use rand::SeedableRng;
//! # use rand::rngs::StdRng;
//! # use tokenfilter::reservoir::LengthReservoir;
//! let mut reservoir = LengthReservoir::new(4, StdRng::seed_from_u64(7));
//! for token in ["a", "bb", "ccc"] {
//!     reservoir.observe(token);
//! }
//! assert_eq!(reservoir.len(), 3);
//! assert_eq!(reservoir.quantile(0.5), Some(2.0));
//! ```

mod sampler;

pub use self::sampler::LengthReservoir;

/// Reservoir capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 5000;

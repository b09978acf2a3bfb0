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

//! Exact token frequency counting.
//!
//! # Overview
//!
//! [`TokenCounter`] keeps an exact count per distinct token, accumulated monotonically across
//! updates. Counts are never decremented. Derived quantities:
//! * the total weight, which is the sum of all counts;
//! * the relative frequency of a token, `count / total_weight`, which is zero for unseen tokens
//!   and for an empty counter;
//! * the `k` most common tokens.
//!
//! Unlike the approximate heavy-hitter sketches, the counter stores every distinct token, so
//! its memory grows with the vocabulary rather than with a configured map size.
//!
//! # Ordering
//!
//! Tokens are remembered in first-insertion order. [`TokenCounter::most_common`] breaks ties
//! on count by that order, so identical input always yields an identical ranking.
//!
//! # Examples
//!
//! ```
//! # use tokenfilter::frequencies::TokenCounter;
//! let mut counter = TokenCounter::new();
//! counter.update(["b", "a", "a", "b", "c"]);
//! assert_eq!(counter.count("a"), 2);
//! assert_eq!(counter.frequency("c"), 0.2);
//! assert_eq!(counter.most_common(2), vec![("b", 2), ("a", 2)]);
//! ```

mod counter;

pub use self::counter::TokenCounter;

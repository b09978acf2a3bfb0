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

//! Statistics-driven token filter.
//!
//! # Overview
//!
//! [`TokenFilter`] decides per token instance whether it passes down an embedding pipeline.
//! A token passes iff all of the following hold:
//! 1. it is not in the configured deny-list;
//! 2. its length is at most the resolved maximum length, or the maximum is unbounded;
//! 3. its length is at least the resolved minimum length;
//! 4. its relative frequency lies within the inclusive frequency range;
//! 5. no vocabulary cap is configured, or it is among the most common tokens.
//!
//! Token length is measured in Unicode scalar values.
//!
//! # Fitting
//!
//! [`TokenFilter::partial_fit`] feeds every token of a batch into a
//! [`LengthReservoir`](crate::reservoir::LengthReservoir) and a
//! [`TokenCounter`](crate::frequencies::TokenCounter). Length bounds configured as
//! [`LengthBound::Quantile`] are re-resolved from the reservoir after every batch, so they can
//! drift as more data is seen. Until the first token is observed they keep their defaults:
//! zero for the minimum and unbounded for the maximum.
//!
//! State only accumulates. [`TokenFilter::fit`] behaves exactly like `partial_fit` and does
//! not reset earlier batches. Before any fitting call every token has frequency zero, so a
//! positive frequency lower bound rejects everything until the filter is fitted.
//!
//! [`TokenFilter::transform`] never mutates the filter.
//!
//! # Concurrency
//!
//! Fitting takes `&mut self` and transforming takes `&self`, so concurrent transforms are
//! allowed while fitting requires exclusive access.
//!
//! # Examples
//!
//! ```
//! # use tokenfilter::filter::LengthBound;
//! # use tokenfilter::filter::TokenFilter;
//! let mut filter = TokenFilter::builder()
//!     .negative(["the"])
//!     .length_range(LengthBound::Absolute(2), LengthBound::Quantile(0.9))
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! filter.partial_fit([["the", "cat", "sat"], ["on", "the", "mat"]]);
//! let filtered = filter.transform([["the", "cat", "a"]]);
//! assert_eq!(filtered, vec![vec!["cat".to_string()]]);
//! ```
//!
//! # Serialization
//!
//! ```
//! # use tokenfilter::filter::TokenFilter;
//! let mut filter = TokenFilter::builder().max_features(1).seed(1).build().unwrap();
//! filter.fit([["a", "a", "b"]]);
//!
//! let bytes = filter.serialize();
//! let restored = TokenFilter::deserialize(&bytes).unwrap();
//! assert!(restored.passes("a"));
//! assert!(!restored.passes("b"));
//! ```

mod config;
mod serialization;
mod sketch;

pub use self::config::FilterConfig;
pub use self::config::LengthBound;
pub use self::config::TokenFilterBuilder;
pub use self::sketch::TokenFilter;

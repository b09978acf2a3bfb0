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

//! A streaming, statistics-driven token filter for embedding pipelines.
//!
//! The filter removes tokens from already tokenized documents based on a deny-list, token
//! length bounds that are either absolute or learned as quantiles, relative frequency bounds,
//! and an optional cap on vocabulary size. It can be fitted in one shot or incrementally over
//! batches, using bounded memory for the length statistics.
//!
//! * [`filter`] holds [`filter::TokenFilter`] and its configuration.
//! * [`reservoir`] samples token lengths for quantile estimation.
//! * [`frequencies`] counts tokens exactly.
//! * [`stage`] is the fit/transform contract an embedding pipeline drives.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod error;
pub mod filter;
pub mod frequencies;
pub mod reservoir;
pub mod stage;

mod codec;

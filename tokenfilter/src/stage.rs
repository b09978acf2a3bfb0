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

//! Fit/transform contract shared by pipeline stages.
//!
//! An embedding pipeline drives its stages in sequence: each stage is fitted on a batch and
//! its transformed output feeds the next stage. [`Stage`] is the surface such a pipeline
//! needs from a stage that maps tokenized documents to tokenized documents.

use rand::Rng;

use crate::error::Error;
use crate::filter::TokenFilter;

/// A batch of tokenized documents.
pub type Documents = Vec<Vec<String>>;

/// A fit/transform pipeline stage over tokenized documents.
pub trait Stage {
    /// Fits the stage on a batch, accumulating with earlier batches where supported.
    fn partial_fit(&mut self, documents: &[Vec<String>]) -> Result<(), Error>;

    /// Fits the stage on a full corpus.
    fn fit(&mut self, documents: &[Vec<String>]) -> Result<(), Error> {
        self.partial_fit(documents)
    }

    /// Maps a batch to the stage's output without modifying the stage.
    fn transform(&self, documents: &[Vec<String>]) -> Result<Documents, Error>;

    /// Fits on a batch, then transforms the same batch.
    fn partial_fit_transform(&mut self, documents: &[Vec<String>]) -> Result<Documents, Error> {
        self.partial_fit(documents)?;
        self.transform(documents)
    }
}

impl<R: Rng> Stage for TokenFilter<R> {
    fn partial_fit(&mut self, documents: &[Vec<String>]) -> Result<(), Error> {
        TokenFilter::partial_fit(self, documents);
        Ok(())
    }

    fn transform(&self, documents: &[Vec<String>]) -> Result<Documents, Error> {
        Ok(TokenFilter::transform(self, documents))
    }
}

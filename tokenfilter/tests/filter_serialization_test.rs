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

mod common;

use common::docs;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokenfilter::error::ErrorKind;
use tokenfilter::filter::LengthBound;
use tokenfilter::filter::TokenFilter;

fn fitted_filter() -> TokenFilter {
    let mut filter = TokenFilter::builder()
        .negative(["the", "of"])
        .length_range(LengthBound::Quantile(0.1), LengthBound::Quantile(0.95))
        .frequency_range(0.0, 0.5)
        .max_features(4)
        .max_memory(6)
        .seed(42)
        .build()
        .unwrap();
    filter.partial_fit(&docs(&[
        &["the", "quick", "brown", "fox"],
        &["jumps", "over", "the", "lazy", "dog"],
    ]));
    filter.partial_fit(&docs(&[&["a", "tale", "of", "two", "cities", "ñandú"]]));
    filter
}

#[test]
fn test_round_trip_fitted() {
    let filter = fitted_filter();
    let bytes = filter.serialize();
    let restored = TokenFilter::deserialize_with_rng(&bytes, StdRng::seed_from_u64(7)).unwrap();

    assert!(restored.is_fitted());
    assert_eq!(restored.config(), filter.config());
    assert_eq!(restored.min_length(), filter.min_length());
    assert_eq!(restored.max_length(), filter.max_length());
    assert_eq!(restored.most_common(), filter.most_common());
    assert_eq!(restored.frequencies(), filter.frequencies());
    assert_eq!(restored.reservoir().lengths(), filter.reservoir().lengths());
    assert_eq!(restored.reservoir().num_seen(), 15);
    assert_eq!(restored.reservoir().capacity(), 6);

    let input = docs(&[&["the", "fox", "a", "cities", "unseen"]]);
    assert_eq!(restored.transform(&input), filter.transform(&input));
    assert_eq!(restored.serialize(), bytes);
}

#[test]
fn test_round_trip_unfitted() {
    let filter = TokenFilter::builder().seed(1).build().unwrap();
    let bytes = filter.serialize();
    let restored = TokenFilter::deserialize(&bytes).unwrap();
    assert!(!restored.is_fitted());
    assert!(restored.reservoir().is_empty());
    assert!(restored.frequencies().is_empty());
    assert_eq!(restored.max_length(), None);
    assert!(restored.most_common().is_none());
    assert_eq!(restored.config(), filter.config());
}

#[test]
fn test_restored_filter_keeps_fitting() {
    let filter = fitted_filter();
    let mut restored = TokenFilter::deserialize(&filter.serialize()).unwrap();
    restored.partial_fit([["fox", "fox"]]);
    assert_eq!(restored.frequencies().count("fox"), 3);
    assert_eq!(restored.reservoir().num_seen(), 17);
    assert_eq!(restored.reservoir().len(), 6);
}

#[test]
fn test_truncated_images_are_rejected() {
    let bytes = fitted_filter().serialize();
    for len in 0..bytes.len() {
        let err = TokenFilter::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData, "prefix of {len} bytes");
        assert!(
            err.message().contains("insufficient data"),
            "prefix of {len} bytes: {err}"
        );
    }
}

#[test]
fn test_wrong_family_is_rejected() {
    let mut bytes = fitted_filter().serialize();
    bytes[2] = 10;
    let err = TokenFilter::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.message().contains("invalid family"), "{err}");
}

#[test]
fn test_wrong_serial_version_is_rejected() {
    let mut bytes = fitted_filter().serialize();
    bytes[1] = 9;
    let err = TokenFilter::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.message().contains("serial version"), "{err}");
}

#[test]
fn test_unknown_bound_kind_is_rejected() {
    let mut bytes = fitted_filter().serialize();
    bytes[3] = 7;
    let err = TokenFilter::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.message().contains("length bound kind"), "{err}");
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let filter = TokenFilter::builder()
        .min_length(LengthBound::Quantile(0.5))
        .seed(1)
        .build()
        .unwrap();
    let mut bytes = filter.serialize();
    // lower bound value starts right after the 8-byte preamble
    bytes[8..16].copy_from_slice(&2.5f64.to_bits().to_le_bytes());
    let err = TokenFilter::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.message().contains("invalid configuration"), "{err}");
}

const FLAGS_BYTE: usize = 5;
const FLAG_HAS_MAX_LENGTH: u8 = 1 << 2;
const FLAG_HAS_MOST_COMMON: u8 = 1 << 3;
const RESOLVED_MIN_OFFSET: usize = 56;
const RESOLVED_MAX_OFFSET: usize = 64;
// u64 count, u64 length prefix, one-byte token
const SINGLE_TOKEN_VOCABULARY_LEN: usize = 17;

fn append_vocabulary(bytes: &mut Vec<u8>, tokens: &[&str]) {
    bytes.extend_from_slice(&(tokens.len() as u64).to_le_bytes());
    for token in tokens {
        bytes.extend_from_slice(&(token.len() as u64).to_le_bytes());
        bytes.extend_from_slice(token.as_bytes());
    }
}

fn capped_image() -> Vec<u8> {
    let mut filter = TokenFilter::builder()
        .max_features(1)
        .seed(1)
        .build()
        .unwrap();
    filter.fit([["a", "a", "b"]]);
    let mut bytes = filter.serialize();
    bytes.truncate(bytes.len() - SINGLE_TOKEN_VOCABULARY_LEN);
    bytes
}

fn assert_inconsistent(bytes: &[u8], needle: &str) {
    let err = TokenFilter::deserialize(bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    assert!(err.message().contains(needle), "{err}");
}

#[test]
fn test_capped_image_tail_is_vocabulary() {
    let mut bytes = capped_image();
    append_vocabulary(&mut bytes, &["a"]);
    let restored = TokenFilter::deserialize(&bytes).unwrap();
    assert!(restored.passes("a"));
    assert!(!restored.passes("b"));
    assert_eq!(restored.serialize(), bytes);
}

#[test]
fn test_vocabulary_without_max_features_is_rejected() {
    let mut filter = TokenFilter::builder().seed(1).build().unwrap();
    filter.fit([["a", "b"]]);
    let mut bytes = filter.serialize();
    bytes[FLAGS_BYTE] |= FLAG_HAS_MOST_COMMON;
    append_vocabulary(&mut bytes, &["a"]);
    assert_inconsistent(&bytes, "without max_features");
}

#[test]
fn test_missing_vocabulary_on_fitted_capped_filter_is_rejected() {
    let mut bytes = capped_image();
    bytes[FLAGS_BYTE] &= !FLAG_HAS_MOST_COMMON;
    assert_inconsistent(&bytes, "vocabulary missing");
}

#[test]
fn test_vocabulary_larger_than_max_features_is_rejected() {
    let mut bytes = capped_image();
    append_vocabulary(&mut bytes, &["a", "b"]);
    assert_inconsistent(&bytes, "max_features is 1");
}

#[test]
fn test_vocabulary_token_missing_from_table_is_rejected() {
    let mut bytes = capped_image();
    append_vocabulary(&mut bytes, &["zzz"]);
    assert_inconsistent(&bytes, "missing from frequency table");
}

#[test]
fn test_dropped_absolute_max_is_rejected() {
    let mut filter = TokenFilter::builder()
        .max_length(LengthBound::Absolute(3))
        .seed(1)
        .build()
        .unwrap();
    filter.fit([["abc", "abcdef"]]);
    let mut bytes = filter.serialize();
    bytes[FLAGS_BYTE] &= !FLAG_HAS_MAX_LENGTH;
    assert_inconsistent(&bytes, "resolved maximum length");
}

#[test]
fn test_absolute_max_with_other_resolved_value_is_rejected() {
    let filter = TokenFilter::builder()
        .max_length(LengthBound::Absolute(3))
        .seed(1)
        .build()
        .unwrap();
    let mut bytes = filter.serialize();
    bytes[RESOLVED_MAX_OFFSET..RESOLVED_MAX_OFFSET + 8].copy_from_slice(&10.0f64.to_le_bytes());
    assert_inconsistent(&bytes, "resolved maximum length");
}

#[test]
fn test_absolute_min_with_other_resolved_value_is_rejected() {
    let filter = TokenFilter::builder()
        .min_length(LengthBound::Absolute(2))
        .seed(1)
        .build()
        .unwrap();
    let mut bytes = filter.serialize();
    bytes[RESOLVED_MIN_OFFSET..RESOLVED_MIN_OFFSET + 8].copy_from_slice(&0.0f64.to_le_bytes());
    assert_inconsistent(&bytes, "resolved minimum length");
}

#[test]
fn test_unbounded_max_with_resolved_value_is_rejected() {
    let filter = TokenFilter::builder().seed(1).build().unwrap();
    let mut bytes = filter.serialize();
    bytes[FLAGS_BYTE] |= FLAG_HAS_MAX_LENGTH;
    assert_inconsistent(&bytes, "resolved maximum length");
}

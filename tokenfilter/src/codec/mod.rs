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

//! Little-endian byte cursors used by the serialized filter image.

mod assert;
mod family;

pub(crate) use self::assert::ensure_preamble_longs_in;
pub(crate) use self::assert::ensure_serial_version_is;
pub(crate) use self::assert::insufficient_data;
pub(crate) use self::family::Family;

use std::io;

/// Growable output buffer for building a serialized image.
#[derive(Debug, Default)]
pub(crate) struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u64_le(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f64_le(&mut self, value: f64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a string as a `u64` byte length followed by its UTF-8 payload.
    pub fn write_str(&mut self, value: &str) {
        self.write_u64_le(value.len() as u64);
        self.bytes.extend_from_slice(value.as_bytes());
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Read cursor over a serialized image.
///
/// Every read is bounds-checked and fails with [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub(crate) struct SketchSlice<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SketchSlice<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_exact(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        let bytes = self.read_exact(1)?;
        Ok(bytes[0])
    }

    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.read_exact(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_f64_le(&mut self) -> io::Result<f64> {
        self.read_u64_le().map(f64::from_bits)
    }

    /// Reads a string written by [`SketchBytes::write_str`].
    pub fn read_str(&mut self) -> io::Result<&'a str> {
        let len = self.read_u64_le()?;
        let len = usize::try_from(len)
            .map_err(|_| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        let payload = self.read_exact(len)?;
        std::str::from_utf8(payload)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

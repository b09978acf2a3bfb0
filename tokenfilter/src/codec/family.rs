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

use crate::error::Error;

/// Identifies the kind of structure stored in a serialized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Family {
    pub id: u8,
    pub name: &'static str,
}

impl Family {
    /// The token filter image.
    pub const TOKEN_FILTER: Family = Family {
        id: 40,
        name: "TokenFilter",
    };

    pub fn validate_id(&self, family_id: u8) -> Result<(), Error> {
        if family_id == self.id {
            Ok(())
        } else {
            Err(Error::invalid_family(self.id, family_id, self.name))
        }
    }
}

/*
 * get_bug.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Bugwire, a Bugzilla client library.
 *
 * Bugwire is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Bugwire is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Bugwire.  If not, see <http://www.gnu.org/licenses/>.
 */

//! `Bug.get` for a single bug.

use crate::bug::{bugs_from_result, Bug};
use crate::error::BugzillaError;
use crate::method::{BugzillaMethod, ResultMap};
use crate::protocol::xmlrpc::{Struct, Value};

const METHOD: &str = "Bug.get";

#[derive(Debug, Clone)]
pub struct GetBug {
    params: Struct,
    result: ResultMap,
}

impl GetBug {
    pub fn new(id: i32) -> Self {
        Self::with_ids(Value::from(id))
    }

    pub fn by_alias(alias: &str) -> Self {
        Self::with_ids(Value::from(alias))
    }

    fn with_ids(ids: Value) -> Self {
        let mut params = Struct::new();
        params.insert("ids".to_string(), ids);
        Self {
            params,
            result: ResultMap::default(),
        }
    }

    /// The bug, or None when the server returned no bugs (or the call has not run).
    pub fn bug(&self) -> Result<Option<Bug>, BugzillaError> {
        Ok(bugs_from_result(&self.result)?.into_iter().next())
    }
}

impl BugzillaMethod for GetBug {
    fn method_name(&self) -> &'static str {
        METHOD
    }

    fn parameter_map(&self) -> &Struct {
        &self.params
    }

    fn set_result_map(&mut self, result: ResultMap) {
        self.result = result;
    }
}

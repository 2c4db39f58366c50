/*
 * version.rs
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

use crate::method::{BugzillaMethod, ResultMap};
use crate::protocol::xmlrpc::{Struct, Value};

/// `Bugzilla.version`: release of the installation.
#[derive(Debug, Clone, Default)]
pub struct BugzillaVersion {
    params: Struct,
    result: ResultMap,
}

impl BugzillaVersion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> Option<String> {
        self.result.get("version").and_then(Value::to_plain_string)
    }
}

impl BugzillaMethod for BugzillaVersion {
    fn method_name(&self) -> &'static str {
        "Bugzilla.version"
    }

    fn parameter_map(&self) -> &Struct {
        &self.params
    }

    fn set_result_map(&mut self, result: ResultMap) {
        self.result = result;
    }
}

/*
 * bug.rs
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

//! Bug records: [`Bug`] from the XML-RPC API, [`HttpBug`] from scraped result pages.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::BugzillaError;
use crate::method::ResultMap;
use crate::protocol::xmlrpc::{Struct, Value};

/// Timestamp format of the "Changed" and "Opened" columns on bug lists.
pub const PAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A bug as returned by `Bug.get` / `Bug.search`. Always has an id and a version.
#[derive(Debug, Clone, PartialEq)]
pub struct Bug {
    fields: Struct,
}

impl Bug {
    /// Build from a bug struct. Old servers only report the version under `internals`; it is
    /// lifted to the top level as text.
    pub fn from_struct(mut fields: Struct) -> Result<Self, BugzillaError> {
        if !fields.contains_key("id") {
            return Err(BugzillaError::InvalidResult("bug has no id".to_string()));
        }
        if !fields.contains_key("version") {
            let version = fields
                .get("internals")
                .and_then(Value::as_struct)
                .and_then(|internals| internals.get("version"))
                .and_then(Value::to_plain_string)
                .ok_or_else(|| BugzillaError::InvalidResult("bug has no version".to_string()))?;
            fields.insert("version".to_string(), Value::String(version));
        }
        Ok(Self { fields })
    }

    pub fn id(&self) -> Option<i64> {
        self.fields.get("id").and_then(Value::as_i64)
    }

    pub fn version(&self) -> Option<String> {
        self.fields.get("version").and_then(Value::to_plain_string)
    }

    pub fn alias(&self) -> Option<&str> {
        self.text("alias")
    }

    pub fn summary(&self) -> Option<&str> {
        self.text("summary")
    }

    pub fn product(&self) -> Option<&str> {
        self.text("product")
    }

    pub fn component(&self) -> Option<&str> {
        self.text("component")
    }

    pub fn status(&self) -> Option<&str> {
        self.text("status")
    }

    pub fn resolution(&self) -> Option<&str> {
        self.text("resolution")
    }

    pub fn priority(&self) -> Option<&str> {
        self.text("priority")
    }

    pub fn severity(&self) -> Option<&str> {
        self.text("severity")
    }

    pub fn operating_system(&self) -> Option<&str> {
        self.text("op_sys")
    }

    pub fn platform(&self) -> Option<&str> {
        self.text("platform")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Struct {
        &self.fields
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Bugs under the `bugs` key of a result. A missing key reads as no bugs.
pub(crate) fn bugs_from_result(result: &ResultMap) -> Result<Vec<Bug>, BugzillaError> {
    let bugs = match result.get("bugs") {
        None => return Ok(Vec::new()),
        Some(value) => value
            .as_array()
            .ok_or_else(|| BugzillaError::InvalidResult("bugs is not an array".to_string()))?,
    };
    bugs.iter()
        .map(|bug| match bug {
            Value::Struct(fields) => Bug::from_struct(fields.clone()),
            _ => Err(BugzillaError::InvalidResult("bug is not a struct".to_string())),
        })
        .collect()
}

/// One row of a scraped bug list, keyed by normalized column name (`Id`, `DeltaTs`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBug {
    columns: BTreeMap<String, String>,
}

impl HttpBug {
    pub fn new(columns: BTreeMap<String, String>) -> Self {
        Self { columns }
    }

    pub fn id(&self) -> Option<&str> {
        self.get("Id")
    }

    /// Last change time. None when the column is absent or not in `YYYY-MM-DD HH:MM:SS` form.
    pub fn delta_ts(&self) -> Option<NaiveDateTime> {
        let text = self.get("DeltaTs")?;
        match NaiveDateTime::parse_from_str(text.trim(), PAGE_TIMESTAMP_FORMAT) {
            Ok(ts) => Some(ts),
            Err(e) => {
                tracing::debug!(value = text, error = %e, "unparsable DeltaTs");
                None
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    pub fn columns(&self) -> &BTreeMap<String, String> {
        &self.columns
    }
}

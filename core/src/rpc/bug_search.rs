/*
 * bug_search.rs
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

//! `Bug.search`.
//!
//! Each [`SearchQuery`] restricts one field. Two queries on the same field are sent as an
//! array, which the server reads as "any of".

use crate::bug::{bugs_from_result, Bug};
use crate::error::BugzillaError;
use crate::method::{BugzillaMethod, ResultMap};
use crate::protocol::xmlrpc::{Struct, Value};

const METHOD: &str = "Bug.search";

/// Search fields of `Bug.search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchLimiter {
    Owner,
    Reporter,
    Status,
    Resolution,
    Priority,
    Severity,
    Product,
    Component,
    OperatingSystem,
    Platform,
    Summary,
    Version,
    Alias,
    /// Only bugs changed at or after this `dateTime`.
    LastChangeTime,
    CreationTime,
    Limit,
    Offset,
}

impl SearchLimiter {
    pub fn name(&self) -> &'static str {
        match self {
            SearchLimiter::Owner => "assigned_to",
            SearchLimiter::Reporter => "reporter",
            SearchLimiter::Status => "status",
            SearchLimiter::Resolution => "resolution",
            SearchLimiter::Priority => "priority",
            SearchLimiter::Severity => "severity",
            SearchLimiter::Product => "product",
            SearchLimiter::Component => "component",
            SearchLimiter::OperatingSystem => "op_sys",
            SearchLimiter::Platform => "platform",
            SearchLimiter::Summary => "summary",
            SearchLimiter::Version => "version",
            SearchLimiter::Alias => "alias",
            SearchLimiter::LastChangeTime => "last_change_time",
            SearchLimiter::CreationTime => "creation_time",
            SearchLimiter::Limit => "limit",
            SearchLimiter::Offset => "offset",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    limiter: SearchLimiter,
    query: Value,
}

impl SearchQuery {
    pub fn new(limiter: SearchLimiter, query: impl Into<Value>) -> Self {
        Self {
            limiter,
            query: query.into(),
        }
    }

    pub fn limiter(&self) -> SearchLimiter {
        self.limiter
    }

    pub fn query(&self) -> &Value {
        &self.query
    }
}

#[derive(Debug, Clone)]
pub struct BugSearch {
    params: Struct,
    result: ResultMap,
}

impl BugSearch {
    /// At least one query is required.
    pub fn new(queries: impl IntoIterator<Item = SearchQuery>) -> Result<Self, BugzillaError> {
        let mut params = Struct::new();
        for query in queries {
            let key = query.limiter.name().to_string();
            let value = match params.remove(&key) {
                None => query.query,
                Some(Value::Array(mut values)) => {
                    values.push(query.query);
                    Value::Array(values)
                }
                Some(previous) => Value::Array(vec![previous, query.query]),
            };
            params.insert(key, value);
        }
        if params.is_empty() {
            return Err(BugzillaError::InvalidArgument(
                "At least one search query is required",
            ));
        }
        Ok(Self {
            params,
            result: ResultMap::default(),
        })
    }

    /// Matching bugs, empty before the call has run.
    pub fn search_results(&self) -> Result<Vec<Bug>, BugzillaError> {
        bugs_from_result(&self.result)
    }
}

impl BugzillaMethod for BugSearch {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_field_becomes_array() {
        let search = BugSearch::new([
            SearchQuery::new(SearchLimiter::Product, "Widgets"),
            SearchQuery::new(SearchLimiter::Status, "NEW"),
            SearchQuery::new(SearchLimiter::Status, "ASSIGNED"),
            SearchQuery::new(SearchLimiter::Status, "REOPENED"),
            SearchQuery::new(SearchLimiter::Limit, 50),
        ])
        .unwrap();
        let params = search.parameter_map();
        assert_eq!(params["product"], Value::from("Widgets"));
        assert_eq!(
            params["status"],
            Value::Array(vec![
                Value::from("NEW"),
                Value::from("ASSIGNED"),
                Value::from("REOPENED")
            ])
        );
        assert_eq!(params["limit"], Value::Int(50));
        assert_eq!(search.method_name(), "Bug.search");
    }

    #[test]
    fn no_queries_rejected() {
        assert!(matches!(
            BugSearch::new(Vec::new()),
            Err(BugzillaError::InvalidArgument(_))
        ));
    }

    #[test]
    fn results_apply_version_recovery() {
        let mut search =
            BugSearch::new([SearchQuery::new(SearchLimiter::Owner, "alice@example.com")]).unwrap();
        let mut internals = Struct::new();
        internals.insert("version".to_string(), Value::Double(3.0));
        let mut old = Struct::new();
        old.insert("id".to_string(), Value::Int(1));
        old.insert("internals".to_string(), Value::Struct(internals));
        let mut new = Struct::new();
        new.insert("id".to_string(), Value::Int(2));
        new.insert("version".to_string(), Value::from("2.0"));
        let mut result = Struct::new();
        result.insert(
            "bugs".to_string(),
            Value::Array(vec![Value::Struct(old), Value::Struct(new)]),
        );
        search.set_result_map(ResultMap::new(result));

        let bugs = search.search_results().unwrap();
        assert_eq!(bugs.len(), 2);
        assert_eq!(bugs[0].version().as_deref(), Some("3.0"));
        assert_eq!(bugs[1].version().as_deref(), Some("2.0"));
    }
}

/*
 * bug_list.rs
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

//! Advanced search via `buglist.cgi`, for installations whose custom columns
//! (`case_count`, `needinfo`, `cf_*`) are not reachable through `Bug.search`.
//!
//! The result table's `<col class="bz_<field>_column">` elements name the columns; the
//! field part becomes an [`HttpBug`] key in CamelCase (`bz_delta_ts_column` is `DeltaTs`).

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};

use crate::bug::HttpBug;
use crate::error::BugzillaError;
use crate::scrape::{selector, BugzillaHttpParser};

pub const START: &str = "buglistSorter";
pub const END: &str = "</table>";
pub const PATH: &str = "buglist.cgi";

const COLUMN_PREFIX: &str = "bz_";
const COLUMN_SUFFIX: &str = "_column";

/// Columns that can be requested in the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchColumn {
    CreationDate,
    LastUpdate,
    Severity,
    Priority,
    Status,
    CaseCount,
    Assigned,
    NeedInfo,
    Reporter,
    Category,
    Component,
    FixBy,
    Branch,
    Viss,
    Summary,
}

impl SearchColumn {
    pub fn name(&self) -> &'static str {
        match self {
            SearchColumn::CreationDate => "creation_ts",
            SearchColumn::LastUpdate => "delta_ts",
            SearchColumn::Severity => "bug_severity",
            SearchColumn::Priority => "priority",
            SearchColumn::Status => "bug_status",
            SearchColumn::CaseCount => "case_count",
            SearchColumn::Assigned => "assigned_to",
            SearchColumn::NeedInfo => "needinfo",
            SearchColumn::Reporter => "reporter",
            SearchColumn::Category => "category",
            SearchColumn::Component => "component",
            SearchColumn::FixBy => "fix_by",
            SearchColumn::Branch => "cf_branch",
            SearchColumn::Viss => "cf_viss",
            SearchColumn::Summary => "short_desc",
        }
    }
}

/// Query parameters understood by `buglist.cgi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchLimiter {
    /// E-mail address to match.
    AssignedTo,
    /// How the address matches (`substring`, `exact`, ...).
    EmailType,
    /// Match the address against the assignee.
    EmailAssigned,
    /// Match the address against the need-info flag.
    EmailNeedInfo,
    BugStatus,
    /// Comma-separated column list; set by [`BugSearchParser::set_search_columns`].
    BugProperties,
    QueryFormat,
}

impl SearchLimiter {
    pub fn name(&self) -> &'static str {
        match self {
            SearchLimiter::AssignedTo => "email1",
            SearchLimiter::EmailType => "emailtype1",
            SearchLimiter::EmailAssigned => "emailassigned_to1",
            SearchLimiter::EmailNeedInfo => "emailneedinfo1",
            SearchLimiter::BugStatus => "bug_status",
            SearchLimiter::BugProperties => "columnlist",
            SearchLimiter::QueryFormat => "query_format",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    limiter: SearchLimiter,
    query: String,
}

impl SearchQuery {
    pub fn new(limiter: SearchLimiter, query: impl Into<String>) -> Self {
        Self {
            limiter,
            query: query.into(),
        }
    }

    pub fn limiter(&self) -> SearchLimiter {
        self.limiter
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone)]
pub struct BugSearchParser {
    params: BTreeMap<String, String>,
    bugs: Vec<HttpBug>,
}

impl BugSearchParser {
    /// At least one query is required. A later query for the same limiter replaces an earlier one.
    pub fn new(queries: impl IntoIterator<Item = SearchQuery>) -> Result<Self, BugzillaError> {
        let mut params = BTreeMap::new();
        params.insert(
            SearchLimiter::QueryFormat.name().to_string(),
            "advanced".to_string(),
        );
        let mut any = false;
        for query in queries {
            params.insert(query.limiter.name().to_string(), query.query);
            any = true;
        }
        if !any {
            return Err(BugzillaError::InvalidArgument(
                "At least one search query is required",
            ));
        }
        Ok(Self {
            params,
            bugs: Vec::new(),
        })
    }

    /// Choose the result columns, in order.
    pub fn set_search_columns(&mut self, columns: &[SearchColumn]) -> Result<(), BugzillaError> {
        if columns.is_empty() {
            return Err(BugzillaError::InvalidArgument(
                "At least one search column is required",
            ));
        }
        let list = columns
            .iter()
            .map(SearchColumn::name)
            .collect::<Vec<_>>()
            .join(",");
        self.params
            .insert(SearchLimiter::BugProperties.name().to_string(), list);
        Ok(())
    }

    /// Rows of the last parsed page.
    pub fn results(&self) -> &[HttpBug] {
        &self.bugs
    }

    pub fn into_results(self) -> Vec<HttpBug> {
        self.bugs
    }
}

impl BugzillaHttpParser for BugSearchParser {
    fn start_of_parse(&self) -> &str {
        START
    }

    fn end_of_parse(&self) -> &str {
        END
    }

    fn extra_path(&self) -> &str {
        PATH
    }

    fn parameters(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    fn parse(&mut self, document: &Html) -> Result<(), BugzillaError> {
        let cols = selector("col")?;
        let rows = selector("tr")?;
        let cells = selector("td")?;

        let names: Vec<String> = document
            .select(&cols)
            .map(|col| column_name(col.value().attr("class").unwrap_or("")))
            .collect();

        let mut bugs = Vec::new();
        // first row holds the headers
        for (index, row) in document.select(&rows).enumerate().skip(1) {
            let row_cells: Vec<ElementRef<'_>> = row.select(&cells).collect();
            if row_cells.len() < names.len() {
                return Err(BugzillaError::Http(format!(
                    "row {} has {} cells but the table has {} columns",
                    index,
                    row_cells.len(),
                    names.len()
                )));
            }
            let columns = names
                .iter()
                .zip(&row_cells)
                .map(|(name, cell)| (name.clone(), cell_value(cell)))
                .collect();
            bugs.push(HttpBug::new(columns));
        }
        tracing::debug!(columns = names.len(), rows = bugs.len(), "parsed bug list");
        self.bugs = bugs;
        Ok(())
    }
}

/// `bz_creation_ts_column` -> `CreationTs`.
fn column_name(class: &str) -> String {
    let field = class.strip_prefix(COLUMN_PREFIX).unwrap_or(class);
    let field = field.strip_suffix(COLUMN_SUFFIX).unwrap_or(field);
    field.split('_').map(capitalize).collect()
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A cell led by a `<span>` carries its full value in the span's title (dates, truncated text).
fn cell_value(cell: &ElementRef<'_>) -> String {
    let first = cell.children().filter_map(ElementRef::wrap).next();
    match first {
        Some(child) if child.value().name() == "span" => {
            child.value().attr("title").unwrap_or("").to_string()
        }
        _ => {
            let text: String = cell.text().collect();
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        }
    }
}

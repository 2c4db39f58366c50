/*
 * scrape.rs
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

//! Contract for HTML page queries run through `BugzillaConnector::execute_http_request`.

use std::collections::BTreeMap;

use scraper::{Html, Selector};

use crate::error::BugzillaError;

/// A page on the installation that is fetched with GET and scraped.
///
/// Only the lines from the one containing `start_of_parse()` through the next one containing
/// `end_of_parse()` are handed to `parse`, as a parsed HTML document.
pub trait BugzillaHttpParser {
    fn start_of_parse(&self) -> &str;

    fn end_of_parse(&self) -> &str;

    /// Path relative to the installation root, e.g. `buglist.cgi`.
    fn extra_path(&self) -> &str;

    /// Query parameters, appended in map order.
    fn parameters(&self) -> &BTreeMap<String, String>;

    fn parse(&mut self, document: &Html) -> Result<(), BugzillaError>;
}

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector, BugzillaError> {
    Selector::parse(css).map_err(|e| BugzillaError::Http(format!("invalid selector {}: {:?}", css, e)))
}

/// `Cookie` header for page requests: each cookie followed by `"; "`. Empty when no cookies.
pub fn scrape_cookie_header(cookies: &[String]) -> String {
    cookies.iter().map(|c| format!("{}; ", c)).collect()
}

/*
 * lib.rs
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

//! Bugwire core: a session with a Bugzilla installation over two channels.
//!
//! - XML-RPC methods (`xmlrpc.cgi`) through [`BugzillaConnector::execute_method`], one type
//!   per method in [`rpc`].
//! - Scraped HTML pages (`buglist.cgi`, ...) through [`BugzillaConnector::execute_http_request`],
//!   one parser per page in [`pages`]. Only the marker-bounded fragment of a page is read.
//!
//! Login token and session cookies captured on the XML-RPC channel are carried to both.

pub mod bug;
pub mod config;
pub mod connector;
pub mod error;
pub mod fault;
pub mod fragment;
pub mod method;
pub mod net;
pub mod pages;
pub mod protocol;
pub mod rpc;
pub mod scrape;

pub use bug::{Bug, HttpBug};
pub use config::{ConfigError, ConnectorConfig};
pub use connector::BugzillaConnector;
pub use error::BugzillaError;
pub use fault::FaultKind;
pub use method::{BugzillaMethod, ResultMap};
pub use scrape::BugzillaHttpParser;

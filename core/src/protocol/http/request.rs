/*
 * request.rs
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

//! HTTP request: method, request target, headers, optional body.
//!
//! Built via RequestBuilder; sending is done by the connection (send with handler).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// HTTP request method. Bugzilla only needs POST (XML-RPC) and GET (pages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Head => "HEAD",
        }
    }
}

/// Mutable request builder: method, target (path + query), headers, body.
///
/// Add headers, optionally set body, then pass to `HttpConnection::send`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub method: Method,
    pub path: String,
    /// Header order is kept as added; `header` replaces an existing name case-insensitively.
    pub headers: Vec<(String, String)>,
    /// If set, body will be sent (chunked unless Content-Length is set).
    pub body: Option<Vec<u8>>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: String) -> Self {
        Self {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add or replace a header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Authorization: Basic base64(user:password)`.
    pub fn basic_auth(&mut self, user: &str, password: &str) -> &mut Self {
        let encoded = STANDARD.encode(format!("{}:{}", user, password));
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Set request body with a matching Content-Length.
    pub fn body(&mut self, data: Vec<u8>) -> &mut Self {
        self.header("Content-Length", data.len().to_string());
        self.body = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_replaces_case_insensitively() {
        let mut req = RequestBuilder::new(Method::Get, "/".to_string());
        req.header("Cookie", "a=1").header("cookie", "b=2");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("COOKIE"), Some("b=2"));
    }

    #[test]
    fn basic_auth_header() {
        let mut req = RequestBuilder::new(Method::Post, "/xmlrpc.cgi".to_string());
        req.basic_auth("Aladdin", "open sesame");
        assert_eq!(
            req.header_value("Authorization"),
            Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
        );
    }

    #[test]
    fn body_sets_content_length() {
        let mut req = RequestBuilder::new(Method::Post, "/".to_string());
        req.body(b"<x/>".to_vec());
        assert_eq!(req.header_value("Content-Length"), Some("4"));
    }
}

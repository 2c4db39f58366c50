/*
 * cookies.rs
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

//! Session-cookie transport.
//!
//! Wraps [`HttpTransport`]: every request carries the jar as one `Cookie` header and the first
//! response that sets cookies fills the jar. Once filled, the jar is never replaced.

use super::error::XmlRpcError;
use super::transport::{HttpTransport, XmlRpcClientConfig, XmlRpcTransport};
use crate::protocol::http::RequestBuilder;

/// `Cookie` header value for XML-RPC calls: each cookie followed by a comma.
pub fn rpc_cookie_header(cookies: &[String]) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(cookies.iter().map(|c| format!("{},", c)).collect())
}

#[derive(Debug, Default, Clone)]
pub struct CookieTransport {
    inner: HttpTransport,
    cookies: Vec<String>,
}

impl CookieTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing jar (carried over from a previous connection).
    pub fn with_cookies(cookies: Vec<String>) -> Self {
        Self {
            inner: HttpTransport::new(),
            cookies,
        }
    }

    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub fn into_cookies(self) -> Vec<String> {
        self.cookies
    }

    fn init_headers(&self, request: &mut RequestBuilder) {
        if let Some(value) = rpc_cookie_header(&self.cookies) {
            request.header("Cookie", value);
        }
    }

    fn capture<'a>(&mut self, set_cookies: impl Iterator<Item = &'a str>) {
        if !self.cookies.is_empty() {
            return;
        }
        self.cookies.extend(set_cookies.map(str::to_string));
        if !self.cookies.is_empty() {
            tracing::trace!(count = self.cookies.len(), "captured session cookies");
        }
    }
}

impl XmlRpcTransport for CookieTransport {
    async fn send_request(
        &mut self,
        config: &XmlRpcClientConfig,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, XmlRpcError> {
        let mut request = HttpTransport::build_request(config, body);
        self.init_headers(&mut request);
        let reply = self.inner.exchange(config, request).await?;
        // cookies are taken even from error responses
        self.capture(reply.header_values("Set-Cookie"));
        reply.into_body()
    }
}

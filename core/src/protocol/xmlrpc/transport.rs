/*
 * transport.rs
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

//! XML-RPC transports: one HTTP POST per call.

use std::future::Future;
use std::io;
use std::time::Duration;

use url::Url;

use super::error::XmlRpcError;
use crate::protocol::http::{
    request_target, HttpClient, Method, RequestBuilder, Response, ResponseHandler,
    DEFAULT_CONNECT_TIMEOUT,
};

pub const DEFAULT_USER_AGENT: &str = concat!("bugwire/", env!("CARGO_PKG_VERSION"));

/// Endpoint and HTTP-level settings of an XML-RPC client.
#[derive(Debug, Clone)]
pub struct XmlRpcClientConfig {
    pub server_url: Url,
    pub basic_user: Option<String>,
    pub basic_password: Option<String>,
    pub user_agent: String,
    pub connect_timeout: Duration,
}

impl XmlRpcClientConfig {
    pub fn new(server_url: Url) -> Self {
        Self {
            server_url,
            basic_user: None,
            basic_password: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Status, headers and body of one HTTP exchange.
#[derive(Debug)]
pub struct HttpReply {
    pub status: Response,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Values of every header with this name, case-insensitively, in arrival order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body when the status is 2xx.
    pub fn into_body(self) -> Result<Vec<u8>, XmlRpcError> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(XmlRpcError::Transport(format!(
                "HTTP server returned unexpected status: {}",
                self.status
            )))
        }
    }
}

/// Sends one encoded `<methodCall>` and returns the raw response body.
pub trait XmlRpcTransport {
    fn send_request(
        &mut self,
        config: &XmlRpcClientConfig,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, XmlRpcError>> + Send;
}

/// Collects a whole response.
#[derive(Default)]
struct CollectHandler {
    status: Option<Response>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseHandler for CollectHandler {
    fn ok(&mut self, response: Response) {
        self.status = Some(response);
    }

    fn error(&mut self, response: Response) {
        self.status = Some(response);
    }

    fn header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn start_body(&mut self) {}

    fn body_chunk(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
    }

    fn end_body(&mut self) {}

    fn complete(&mut self) {}

    fn failed(&mut self, error: &io::Error) {
        tracing::debug!(error = %error, "XML-RPC exchange failed");
    }
}

/// Plain HTTP transport: fresh connection per call, closed after the response.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }

    /// POST request for the endpoint carrying `body`.
    pub fn build_request(config: &XmlRpcClientConfig, body: Vec<u8>) -> RequestBuilder {
        let mut request = RequestBuilder::new(Method::Post, request_target(&config.server_url));
        request
            .header("Content-Type", "text/xml")
            .header("User-Agent", config.user_agent.as_str())
            .header("Connection", "close");
        if let Some(user) = &config.basic_user {
            request.basic_auth(user, config.basic_password.as_deref().unwrap_or(""));
        }
        request.body(body);
        request
    }

    /// Connect, send `request` and read the full response.
    pub async fn exchange(
        &self,
        config: &XmlRpcClientConfig,
        request: RequestBuilder,
    ) -> Result<HttpReply, XmlRpcError> {
        let mut conn = HttpClient::connect_url(&config.server_url, config.connect_timeout).await?;
        let mut handler = CollectHandler::default();
        let sent = conn.send(&request, &mut handler).await;
        conn.close().await;
        sent?;
        let status = handler
            .status
            .ok_or_else(|| XmlRpcError::Transport("no HTTP response".to_string()))?;
        tracing::debug!(url = %config.server_url, status = status.code, "XML-RPC response");
        Ok(HttpReply {
            status,
            headers: handler.headers,
            body: handler.body,
        })
    }
}

impl XmlRpcTransport for HttpTransport {
    async fn send_request(
        &mut self,
        config: &XmlRpcClientConfig,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, XmlRpcError> {
        let request = Self::build_request(config, body);
        self.exchange(config, request).await?.into_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> XmlRpcClientConfig {
        XmlRpcClientConfig::new(Url::parse("https://bugs.example.org/bz/xmlrpc.cgi").unwrap())
    }

    #[test]
    fn post_request_headers() {
        let request = HttpTransport::build_request(&config(), b"<x/>".to_vec());
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/bz/xmlrpc.cgi");
        assert_eq!(request.header_value("content-type"), Some("text/xml"));
        assert_eq!(request.header_value("Content-Length"), Some("4"));
        assert_eq!(request.header_value("Connection"), Some("close"));
        assert!(!request.has_header("Authorization"));
    }

    #[test]
    fn basic_auth_when_user_set() {
        let mut config = config();
        config.basic_user = Some("Aladdin".to_string());
        config.basic_password = Some("open sesame".to_string());
        let request = HttpTransport::build_request(&config, Vec::new());
        assert_eq!(
            request.header_value("Authorization"),
            Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
        );
    }

    #[test]
    fn error_status_is_transport_error() {
        let reply = HttpReply {
            status: Response::with_reason(500, "Internal Server Error"),
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(matches!(reply.into_body(), Err(XmlRpcError::Transport(_))));
    }
}

/*
 * client.rs
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

//! HTTP client: connect to a host, then use the connection to send requests with a callback handler.

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use url::Url;

use crate::net::http_client_config;
use crate::protocol::http::connection::{HttpConnection, HttpStream};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP client. `HttpClient::connect(host, port, use_tls, timeout)` returns a connection
/// that is then used to build and send requests.
pub struct HttpClient;

impl HttpClient {
    /// Connect to the given host and port, with a TLS handshake when `use_tls` is set.
    pub async fn connect(
        host: &str,
        port: u16,
        use_tls: bool,
        connect_timeout: Duration,
    ) -> io::Result<HttpConnection> {
        let tcp = timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TCP connect timed out"))??;

        if !use_tls {
            return Ok(HttpConnection::new(
                HttpStream::Plain(tcp),
                host.to_string(),
                port,
                false,
            ));
        }
        let server_name = ServerName::try_from(host)
            .map(|name| name.to_owned())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
        let connector = TlsConnector::from(http_client_config());
        let tls = timeout(connect_timeout, connector.connect(server_name, tcp))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TLS handshake timed out"))?
            .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e))?;
        Ok(HttpConnection::new(
            HttpStream::Tls(Box::new(tls)),
            host.to_string(),
            port,
            true,
        ))
    }

    /// Connect to the authority of an `http` or `https` URL.
    pub async fn connect_url(url: &Url, connect_timeout: Duration) -> io::Result<HttpConnection> {
        let use_tls = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported URL scheme: {}", other),
                ))
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "URL has no host"))?;
        // IPv6 literals come back bracketed
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let port = url
            .port_or_known_default()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "URL has no port"))?;
        Self::connect(host, port, use_tls, connect_timeout).await
    }
}

/// Request target (origin form) for a URL: path plus query.
pub fn request_target(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_target_keeps_query() {
        let url = Url::parse("https://bugs.example.org/bugzilla/buglist.cgi?a=1&b=x+y").unwrap();
        assert_eq!(request_target(&url), "/bugzilla/buglist.cgi?a=1&b=x+y");
    }

    #[test]
    fn request_target_without_query() {
        let url = Url::parse("http://bugs.example.org/xmlrpc.cgi").unwrap();
        assert_eq!(request_target(&url), "/xmlrpc.cgi");
    }

    #[tokio::test]
    async fn connect_url_rejects_other_schemes() {
        let url = Url::parse("ftp://bugs.example.org/").unwrap();
        let err = HttpClient::connect_url(&url, DEFAULT_CONNECT_TIMEOUT)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}

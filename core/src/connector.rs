/*
 * connector.rs
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

//! Session with one Bugzilla installation.
//!
//! The connector owns the XML-RPC client (with its cookie jar), the login token and the name
//! of the logged-in user. Structured calls go through [`BugzillaConnector::execute_method`];
//! page queries go through [`BugzillaConnector::execute_http_request`], which replays the
//! cookies captured on the XML-RPC channel so scraped pages see the same session.

use std::time::Duration;

use scraper::Html;
use url::Url;

use crate::config::ConnectorConfig;
use crate::error::BugzillaError;
use crate::fragment::FragmentHandler;
use crate::method::{BugzillaMethod, ResultMap};
use crate::protocol::http::{request_target, HttpClient, Method, RequestBuilder};
use crate::protocol::http::DEFAULT_CONNECT_TIMEOUT;
use crate::protocol::xmlrpc::{
    CookieTransport, Struct, Value, XmlRpcClient, XmlRpcClientConfig, DEFAULT_USER_AGENT,
};
use crate::scrape::{scrape_cookie_header, BugzillaHttpParser};

/// Path of the XML-RPC endpoint under the installation root.
pub const XMLRPC_ENDPOINT: &str = "xmlrpc.cgi";

const TOKEN_PARAM: &str = "Bugzilla_token";
const NOT_CONNECTED: &str = "Cannot execute a method without connecting!";

/// Redirects followed on the page channel before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Endpoint URL text for a host: `xmlrpc.cgi` is appended unless already there.
pub fn endpoint_for(host: &str) -> String {
    if host.ends_with(XMLRPC_ENDPOINT) {
        host.to_string()
    } else if host.ends_with('/') {
        format!("{}{}", host, XMLRPC_ENDPOINT)
    } else {
        format!("{}/{}", host, XMLRPC_ENDPOINT)
    }
}

fn parse_endpoint(host: &str) -> Result<Url, BugzillaError> {
    let endpoint = endpoint_for(host);
    let malformed = |reason: String| BugzillaError::Connection {
        url: endpoint.clone(),
        reason,
    };
    let url = Url::parse(&endpoint).map_err(|e| malformed(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(malformed(format!("unsupported scheme {}", other))),
    }
    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(malformed("no host".to_string()));
    }
    Ok(url)
}

pub struct BugzillaConnector {
    client: Option<XmlRpcClient<CookieTransport>>,
    token: Option<String>,
    user: Option<String>,
    connect_timeout: Duration,
    user_agent: String,
}

impl Default for BugzillaConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl BugzillaConnector {
    pub fn new() -> Self {
        Self {
            client: None,
            token: None,
            user: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Unconnected connector using the config's timeout and user agent.
    pub fn with_config(config: &ConnectorConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            user_agent: config.user_agent.clone(),
            ..Self::new()
        }
    }

    /// Connect to the installation at `host`, e.g. `https://bugzilla.example.org/`.
    ///
    /// `http_user`/`http_password` are for HTTP basic authentication in front of the
    /// installation, not the Bugzilla account (see [`crate::rpc::LogIn`]). Connecting again
    /// replaces the endpoint and credentials but keeps cookies and token. No network traffic
    /// happens here. On error the connector is left as it was.
    pub fn connect(
        &mut self,
        host: &str,
        http_user: Option<&str>,
        http_password: Option<&str>,
    ) -> Result<(), BugzillaError> {
        let server_url = parse_endpoint(host)?;
        let mut config = XmlRpcClientConfig::new(server_url);
        config.user_agent = self.user_agent.clone();
        config.connect_timeout = self.connect_timeout;
        if let Some(user) = http_user {
            config.basic_user = Some(user.to_string());
            config.basic_password = http_password.map(str::to_string);
        }
        let cookies = self
            .client
            .take()
            .map(|client| client.into_transport().into_cookies())
            .unwrap_or_default();
        tracing::info!(endpoint = %config.server_url, basic_auth = http_user.is_some(), "connected");
        self.client = Some(XmlRpcClient::new(config, CookieTransport::with_cookies(cookies)));
        Ok(())
    }

    /// Apply the config's timeout and user agent, then connect to its host.
    pub fn connect_with(&mut self, config: &ConnectorConfig) -> Result<(), BugzillaError> {
        let host = config.host.as_deref().ok_or_else(|| BugzillaError::Connection {
            url: String::new(),
            reason: "no host configured".to_string(),
        })?;
        let previous = (self.connect_timeout, self.user_agent.clone());
        self.connect_timeout = config.connect_timeout;
        self.user_agent = config.user_agent.clone();
        let connected = self.connect(
            host,
            config.http_user.as_deref(),
            config.http_password.as_deref(),
        );
        if connected.is_err() {
            (self.connect_timeout, self.user_agent) = previous;
        }
        connected
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// XML-RPC endpoint URL, once connected.
    pub fn host(&self) -> Option<&str> {
        self.client
            .as_ref()
            .map(|client| client.config().server_url.as_str())
    }

    /// Local part of the login name of the last successful login.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Replace the token sent as `Bugzilla_token`, e.g. one kept from an earlier session.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Session cookies captured from the XML-RPC channel.
    pub fn cookies(&self) -> &[String] {
        self.client
            .as_ref()
            .map(|client| client.transport().cookies())
            .unwrap_or(&[])
    }

    /// Run one XML-RPC method. The session token, when held, is sent as `Bugzilla_token`
    /// unless the method sets that parameter itself.
    pub async fn execute_method<M: BugzillaMethod + ?Sized>(
        &mut self,
        method: &mut M,
    ) -> Result<(), BugzillaError> {
        let client = self
            .client
            .as_mut()
            .ok_or(BugzillaError::IllegalState(NOT_CONNECTED))?;

        let mut params = Struct::new();
        if let Some(token) = &self.token {
            params.insert(TOKEN_PARAM.to_string(), Value::String(token.clone()));
        }
        params.extend(
            method
                .parameter_map()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let name = method.method_name();
        tracing::debug!(method = name, "executing method");
        let result = match client.execute(name, &[Value::Struct(params)]).await {
            Ok(result) => result,
            Err(e) => {
                let err = BugzillaError::from(e);
                tracing::warn!(method = name, code = ?err.fault_code(), error = %err, "method failed");
                return Err(err);
            }
        };
        let members = match result {
            Value::Struct(members) => members,
            _ => Struct::new(),
        };
        method.set_result_map(ResultMap::new(members));

        if let Some(login) = method.as_login() {
            self.user = login
                .login()
                .map(|name| name.split('@').next().unwrap_or(name).to_string());
            self.token = login.token();
            tracing::debug!(user = ?self.user, token = self.token.is_some(), "logged in");
        }
        Ok(())
    }

    /// Fetch a page, cut out the parser's fragment and hand it to the parser.
    ///
    /// Redirects are followed while they keep the scheme, up to [`MAX_REDIRECTS`] of them; the
    /// cookie header goes to every hop.
    pub async fn execute_http_request<P: BugzillaHttpParser + ?Sized>(
        &mut self,
        parser: &mut P,
    ) -> Result<(), BugzillaError> {
        let client = self
            .client
            .as_ref()
            .ok_or(BugzillaError::IllegalState(NOT_CONNECTED))?;
        let url = page_url(&client.config().server_url, parser)?;
        let cookie = scrape_cookie_header(client.transport().cookies());
        tracing::debug!(url = %url, "requesting page");

        let fragment = match self
            .fetch_fragment(&url, &cookie, parser.start_of_parse(), parser.end_of_parse())
            .await
        {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "page request failed");
                return Err(e);
            }
        };
        parse_fragment(parser, &fragment)
    }

    /// GET the page and extract the fragment, following up to [`MAX_REDIRECTS`] redirects
    /// that keep the URL scheme.
    async fn fetch_fragment(
        &self,
        url: &Url,
        cookie: &str,
        start: &str,
        end: &str,
    ) -> Result<String, BugzillaError> {
        let mut url = url.clone();
        for _ in 0..=MAX_REDIRECTS {
            let handler = self.fetch_page(&url, cookie, start, end).await?;
            let location = handler.redirect_location().map(str::to_string);
            let Some(location) = location else {
                return handler.finish();
            };
            let next = url
                .join(&location)
                .map_err(|e| BugzillaError::Http(format!("bad redirect {}: {}", location, e)))?;
            if next.scheme() != url.scheme() {
                return Err(BugzillaError::Http(format!(
                    "refusing redirect from {} to {}",
                    url, next
                )));
            }
            tracing::debug!(from = %url, to = %next, "following redirect");
            url = next;
        }
        Err(BugzillaError::Http(format!(
            "more than {} redirects",
            MAX_REDIRECTS
        )))
    }

    async fn fetch_page(
        &self,
        url: &Url,
        cookie: &str,
        start: &str,
        end: &str,
    ) -> Result<FragmentHandler, BugzillaError> {
        let http_err = |e: std::io::Error| BugzillaError::Http(e.to_string());
        let mut conn = HttpClient::connect_url(url, self.connect_timeout)
            .await
            .map_err(http_err)?;
        let mut request = RequestBuilder::new(Method::Get, request_target(url));
        request
            .header("Cookie", cookie)
            .header("User-Agent", self.user_agent.as_str())
            .header("Connection", "close");
        let mut handler = FragmentHandler::new(start, end);
        let sent = conn.send(&request, &mut handler).await;
        conn.close().await;
        sent.map_err(http_err)?;
        Ok(handler)
    }
}

/// Page URL: the parser's path resolved against the endpoint's directory, plus query pairs.
fn page_url<P: BugzillaHttpParser + ?Sized>(endpoint: &Url, parser: &P) -> Result<Url, BugzillaError> {
    let mut url = endpoint
        .join(parser.extra_path())
        .map_err(|e| BugzillaError::Http(e.to_string()))?;
    let params = parser.parameters();
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

fn parse_fragment<P: BugzillaHttpParser + ?Sized>(
    parser: &mut P,
    fragment: &str,
) -> Result<(), BugzillaError> {
    let document = Html::parse_document(fragment);
    parser.parse(&document).map_err(|e| {
        tracing::warn!(error = %e, "page parse failed");
        if matches!(e, BugzillaError::Http(_)) {
            e
        } else {
            BugzillaError::Http(e.to_string())
        }
    })
}

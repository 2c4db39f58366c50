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

//! XML-RPC client over a pluggable transport.

use super::error::XmlRpcError;
use super::parser::{parse_method_response, MethodResponse};
use super::transport::{XmlRpcClientConfig, XmlRpcTransport};
use super::value::Value;
use super::writer::write_method_call;

pub struct XmlRpcClient<T: XmlRpcTransport> {
    config: XmlRpcClientConfig,
    transport: T,
}

impl<T: XmlRpcTransport> XmlRpcClient<T> {
    pub fn new(config: XmlRpcClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &XmlRpcClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Invoke `method` with positional `params`. A `<fault>` answer becomes `XmlRpcError::Fault`.
    pub async fn execute(&mut self, method: &str, params: &[Value]) -> Result<Value, XmlRpcError> {
        let body = write_method_call(method, params)?;
        tracing::debug!(method, url = %self.config.server_url, "XML-RPC call");
        let response = self.transport.send_request(&self.config, body).await?;
        match parse_method_response(&response)? {
            MethodResponse::Success(value) => Ok(value),
            MethodResponse::Fault { code, message } => Err(XmlRpcError::Fault { code, message }),
        }
    }
}

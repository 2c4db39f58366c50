/*
 * error.rs
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

//! Errors surfaced by the connector and the method/page types.

use thiserror::Error;

use crate::fault::FaultKind;
use crate::protocol::xmlrpc::XmlRpcError;

#[derive(Debug, Error)]
pub enum BugzillaError {
    /// The host given to `connect` is not a usable http/https URL.
    #[error("Host URL is malformed; URL supplied was {url}: {reason}")]
    Connection { url: String, reason: String },
    /// Call made before a successful `connect`.
    #[error("{0}")]
    IllegalState(&'static str),
    /// Fault or transport failure on the XML-RPC channel. `code` is set when the server sent a fault.
    #[error("{message}")]
    Rpc { code: Option<i32>, message: String },
    /// Any failure on the page channel.
    #[error("{0}")]
    Http(String),
    #[error("invalid result: {0}")]
    InvalidResult(String),
    /// Rejected constructor or setter argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl BugzillaError {
    /// Fault code sent by the server, if this is an RPC fault.
    pub fn fault_code(&self) -> Option<i32> {
        match self {
            BugzillaError::Rpc { code, .. } => *code,
            _ => None,
        }
    }

    pub fn fault_kind(&self) -> Option<FaultKind> {
        self.fault_code().map(FaultKind::from_code)
    }
}

impl From<XmlRpcError> for BugzillaError {
    fn from(e: XmlRpcError) -> Self {
        match e {
            XmlRpcError::Fault { code, message } => BugzillaError::Rpc {
                code: Some(code),
                message,
            },
            other => BugzillaError::Rpc {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

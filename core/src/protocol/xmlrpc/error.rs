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

//! XML-RPC client errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlRpcError {
    /// Connection, TLS, I/O or unexpected HTTP status.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a `<fault>`.
    #[error("{message}")]
    Fault { code: i32, message: String },
    #[error("invalid XML-RPC response: {0}")]
    Parse(String),
    #[error("failed to encode XML-RPC request: {0}")]
    Encode(String),
}

impl XmlRpcError {
    pub fn fault_code(&self) -> Option<i32> {
        match self {
            XmlRpcError::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<io::Error> for XmlRpcError {
    fn from(e: io::Error) -> Self {
        XmlRpcError::Transport(e.to_string())
    }
}

/*
 * mod.rs
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

//! XML-RPC (http://xmlrpc.com/spec.md) over HTTP/1.1.
//!
//! Requests are written and responses parsed with quick_xml. The transport trait is the seam
//! for session handling: [`CookieTransport`] layers Bugzilla's login cookies over
//! [`HttpTransport`].

mod client;
mod cookies;
mod error;
mod parser;
mod transport;
mod value;
mod writer;

pub use client::XmlRpcClient;
pub use cookies::{rpc_cookie_header, CookieTransport};
pub use error::XmlRpcError;
pub use parser::{parse_method_response, MethodResponse};
pub use transport::{
    HttpReply, HttpTransport, XmlRpcClientConfig, XmlRpcTransport, DEFAULT_USER_AGENT,
};
pub use value::{format_double, Struct, Value};
pub use writer::write_method_call;

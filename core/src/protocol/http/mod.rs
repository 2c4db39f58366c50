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

//! HTTP client: HTTP/1.1 over plain TCP or TLS with push-parsed responses.
//!
//! Design:
//! - Callback-based response API: `ResponseHandler` with `ok`/`error`, `header`, `start_body`, `body_chunk`, `end_body`, `complete`, `failed`.
//! - A handler can stop the read loop early via `is_done()`; the XML-RPC transport reads whole
//!   bodies, the page scraper stops as soon as its fragment is complete.
//! - Buffers: `bytes` crate (BytesMut for the parse buffer).
//! - TLS advertises only `http/1.1` via ALPN.

mod handler;
mod request;
mod response;

pub mod h1;

pub use handler::ResponseHandler;
pub use h1::H1ResponseHandler;
pub use request::{Method, RequestBuilder};
pub use response::Response;

pub mod client;
pub mod connection;

pub use client::{request_target, HttpClient, DEFAULT_CONNECT_TIMEOUT};
pub use connection::{HttpConnection, HttpStream};

/*
 * connection.rs
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

//! HTTP connection: one TCP or TLS stream, drives the HTTP/1.1 parser, invokes ResponseHandler.

use bytes::BytesMut;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream as TokioTlsStream;

use crate::protocol::http::h1::{H1ResponseHandler, ParseState, ResponseParser};
use crate::protocol::http::request::{Method, RequestBuilder};
use crate::protocol::http::response::Response;
use crate::protocol::http::ResponseHandler;

/// Unified stream: plain TCP or TLS. Implements AsyncRead + AsyncWrite.
pub enum HttpStream {
    Plain(TcpStream),
    Tls(Box<TokioTlsStream<TcpStream>>),
}

impl AsyncRead for HttpStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for HttpStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_flush(cx),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            HttpStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            HttpStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Bridges parser callbacks to the connection state and the caller's ResponseHandler.
struct H1Driver<'a, H: ResponseHandler + ?Sized> {
    status: &'a mut Option<(u16, Option<String>)>,
    headers: &'a mut Vec<(String, String)>,
    handler: &'a mut H,
}

impl<H: ResponseHandler + ?Sized> H1ResponseHandler for H1Driver<'_, H> {
    fn status(&mut self, code: u16, reason: Option<&str>) {
        *self.status = Some((code, reason.map(|s| s.to_string())));
    }

    fn header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn start_body(&mut self) {
        self.handler.start_body();
    }

    fn body_chunk(&mut self, data: &[u8]) {
        self.handler.body_chunk(data);
    }

    fn end_body(&mut self) {
        self.handler.end_body();
    }

    fn trailer(&mut self, name: &str, value: &str) {
        self.handler.header(name, value);
    }

    fn complete(&mut self) {
        self.handler.complete();
    }
}

/// HTTP/1.1 connection: holds the stream and drives the read loop. Call send() to issue a request.
pub struct HttpConnection {
    stream: HttpStream,
    host: String,
    port: u16,
    secure: bool,
    read_buf: BytesMut,
    parser: ResponseParser,
    status: Option<(u16, Option<String>)>,
    headers: Vec<(String, String)>,
    method: Method,
}

impl HttpConnection {
    /// Create from an already-connected stream. Used by HttpClient::connect().
    pub fn new(stream: HttpStream, host: String, port: u16, secure: bool) -> Self {
        Self {
            stream,
            host,
            port,
            secure,
            read_buf: BytesMut::with_capacity(8192),
            parser: ResponseParser::new(),
            status: None,
            headers: Vec::new(),
            method: Method::Get,
        }
    }

    /// Send the request and run the read loop until the response is complete or the handler
    /// reports `is_done()`. On failure the handler's `failed` is called and the error returned.
    pub async fn send<H: ResponseHandler + ?Sized>(
        &mut self,
        request: &RequestBuilder,
        handler: &mut H,
    ) -> io::Result<()> {
        match self.exchange(request, handler).await {
            Ok(()) => Ok(()),
            Err(e) => {
                handler.failed(&e);
                Err(e)
            }
        }
    }

    /// Shut down the write side; the connection is unusable afterwards.
    pub async fn close(&mut self) {
        let _ = self.stream.shutdown().await;
    }

    async fn exchange<H: ResponseHandler + ?Sized>(
        &mut self,
        request: &RequestBuilder,
        handler: &mut H,
    ) -> io::Result<()> {
        self.status = None;
        self.headers.clear();
        self.parser.reset();
        self.method = request.method;

        self.write_request(request).await?;

        // Bytes left over from a previous response on a kept-alive connection.
        if !self.read_buf.is_empty() {
            self.drive(handler)?;
        }
        while self.parser.state() != ParseState::Idle && !handler.is_done() {
            let n = self.stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                let mut driver = H1Driver {
                    status: &mut self.status,
                    headers: &mut self.headers,
                    handler: &mut *handler,
                };
                self.parser.close(&mut driver)?;
                break;
            }
            self.drive(handler)?;
        }
        Ok(())
    }

    /// Feed buffered bytes to the parser; dispatch status and headers once they are complete.
    fn drive<H: ResponseHandler + ?Sized>(&mut self, handler: &mut H) -> io::Result<()> {
        loop {
            {
                let mut driver = H1Driver {
                    status: &mut self.status,
                    headers: &mut self.headers,
                    handler: &mut *handler,
                };
                self.parser.receive(&mut self.read_buf, &mut driver)?;
            }
            if self.parser.state() != ParseState::HeadersComplete {
                return Ok(());
            }
            self.dispatch_head(handler);
            if self.parser.state() == ParseState::Idle {
                handler.complete();
                return Ok(());
            }
        }
    }

    fn dispatch_head<H: ResponseHandler + ?Sized>(&mut self, handler: &mut H) {
        let (code, reason) = self.status.take().unwrap_or((0, None));
        let header = |name: &str| {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };
        let chunked = header("transfer-encoding")
            .map(|v| v.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false);
        let no_body = self.method == Method::Head || code == 204 || code == 304;
        let content_length = if no_body {
            Some(0)
        } else {
            header("content-length").and_then(|v| v.trim().parse::<u64>().ok())
        };

        let response = match reason {
            Some(r) => Response::with_reason(code, r),
            None => Response::new(code),
        };
        if response.is_success() {
            handler.ok(response);
        } else {
            handler.error(response);
        }
        for (name, value) in &self.headers {
            handler.header(name, value);
        }
        if chunked || content_length != Some(0) {
            handler.start_body();
        }
        self.parser.set_body_mode(content_length, chunked && !no_body);
    }

    async fn write_request(&mut self, request: &RequestBuilder) -> io::Result<()> {
        let host = host_header(&self.host, self.port, self.secure);
        let use_chunked = request.body.is_some()
            && !request.has_header("Content-Length")
            && !request.has_header("Transfer-Encoding");
        let mut head = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\n",
            request.method.as_str(),
            request.path,
            host
        );
        for (k, v) in &request.headers {
            head.push_str(k);
            head.push_str(": ");
            head.push_str(v);
            head.push_str("\r\n");
        }
        if !request.has_header("Connection") {
            head.push_str("Connection: keep-alive\r\n");
        }
        if use_chunked {
            head.push_str("Transfer-Encoding: chunked\r\n");
        }
        head.push_str("\r\n");
        self.stream.write_all(head.as_bytes()).await?;
        if let Some(body) = &request.body {
            if use_chunked {
                let size_line = format!("{:x}\r\n", body.len());
                self.stream.write_all(size_line.as_bytes()).await?;
                self.stream.write_all(body).await?;
                self.stream.write_all(b"\r\n0\r\n\r\n").await?;
            } else {
                self.stream.write_all(body).await?;
            }
        }
        self.stream.flush().await?;
        Ok(())
    }
}

/// `Host` header value: port only when not the scheme default, IPv6 literals bracketed.
fn host_header(host: &str, port: u16, secure: bool) -> String {
    let host = if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    let default_port = if secure { 443 } else { 80 };
    if port != default_port {
        format!("{}:{}", host, port)
    } else {
        host
    }
}

/*
 * parser.rs
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

//! HTTP/1.1 response push parser: status line, headers, body (Content-Length, chunked or until close).

use bytes::Buf;
use bytes::BytesMut;
use std::io;

/// Callback for HTTP/1.1 response events. The connection implements this and forwards to ResponseHandler.
pub trait H1ResponseHandler {
    fn status(&mut self, code: u16, reason: Option<&str>);
    fn header(&mut self, name: &str, value: &str);
    fn start_body(&mut self);
    fn body_chunk(&mut self, data: &[u8]);
    fn end_body(&mut self);
    fn trailer(&mut self, name: &str, value: &str);
    fn complete(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Idle,
    StatusLine,
    Headers,
    /// Headers done; connection must call set_body_mode().
    HeadersComplete,
    Body,
    ChunkSize,
    ChunkData,
    ChunkTrailer,
}

/// Body framing chosen after the headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Length { total: u64, received: u64 },
    Chunked { remaining: u64 },
    UntilClose,
}

/// Push parser for one HTTP/1.1 response. Feed bytes via `receive`; the handler is invoked
/// as complete tokens are parsed. Partial tokens stay in the buffer for the next call.
pub struct ResponseParser {
    state: ParseState,
    framing: Framing,
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

/// Offset of the first CRLF in buf.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Split off one CRLF-terminated line, returning it without the CRLF.
fn take_line(buf: &mut BytesMut) -> Option<BytesMut> {
    let end = find_crlf(buf)?;
    let mut line = buf.split_to(end + 2);
    line.truncate(end);
    Some(line)
}

fn split_header(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    Some((line[..colon].trim(), line[colon + 1..].trim()))
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            framing: Framing::UntilClose,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ParseState::StatusLine;
        self.framing = Framing::UntilClose;
    }

    /// True while the body has no length and ends when the peer closes.
    pub fn reads_until_close(&self) -> bool {
        self.state == ParseState::Body && self.framing == Framing::UntilClose
    }

    /// Peer closed the connection: completes an until-close body, fails anything else.
    pub fn close<H: H1ResponseHandler>(&mut self, handler: &mut H) -> io::Result<()> {
        if self.reads_until_close() {
            handler.end_body();
            handler.complete();
            self.state = ParseState::Idle;
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "HTTP connection closed",
            ))
        }
    }

    /// Consume and parse as much as possible from buf.
    pub fn receive<H: H1ResponseHandler>(
        &mut self,
        buf: &mut BytesMut,
        handler: &mut H,
    ) -> io::Result<()> {
        while !buf.is_empty() {
            match self.state {
                ParseState::StatusLine => {
                    let line = match take_line(buf) {
                        Some(l) => l,
                        None => return Ok(()),
                    };
                    let line = std::str::from_utf8(&line)
                        .map_err(|_| invalid("invalid status line UTF-8"))?;
                    // HTTP/1.1 200 OK, or HTTP/1.1 200 with no reason
                    let mut parts = line.splitn(3, ' ');
                    let version = parts.next().unwrap_or("");
                    if !version.starts_with("HTTP/") {
                        return Err(invalid("not an HTTP status line"));
                    }
                    let code = parts
                        .next()
                        .and_then(|s| s.parse::<u16>().ok())
                        .ok_or_else(|| invalid("invalid status code"))?;
                    let reason = parts.next().filter(|r| !r.is_empty());
                    handler.status(code, reason);
                    self.state = ParseState::Headers;
                }
                ParseState::Headers => {
                    let line = match take_line(buf) {
                        Some(l) => l,
                        None => return Ok(()),
                    };
                    if line.is_empty() {
                        self.state = ParseState::HeadersComplete;
                        return Ok(());
                    }
                    let line =
                        std::str::from_utf8(&line).map_err(|_| invalid("invalid header UTF-8"))?;
                    if let Some((name, value)) = split_header(line) {
                        handler.header(name, value);
                    }
                }
                ParseState::HeadersComplete => return Ok(()),
                ParseState::Body => match &mut self.framing {
                    Framing::Length { total, received } => {
                        let remaining = (*total - *received) as usize;
                        let n = remaining.min(buf.len());
                        if n > 0 {
                            let chunk = buf.split_to(n);
                            handler.body_chunk(&chunk);
                            *received += n as u64;
                        }
                        if *received >= *total {
                            handler.end_body();
                            handler.complete();
                            self.state = ParseState::Idle;
                        }
                    }
                    _ => {
                        let chunk = buf.split_to(buf.len());
                        handler.body_chunk(&chunk);
                    }
                },
                ParseState::ChunkSize => {
                    let line = match take_line(buf) {
                        Some(l) => l,
                        None => return Ok(()),
                    };
                    let line =
                        std::str::from_utf8(&line).map_err(|_| invalid("invalid chunk size"))?;
                    let hex = line.split(';').next().unwrap_or("").trim();
                    let size =
                        u64::from_str_radix(hex, 16).map_err(|_| invalid("invalid chunk size"))?;
                    self.framing = Framing::Chunked { remaining: size };
                    self.state = if size == 0 {
                        ParseState::ChunkTrailer
                    } else {
                        ParseState::ChunkData
                    };
                }
                ParseState::ChunkData => {
                    let remaining = match &mut self.framing {
                        Framing::Chunked { remaining } => remaining,
                        _ => return Err(invalid("chunk data outside chunked body")),
                    };
                    let n = (*remaining as usize).min(buf.len());
                    if n > 0 {
                        let chunk = buf.split_to(n);
                        handler.body_chunk(&chunk);
                        *remaining -= n as u64;
                    }
                    if *remaining > 0 || buf.len() < 2 {
                        return Ok(());
                    }
                    // CRLF after chunk data
                    buf.advance(2);
                    self.state = ParseState::ChunkSize;
                }
                ParseState::ChunkTrailer => {
                    let line = match take_line(buf) {
                        Some(l) => l,
                        None => return Ok(()),
                    };
                    if line.is_empty() {
                        handler.end_body();
                        handler.complete();
                        self.state = ParseState::Idle;
                    } else {
                        let line =
                            std::str::from_utf8(&line).map_err(|_| invalid("invalid trailer"))?;
                        if let Some((name, value)) = split_header(line) {
                            handler.trailer(name, value);
                        }
                    }
                }
                ParseState::Idle => return Ok(()),
            }
        }
        Ok(())
    }

    /// Called by the connection once the headers are in (state HeadersComplete).
    pub fn set_body_mode(&mut self, content_length: Option<u64>, chunked: bool) {
        if self.state != ParseState::HeadersComplete {
            return;
        }
        if chunked {
            self.framing = Framing::Chunked { remaining: 0 };
            self.state = ParseState::ChunkSize;
        } else if let Some(total) = content_length {
            self.framing = Framing::Length { total, received: 0 };
            self.state = if total == 0 {
                ParseState::Idle
            } else {
                ParseState::Body
            };
        } else {
            self.framing = Framing::UntilClose;
            self.state = ParseState::Body;
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/*
 * fragment.rs
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

//! Streaming extraction of a marker-bounded run of lines from an HTTP body.
//!
//! Body bytes arrive in arbitrary chunks and are split into lines (`\n`, optional `\r`).
//! Lines before the first one containing the start marker are dropped; that line and every
//! following line are kept until a line after it contains the end marker. The kept lines are
//! joined without separators. Anything after the end line is never looked at.

use std::io;

use crate::error::BugzillaError;
use crate::protocol::http::{Response, ResponseHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractState {
    Seeking,
    Capturing,
    Complete,
}

#[derive(Debug)]
pub struct FragmentExtractor {
    start: String,
    end: String,
    state: ExtractState,
    line: Vec<u8>,
    fragment: String,
}

impl FragmentExtractor {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            state: ExtractState::Seeking,
            line: Vec::new(),
            fragment: String::new(),
        }
    }

    pub fn state(&self) -> ExtractState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == ExtractState::Complete
    }

    /// Feed body bytes. Ignored once complete.
    pub fn push(&mut self, data: &[u8]) {
        if self.is_complete() {
            return;
        }
        self.line.extend_from_slice(data);
        let mut consumed = 0;
        while let Some(pos) = self.line[consumed..].iter().position(|&b| b == b'\n') {
            let end = consumed + pos;
            let mut line_end = end;
            if line_end > consumed && self.line[line_end - 1] == b'\r' {
                line_end -= 1;
            }
            let text = String::from_utf8_lossy(&self.line[consumed..line_end]).into_owned();
            consumed = end + 1;
            self.accept(&text);
            if self.is_complete() {
                self.line.clear();
                return;
            }
        }
        self.line.drain(..consumed);
    }

    /// Feed one already-split line.
    pub fn push_line(&mut self, line: &str) {
        if !self.is_complete() {
            self.accept(line);
        }
    }

    fn accept(&mut self, line: &str) {
        match self.state {
            ExtractState::Seeking => {
                if line.contains(&self.start) {
                    self.fragment.push_str(line);
                    self.state = ExtractState::Capturing;
                    tracing::trace!(marker = %self.start, "fragment start found");
                }
            }
            ExtractState::Capturing => {
                self.fragment.push_str(line);
                if line.contains(&self.end) {
                    self.state = ExtractState::Complete;
                    tracing::trace!(len = self.fragment.len(), "fragment complete");
                }
            }
            ExtractState::Complete => {}
        }
    }

    /// End of stream. The last line need not end in a newline.
    pub fn finish(mut self) -> Result<String, BugzillaError> {
        if !self.is_complete() && !self.line.is_empty() {
            let mut last = std::mem::take(&mut self.line);
            if last.last() == Some(&b'\r') {
                last.pop();
            }
            let text = String::from_utf8_lossy(&last).into_owned();
            self.accept(&text);
        }
        match self.state {
            ExtractState::Complete => Ok(self.fragment),
            ExtractState::Seeking => Err(BugzillaError::Http(format!(
                "start marker {:?} not found in response",
                self.start
            ))),
            ExtractState::Capturing => Err(BugzillaError::Http(format!(
                "response ended before end marker {:?}",
                self.end
            ))),
        }
    }
}

/// Run the extractor over a sequence of lines.
pub fn extract_lines<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    start: &str,
    end: &str,
) -> Result<String, BugzillaError> {
    let mut extractor = FragmentExtractor::new(start, end);
    for line in lines {
        extractor.push_line(line);
        if extractor.is_complete() {
            break;
        }
    }
    extractor.finish()
}

/// Response handler that streams a 2xx body into a [`FragmentExtractor`] and stops the read
/// loop once the fragment is complete.
#[derive(Debug)]
pub struct FragmentHandler {
    extractor: FragmentExtractor,
    status: Option<Response>,
    location: Option<String>,
}

impl FragmentHandler {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            extractor: FragmentExtractor::new(start, end),
            status: None,
            location: None,
        }
    }

    /// `Location` of a 301/302/303/307/308 response.
    pub fn redirect_location(&self) -> Option<&str> {
        match self.status.as_ref().map(|s| s.code) {
            Some(301 | 302 | 303 | 307 | 308) => self.location.as_deref(),
            _ => None,
        }
    }

    /// Fragment once the exchange is over. Non-2xx status is an error.
    pub fn finish(self) -> Result<String, BugzillaError> {
        match self.status {
            Some(ref status) if status.is_success() => self.extractor.finish(),
            Some(status) => Err(BugzillaError::Http(format!(
                "Server returned HTTP status {}",
                status
            ))),
            None => Err(BugzillaError::Http("no HTTP response".to_string())),
        }
    }
}

impl ResponseHandler for FragmentHandler {
    fn ok(&mut self, response: Response) {
        self.status = Some(response);
    }

    fn error(&mut self, response: Response) {
        self.status = Some(response);
    }

    fn header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("location") {
            self.location = Some(value.trim().to_string());
        }
    }

    fn start_body(&mut self) {}

    fn body_chunk(&mut self, data: &[u8]) {
        if self.status.as_ref().map(Response::is_success).unwrap_or(false) {
            self.extractor.push(data);
        }
    }

    fn end_body(&mut self) {}

    fn complete(&mut self) {}

    fn failed(&mut self, error: &io::Error) {
        tracing::debug!(error = %error, "page request failed");
    }

    fn is_done(&self) -> bool {
        self.extractor.is_complete() || self.status.as_ref().is_some_and(|s| !s.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 6] = [
        "noise",
        "<table id=buglistSorter>",
        "row1",
        "row2",
        "</table>",
        "trailing",
    ];

    #[test]
    fn extracts_bounded_lines() {
        let fragment = extract_lines(LINES, "buglistSorter", "</table>").unwrap();
        assert_eq!(fragment, "<table id=buglistSorter>row1row2</table>");
    }

    #[test]
    fn missing_end_marker_is_error() {
        let err = extract_lines(LINES[..4].iter().copied(), "buglistSorter", "</table>");
        assert!(matches!(err, Err(BugzillaError::Http(_))));
    }

    #[test]
    fn missing_start_marker_is_error() {
        let err = extract_lines(["a", "b"], "buglistSorter", "</table>");
        assert!(matches!(err, Err(BugzillaError::Http(_))));
    }

    #[test]
    fn end_marker_on_start_line_is_not_checked() {
        let fragment = extract_lines(
            ["<table id=buglistSorter></table>", "x", "</table>"],
            "buglistSorter",
            "</table>",
        )
        .unwrap();
        assert_eq!(fragment, "<table id=buglistSorter></table>x</table>");
    }

    #[test]
    fn chunks_split_anywhere() {
        let body = LINES.join("\r\n");
        for split in 1..body.len() {
            let mut extractor = FragmentExtractor::new("buglistSorter", "</table>");
            extractor.push(&body.as_bytes()[..split]);
            extractor.push(&body.as_bytes()[split..]);
            assert_eq!(
                extractor.finish().unwrap(),
                "<table id=buglistSorter>row1row2</table>"
            );
        }
    }

    #[test]
    fn unterminated_last_line_counts() {
        let mut extractor = FragmentExtractor::new("start", "end");
        extractor.push(b"start\nmiddle\nthe end");
        assert_eq!(extractor.state(), ExtractState::Capturing);
        assert_eq!(extractor.finish().unwrap(), "startmiddlethe end");
    }

    #[test]
    fn handler_stops_when_complete() {
        let mut handler = FragmentHandler::new("buglistSorter", "</table>");
        handler.ok(Response::new(200));
        handler.body_chunk(b"x\n<table id=buglistSorter>\n</table>\n");
        assert!(handler.is_done());
        assert_eq!(handler.finish().unwrap(), "<table id=buglistSorter></table>");
    }

    #[test]
    fn handler_rejects_error_status() {
        let mut handler = FragmentHandler::new("a", "b");
        handler.error(Response::with_reason(404, "Not Found"));
        handler.body_chunk(b"a\nb\n");
        assert!(handler.is_done());
        let err = handler.finish().unwrap_err();
        assert_eq!(err.to_string(), "Server returned HTTP status 404 Not Found");
    }

    #[test]
    fn handler_reports_redirect_location() {
        let mut handler = FragmentHandler::new("a", "b");
        handler.error(Response::with_reason(302, "Found"));
        handler.header("Location", " /bugzilla/buglist.cgi?x=1 ");
        assert!(handler.is_done());
        assert_eq!(handler.redirect_location(), Some("/bugzilla/buglist.cgi?x=1"));

        let mut handler = FragmentHandler::new("a", "b");
        handler.ok(Response::new(200));
        handler.header("Location", "/elsewhere");
        assert!(handler.redirect_location().is_none());
    }
}

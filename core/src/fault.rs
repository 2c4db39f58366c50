/*
 * fault.rs
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

//! Classification of Bugzilla WebService fault codes.

/// Well-known Bugzilla fault codes. The server's message is kept on the error itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// 51: a named object (user, product, ...) does not exist.
    InvalidObject,
    /// 100: the bug id is not a valid id.
    InvalidBugId,
    /// 101: no bug with that id or alias.
    BugNotFound,
    /// 102: the bug exists but the caller may not see it.
    AccessDenied,
    /// 103: the alias is not valid.
    InvalidAlias,
    /// 300: wrong login or password.
    InvalidCredentials,
    /// 301: the account is disabled.
    AccountDisabled,
    /// 410: the call needs a logged-in user.
    LoginRequired,
    /// 32000 and up: server-side transient failure.
    Transient,
    /// Negative codes: XML-RPC protocol level.
    Protocol,
    Other(i32),
}

impl FaultKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            51 => FaultKind::InvalidObject,
            100 => FaultKind::InvalidBugId,
            101 => FaultKind::BugNotFound,
            102 => FaultKind::AccessDenied,
            103 => FaultKind::InvalidAlias,
            300 => FaultKind::InvalidCredentials,
            301 => FaultKind::AccountDisabled,
            410 => FaultKind::LoginRequired,
            c if c >= 32000 => FaultKind::Transient,
            c if c < 0 => FaultKind::Protocol,
            c => FaultKind::Other(c),
        }
    }

    /// True for faults that a fresh login could cure.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            FaultKind::InvalidCredentials | FaultKind::AccountDisabled | FaultKind::LoginRequired
        )
    }
}

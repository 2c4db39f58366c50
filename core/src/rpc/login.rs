/*
 * login.rs
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

//! `User.login` and `User.logout`.

use std::fmt;

use crate::method::{BugzillaMethod, ResultMap};
use crate::protocol::xmlrpc::{Struct, Value};

const METHOD_LOGIN: &str = "User.login";
const METHOD_LOGOUT: &str = "User.logout";

/// Log in with a Bugzilla account. On success the connector keeps the returned token and
/// sends it with every later call; servers that use cookies instead set them on this response.
#[derive(Clone)]
pub struct LogIn {
    params: Struct,
    result: ResultMap,
}

impl LogIn {
    pub fn new(login: &str, password: &str) -> Self {
        let mut params = Struct::new();
        params.insert("login".to_string(), Value::from(login));
        params.insert("password".to_string(), Value::from(password));
        Self {
            params,
            result: ResultMap::default(),
        }
    }

    /// Ask the server for a persistent login cookie.
    pub fn remember(mut self, remember: bool) -> Self {
        self.params
            .insert("remember".to_string(), Value::Boolean(remember));
        self
    }

    pub fn login(&self) -> Option<&str> {
        self.params.get("login").and_then(Value::as_str)
    }

    /// Session token, when the server issues one (Bugzilla 4.4.3 and later).
    pub fn token(&self) -> Option<String> {
        self.result.get("token").and_then(Value::to_plain_string)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.result.get("id").and_then(Value::as_i64)
    }
}

impl fmt::Debug for LogIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogIn")
            .field("login", &self.login())
            .field("user_id", &self.user_id())
            .finish_non_exhaustive()
    }
}

impl BugzillaMethod for LogIn {
    fn method_name(&self) -> &'static str {
        METHOD_LOGIN
    }

    fn parameter_map(&self) -> &Struct {
        &self.params
    }

    fn set_result_map(&mut self, result: ResultMap) {
        self.result = result;
    }

    fn as_login(&self) -> Option<&LogIn> {
        Some(self)
    }
}

/// End the server-side session. The connector keeps its cookies and token; they are simply
/// no longer valid on the server.
#[derive(Debug, Clone, Default)]
pub struct LogOut {
    params: Struct,
}

impl LogOut {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BugzillaMethod for LogOut {
    fn method_name(&self) -> &'static str {
        METHOD_LOGOUT
    }

    fn parameter_map(&self) -> &Struct {
        &self.params
    }

    fn set_result_map(&mut self, _result: ResultMap) {}
}

/*
 * method.rs
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

//! Contract for XML-RPC operations run through `BugzillaConnector::execute_method`.

use crate::protocol::xmlrpc::{Struct, Value};
use crate::rpc::LogIn;

/// Read-only view of a method's result struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultMap(Struct);

impl ResultMap {
    pub fn new(members: Struct) -> Self {
        Self(members)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_struct(&self) -> &Struct {
        &self.0
    }
}

/// One Bugzilla WebService call.
///
/// The connector merges the session token under the method's own parameters, dispatches
/// `method_name()` and hands the result back through `set_result_map`. Typed accessors on
/// the implementing type then read the result.
pub trait BugzillaMethod {
    /// Remote method name, e.g. `Bug.get`.
    fn method_name(&self) -> &'static str;

    fn parameter_map(&self) -> &Struct;

    /// Replaces any result from an earlier invocation.
    fn set_result_map(&mut self, result: ResultMap);

    /// Login calls return themselves so the connector can record the user and token.
    fn as_login(&self) -> Option<&LogIn> {
        None
    }
}

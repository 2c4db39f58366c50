/*
 * value.rs
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

//! XML-RPC value model.

use std::collections::BTreeMap;
use std::fmt;

/// Members of an XML-RPC `<struct>`, keyed by member name.
pub type Struct = BTreeMap<String, Value>;

/// One XML-RPC value. `DateTime` keeps the raw `dateTime.iso8601` text; Bugzilla
/// sends it without a timezone and callers interpret it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Boolean(bool),
    String(String),
    Double(f64),
    DateTime(String),
    Base64(Vec<u8>),
    Struct(Struct),
    Array(Vec<Value>),
    Nil,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::DateTime(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Text form of a scalar: strings as-is, numbers the way Bugzilla's older servers print them
    /// (`42.0` stays `"42.0"`), booleans as `true`/`false`. None for struct, array, base64 and nil.
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Value::String(s) | Value::DateTime(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Double(d) => Some(format_double(*d)),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Base64(_) | Value::Struct(_) | Value::Array(_) | Value::Nil => None,
        }
    }
}

/// Decimal text for a double that always carries a fractional part when integral.
pub fn format_double(d: f64) -> String {
    if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e16 {
        format!("{:.1}", d)
    } else {
        d.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_plain_string() {
            Some(s) => f.write_str(&s),
            None => write!(f, "{:?}", self),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Struct> for Value {
    fn from(v: Struct) -> Self {
        Value::Struct(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_double_keeps_fraction() {
        assert_eq!(Value::Double(42.0).to_plain_string().unwrap(), "42.0");
        assert_eq!(Value::Double(4.4).to_plain_string().unwrap(), "4.4");
        assert_eq!(Value::Double(-3.0).to_plain_string().unwrap(), "-3.0");
    }

    #[test]
    fn containers_have_no_plain_string() {
        assert!(Value::Array(vec![]).to_plain_string().is_none());
        assert!(Value::Struct(Struct::new()).to_plain_string().is_none());
        assert!(Value::Nil.to_plain_string().is_none());
    }

    #[test]
    fn int_widens_to_f64() {
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::from("7").as_f64(), None);
    }
}

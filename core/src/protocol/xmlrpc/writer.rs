/*
 * writer.rs
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

//! `<methodCall>` serialization with quick_xml's writer.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

use super::error::XmlRpcError;
use super::value::{format_double, Value};

type XmlWriter<'a> = Writer<&'a mut Vec<u8>>;

fn emit(writer: &mut XmlWriter<'_>, event: Event<'_>) -> Result<(), XmlRpcError> {
    writer
        .write_event(event)
        .map_err(|e| XmlRpcError::Encode(e.to_string()))
}

fn start(writer: &mut XmlWriter<'_>, name: &str) -> Result<(), XmlRpcError> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut XmlWriter<'_>, name: &str) -> Result<(), XmlRpcError> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut XmlWriter<'_>, name: &str, text: &str) -> Result<(), XmlRpcError> {
    start(writer, name)?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

/// Encode a method call: `<methodCall><methodName/><params><param><value/>...`.
pub fn write_method_call(method: &str, params: &[Value]) -> Result<Vec<u8>, XmlRpcError> {
    let mut out = Vec::new();
    let mut writer = Writer::new(&mut out);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    start(&mut writer, "methodCall")?;
    text_element(&mut writer, "methodName", method)?;
    start(&mut writer, "params")?;
    for param in params {
        start(&mut writer, "param")?;
        write_value(&mut writer, param)?;
        end(&mut writer, "param")?;
    }
    end(&mut writer, "params")?;
    end(&mut writer, "methodCall")?;
    Ok(out)
}

fn write_value(writer: &mut XmlWriter<'_>, value: &Value) -> Result<(), XmlRpcError> {
    start(writer, "value")?;
    match value {
        Value::Int(i) => {
            let tag = if i32::try_from(*i).is_ok() { "int" } else { "i8" };
            text_element(writer, tag, &i.to_string())?;
        }
        Value::Boolean(b) => text_element(writer, "boolean", if *b { "1" } else { "0" })?,
        Value::String(s) => text_element(writer, "string", s)?,
        Value::Double(d) => text_element(writer, "double", &format_double(*d))?,
        Value::DateTime(s) => text_element(writer, "dateTime.iso8601", s)?,
        Value::Base64(data) => text_element(writer, "base64", &BASE64.encode(data))?,
        Value::Struct(members) => {
            start(writer, "struct")?;
            for (name, member) in members {
                start(writer, "member")?;
                text_element(writer, "name", name)?;
                write_value(writer, member)?;
                end(writer, "member")?;
            }
            end(writer, "struct")?;
        }
        Value::Array(items) => {
            start(writer, "array")?;
            start(writer, "data")?;
            for item in items {
                write_value(writer, item)?;
            }
            end(writer, "data")?;
            end(writer, "array")?;
        }
        Value::Nil => emit(writer, Event::Empty(BytesStart::new("nil")))?,
    }
    end(writer, "value")
}

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

//! `<methodResponse>` parsing.
//!
//! The quick_xml event stream is folded into a small element tree first, then the tree is
//! interpreted. Namespace prefixes are dropped so the Apache extensions (`ex:nil`, `ex:i8`)
//! read like their plain forms.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::error::XmlRpcError;
use super::value::{Struct, Value};

/// Decoded method response.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Fault { code: i32, message: String },
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_error(msg: impl Into<String>) -> XmlRpcError {
    XmlRpcError::Parse(msg.into())
}

fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rfind(':') {
        Some(i) => name[i + 1..].to_string(),
        None => name.into_owned(),
    }
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), XmlRpcError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(parse_error("more than one root element")),
    }
    Ok(())
}

/// Open elements allowed at once; bounds both the tree and the recursion in `decode_value`.
const MAX_DEPTH: usize = 128;

fn build_tree(body: &str) -> Result<Node, XmlRpcError> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Err(e) => return Err(parse_error(e.to_string())),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(parse_error("nesting too deep"));
                }
                stack.push(Node {
                    name: local_name(e.name().as_ref()),
                    ..Node::default()
                });
            }
            Ok(Event::Empty(e)) => {
                let node = Node {
                    name: local_name(e.name().as_ref()),
                    ..Node::default()
                };
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| parse_error("unbalanced end tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| parse_error(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(parse_error("unexpected end of document"));
    }
    root.ok_or_else(|| parse_error("empty document"))
}

/// Parse a `<methodResponse>` body into a value or a fault.
pub fn parse_method_response(body: &[u8]) -> Result<MethodResponse, XmlRpcError> {
    let body = std::str::from_utf8(body).map_err(|e| parse_error(e.to_string()))?;
    let root = build_tree(body)?;
    if root.name != "methodResponse" {
        return Err(parse_error(format!(
            "expected methodResponse, found {}",
            root.name
        )));
    }
    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| parse_error("fault without value"))?;
        return decode_fault(&decode_value(value)?);
    }
    let params = root
        .child("params")
        .ok_or_else(|| parse_error("methodResponse without params or fault"))?;
    let value = match params.child("param").and_then(|p| p.child("value")) {
        Some(value) => decode_value(value)?,
        None => Value::Nil,
    };
    Ok(MethodResponse::Success(value))
}

fn decode_fault(value: &Value) -> Result<MethodResponse, XmlRpcError> {
    let members = value
        .as_struct()
        .ok_or_else(|| parse_error("fault value is not a struct"))?;
    let code = match members.get("faultCode") {
        Some(Value::Int(i)) => i32::try_from(*i).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    let message = members
        .get("faultString")
        .and_then(|v| v.to_plain_string())
        .unwrap_or_default();
    Ok(MethodResponse::Fault { code, message })
}

fn decode_value(node: &Node) -> Result<Value, XmlRpcError> {
    let typed = match node.children.first() {
        Some(typed) => typed,
        // untyped <value> is a string
        None => return Ok(Value::String(node.text.clone())),
    };
    let text = typed.text.trim();
    let value = match typed.name.as_str() {
        "int" | "i4" | "i8" => Value::Int(
            text.parse()
                .map_err(|_| parse_error(format!("bad integer: {}", text)))?,
        ),
        "boolean" => match text {
            "1" | "true" => Value::Boolean(true),
            "0" | "false" => Value::Boolean(false),
            _ => return Err(parse_error(format!("bad boolean: {}", text))),
        },
        "string" => Value::String(typed.text.clone()),
        "double" => Value::Double(
            text.parse()
                .map_err(|_| parse_error(format!("bad double: {}", text)))?,
        ),
        "dateTime.iso8601" => Value::DateTime(text.to_string()),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            Value::Base64(
                BASE64
                    .decode(compact.as_bytes())
                    .map_err(|e| parse_error(e.to_string()))?,
            )
        }
        "struct" => {
            let mut members = Struct::new();
            for member in typed.children_named("member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| parse_error("struct member without name"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| parse_error("struct member without value"))?;
                members.insert(name.text.clone(), decode_value(value)?);
            }
            Value::Struct(members)
        }
        "array" => {
            let mut items = Vec::new();
            if let Some(data) = typed.child("data") {
                for item in data.children_named("value") {
                    items.push(decode_value(item)?);
                }
            }
            Value::Array(items)
        }
        "nil" => Value::Nil,
        other => return Err(parse_error(format!("unknown value type: {}", other))),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(xml: &str) -> Value {
        match parse_method_response(xml.as_bytes()).unwrap() {
            MethodResponse::Success(v) => v,
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn struct_response_with_whitespace() {
        let xml = r#"<?xml version="1.0"?>
<methodResponse>
  <params>
    <param>
      <value>
        <struct>
          <member><name>id</name><value><int>7</int></value></member>
          <member><name>token</name><value><string>7-abc</string></value></member>
          <member><name>plain</name><value>untyped text</value></member>
        </struct>
      </value>
    </param>
  </params>
</methodResponse>"#;
        let value = success(xml);
        let members = value.as_struct().unwrap();
        assert_eq!(members["id"], Value::Int(7));
        assert_eq!(members["token"].as_str(), Some("7-abc"));
        assert_eq!(members["plain"].as_str(), Some("untyped text"));
    }

    #[test]
    fn nested_array_and_extensions() {
        let xml = "<methodResponse xmlns:ex=\"http://ws.apache.org/xmlrpc/namespaces/extensions\"><params><param><value><array><data>\
            <value><double>4.4</double></value>\
            <value><ex:nil/></value>\
            <value><ex:i8>9000000000</ex:i8></value>\
            <value><boolean>0</boolean></value>\
            <value><dateTime.iso8601>20240102T03:04:05</dateTime.iso8601></value>\
            <value><base64>aGk=</base64></value>\
            </data></array></value></param></params></methodResponse>";
        let value = success(xml);
        let items = value.as_array().unwrap();
        assert_eq!(items[0], Value::Double(4.4));
        assert_eq!(items[1], Value::Nil);
        assert_eq!(items[2], Value::Int(9_000_000_000));
        assert_eq!(items[3], Value::Boolean(false));
        assert_eq!(items[4], Value::DateTime("20240102T03:04:05".to_string()));
        assert_eq!(items[5], Value::Base64(b"hi".to_vec()));
    }

    #[test]
    fn string_keeps_inner_whitespace_and_entities() {
        let xml = "<methodResponse><params><param><value><string> a &lt;b&gt; </string></value></param></params></methodResponse>";
        assert_eq!(success(xml).as_str(), Some(" a <b> "));
    }

    #[test]
    fn fault_response() {
        let xml = "<methodResponse><fault><value><struct>\
            <member><name>faultCode</name><value><int>300</int></value></member>\
            <member><name>faultString</name><value><string>The username or password you entered is not valid.</string></value></member>\
            </struct></value></fault></methodResponse>";
        let resp = parse_method_response(xml.as_bytes()).unwrap();
        assert_eq!(
            resp,
            MethodResponse::Fault {
                code: 300,
                message: "The username or password you entered is not valid.".to_string()
            }
        );
    }

    #[test]
    fn rejects_other_root_and_truncated_input() {
        assert!(parse_method_response(b"<html><body/></html>").is_err());
        assert!(parse_method_response(b"<methodResponse><params>").is_err());
        assert!(parse_method_response(b"").is_err());
    }

    #[test]
    fn deep_nesting_is_a_parse_error() {
        let levels = 100_000;
        let mut xml = String::from("<methodResponse><params><param>");
        xml.push_str(&"<value><array><data>".repeat(levels));
        xml.push_str(&"</data></array></value>".repeat(levels));
        xml.push_str("</param></params></methodResponse>");
        assert!(matches!(
            parse_method_response(xml.as_bytes()),
            Err(XmlRpcError::Parse(_))
        ));
    }

    #[test]
    fn moderate_nesting_still_decodes() {
        let levels = 30;
        let mut xml = String::from("<methodResponse><params><param>");
        xml.push_str(&"<value><array><data>".repeat(levels));
        xml.push_str("<value><int>1</int></value>");
        xml.push_str(&"</data></array></value>".repeat(levels));
        xml.push_str("</param></params></methodResponse>");
        let mut value = success(&xml);
        for _ in 0..levels {
            value = match value {
                Value::Array(mut items) => items.remove(0),
                other => panic!("expected array, got {:?}", other),
            };
        }
        assert_eq!(value, Value::Int(1));
    }
}

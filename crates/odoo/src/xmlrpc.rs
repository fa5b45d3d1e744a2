//! Minimal XML-RPC codec: encodes `methodCall` documents and decodes
//! `methodResponse` documents, faults included.

use bridge_core::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
    Nil,
}

impl Value {
    pub fn structure<K: Into<String>>(members: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Struct(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats; Odoo sends whole amounts either way.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Struct(members) => Some(members),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_struct().and_then(|m| m.get(key))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    Fault { code: i64, message: String },
}

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::protocol(format!("cannot encode XML-RPC call: {}", e)))
    }

    fn open(&mut self, tag: &str) -> Result<()> {
        self.emit(Event::Start(BytesStart::new(tag)))
    }

    fn close(&mut self, tag: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(tag)))
    }

    fn leaf(&mut self, tag: &str, text: &str) -> Result<()> {
        self.open(tag)?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.close(tag)
    }

    fn value(&mut self, value: &Value) -> Result<()> {
        self.open("value")?;
        match value {
            Value::Int(n) => self.leaf("int", &n.to_string())?,
            Value::Double(n) => self.leaf("double", &n.to_string())?,
            Value::Bool(b) => self.leaf("boolean", if *b { "1" } else { "0" })?,
            Value::String(s) => self.leaf("string", s)?,
            Value::Array(items) => {
                self.open("array")?;
                self.open("data")?;
                for item in items {
                    self.value(item)?;
                }
                self.close("data")?;
                self.close("array")?;
            }
            Value::Struct(members) => {
                self.open("struct")?;
                for (name, member) in members {
                    self.open("member")?;
                    self.leaf("name", name)?;
                    self.value(member)?;
                    self.close("member")?;
                }
                self.close("struct")?;
            }
            Value::Nil => self.emit(Event::Empty(BytesStart::new("nil")))?,
        }
        self.close("value")
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| Error::protocol(format!("cannot encode XML-RPC call: {}", e)))
    }
}

pub fn encode_call(method: &str, params: &[Value]) -> Result<String> {
    let mut out = XmlOut::new();
    out.emit(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    out.open("methodCall")?;
    out.leaf("methodName", method)?;
    out.open("params")?;
    for param in params {
        out.open("param")?;
        out.value(param)?;
        out.close("param")?;
    }
    out.close("params")?;
    out.close("methodCall")?;
    out.finish()
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<Node>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            children: Vec::new(),
        }
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

fn malformed(detail: impl std::fmt::Display) -> Error {
    Error::protocol(format!("malformed XML-RPC response: {}", detail))
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Element::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::new(e.local_name().as_ref())),
            Ok(Event::Empty(e)) => {
                let element = Element::new(e.local_name().as_ref());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Element(element));
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(malformed("unbalanced closing tag"));
                }
                if let Some(done) = stack.pop() {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Element(done));
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(malformed)?.into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(malformed("unclosed element"));
    }
    stack
        .pop()
        .and_then(|root| root.children.into_iter().find_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }))
        .ok_or_else(|| malformed("empty document"))
}

fn decode_value(element: &Element) -> Result<Value> {
    let Some(typed) = element.elements().next() else {
        return Ok(Value::String(element.text()));
    };

    let text = typed.text();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .trim()
            .parse()
            .map(Value::Int)
            .map_err(|_| malformed(format!("bad integer `{}`", text))),
        "double" => text
            .trim()
            .parse()
            .map(Value::Double)
            .map_err(|_| malformed(format!("bad double `{}`", text))),
        "boolean" => match text.trim() {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(malformed(format!("bad boolean `{}`", other))),
        },
        "string" | "dateTime.iso8601" | "base64" => Ok(Value::String(text)),
        "nil" => Ok(Value::Nil),
        "array" => {
            let data = typed.child("data").ok_or_else(|| malformed("array without data"))?;
            data.elements()
                .filter(|e| e.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.elements().filter(|e| e.name == "member") {
                let name = member
                    .child("name")
                    .map(Element::text)
                    .ok_or_else(|| malformed("struct member without name"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| malformed("struct member without value"))?;
                members.insert(name, decode_value(value)?);
            }
            Ok(Value::Struct(members))
        }
        other => Err(malformed(format!("unknown type `{}`", other))),
    }
}

pub fn decode_response(xml: &str) -> Result<MethodResponse> {
    let root = parse_document(xml)?;
    if root.name != "methodResponse" {
        return Err(malformed(format!("expected methodResponse, found {}", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| malformed("fault without value"))
            .and_then(decode_value)?;
        return Ok(MethodResponse::Fault {
            code: value.get("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: value
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or("unknown fault")
                .to_string(),
        });
    }

    let value = root
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| malformed("response without params"))?;
    decode_value(value).map(MethodResponse::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_nested_call() {
        let xml = encode_call(
            "execute_kw",
            &[
                Value::from("db"),
                Value::Int(2),
                Value::Array(vec![Value::Double(1.5), Value::Bool(true)]),
                Value::structure([("limit", Value::Int(5)), ("note", Value::from("a<b"))]),
            ],
        )
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<methodName>execute_kw</methodName>"));
        assert!(xml.contains("<value><string>db</string></value>"));
        assert!(xml.contains("<value><int>2</int></value>"));
        assert!(xml.contains("<array><data><value><double>1.5</double></value><value><boolean>1</boolean></value></data></array>"));
        assert!(xml.contains("<member><name>limit</name><value><int>5</int></value></member>"));
        assert!(xml.contains("a&lt;b"));
    }

    #[test]
    fn decodes_success_with_records() {
        let xml = r#"<?xml version='1.0'?>
<methodResponse>
<params>
<param>
<value><array><data>
<value><struct>
<member><name>id</name><value><int>7</int></value></member>
<member><name>name</name><value><string>Acme &amp; Co</string></value></member>
<member><name>partner_id</name><value><array><data><value><int>3</int></value><value><string>Bob</string></value></data></array></value></member>
<member><name>email</name><value><boolean>0</boolean></value></member>
<member><name>amount_total</name><value><double>120.5</double></value></member>
<member><name>ref</name><value>untyped</value></member>
<member><name>empty</name><value><string/></value></member>
</struct></value>
</data></array></value>
</param>
</params>
</methodResponse>"#;

        let MethodResponse::Success(value) = decode_response(xml).unwrap() else {
            panic!("expected success");
        };
        let record = &value.as_array().unwrap()[0];
        assert_eq!(record.get("id"), Some(&Value::Int(7)));
        assert_eq!(record.get("name").and_then(Value::as_str), Some("Acme & Co"));
        assert_eq!(
            record.get("partner_id"),
            Some(&Value::Array(vec![Value::Int(3), Value::from("Bob")]))
        );
        assert_eq!(record.get("email"), Some(&Value::Bool(false)));
        assert_eq!(record.get("amount_total").and_then(Value::as_f64), Some(120.5));
        assert_eq!(record.get("ref").and_then(Value::as_str), Some("untyped"));
        assert_eq!(record.get("empty").and_then(Value::as_str), Some(""));
    }

    #[test]
    fn decodes_fault() {
        let xml = "<?xml version='1.0'?><methodResponse><fault><value><struct>\
            <member><name>faultCode</name><value><int>1</int></value></member>\
            <member><name>faultString</name><value><string>Access Denied</string></value></member>\
            </struct></value></fault></methodResponse>";
        assert_eq!(
            decode_response(xml).unwrap(),
            MethodResponse::Fault {
                code: 1,
                message: "Access Denied".to_string()
            }
        );
    }

    #[test]
    fn decodes_scalar_results() {
        let ok = |xml: &str| match decode_response(xml).unwrap() {
            MethodResponse::Success(v) => v,
            other => panic!("unexpected {other:?}"),
        };
        let wrap = |inner: &str| {
            format!("<methodResponse><params><param><value>{}</value></param></params></methodResponse>", inner)
        };
        assert_eq!(ok(&wrap("<int>42</int>")), Value::Int(42));
        assert_eq!(ok(&wrap("<i4>-3</i4>")), Value::Int(-3));
        assert_eq!(ok(&wrap("<boolean>1</boolean>")), Value::Bool(true));
        assert_eq!(ok(&wrap("<nil/>")), Value::Nil);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_response("not xml at all"), Err(Error::Protocol(_))));
        assert!(matches!(decode_response("<html><body>502</body></html>"), Err(Error::Protocol(_))));
        assert!(matches!(
            decode_response("<methodResponse><params><param><value><int>x</int></value></param></params></methodResponse>"),
            Err(Error::Protocol(_))
        ));
        assert!(decode_response("<methodResponse><params>").is_err());
    }
}

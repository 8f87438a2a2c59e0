//! Markup → value.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::error::DecodeError;
use super::message::{Fault, MethodCall, MethodResponse};
use super::value::{Struct, Value};

/// Parse a `<methodResponse>` document.
///
/// # Errors
///
/// Returns [`DecodeError`] when the document is not well-formed XML or does
/// not have the shape of an XML-RPC response. A fault is not an error here;
/// it comes back as [`MethodResponse::Fault`].
pub fn parse_response(xml: &str) -> Result<MethodResponse, DecodeError> {
    let root = parse_document(xml)?;
    root.expect("methodResponse", "<methodResponse>")?;

    let body = root.only_child("<params> or <fault>")?;
    match body.name.as_str() {
        "fault" => {
            let value = decode_value(body.only_child("<value>")?)?;
            Fault::from_value(&value)
                .map(MethodResponse::Fault)
                .ok_or(DecodeError::MissingFaultString)
        }
        "params" => {
            let mut params = decode_params(body)?;
            match params.len() {
                1 => Ok(MethodResponse::Success(params.remove(0))),
                n => Err(DecodeError::ParamCount(n)),
            }
        }
        _ => Err(DecodeError::UnexpectedElement {
            expected: "<params> or <fault>",
            found: body.name.clone(),
        }),
    }
}

/// Parse a `<methodCall>` document.
///
/// # Errors
///
/// Returns [`DecodeError`] when the document is not a well-formed method call.
pub fn parse_call(xml: &str) -> Result<MethodCall, DecodeError> {
    let root = parse_document(xml)?;
    root.expect("methodCall", "<methodCall>")?;

    let mut method = None;
    let mut params = Vec::new();
    for child in &root.children {
        match child.name.as_str() {
            "methodName" => method = Some(child.text.trim().to_owned()),
            "params" => params = decode_params(child)?,
            _ => {
                return Err(DecodeError::UnexpectedElement {
                    expected: "<methodName> or <params>",
                    found: child.name.clone(),
                });
            }
        }
    }

    let method = method.ok_or(DecodeError::Missing("methodName"))?;
    Ok(MethodCall { method, params })
}

/// Parse a standalone `<value>` fragment.
///
/// # Errors
///
/// Returns [`DecodeError`] when the fragment is not a valid XML-RPC value.
pub fn parse_value(xml: &str) -> Result<Value, DecodeError> {
    decode_value(&parse_document(xml)?)
}

/// Minimal element tree: enough structure for XML-RPC, nothing more.
#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<Self>,
    /// Unescaped text content, including whitespace between child tags.
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
            ..Self::default()
        }
    }

    fn expect(&self, name: &str, expected: &'static str) -> Result<(), DecodeError> {
        if self.name == name {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedElement {
                expected,
                found: self.name.clone(),
            })
        }
    }

    /// The single child element, which must exist and be alone.
    fn only_child(&self, expected: &'static str) -> Result<&Self, DecodeError> {
        match self.children.as_slice() {
            [child] => Ok(child),
            [] => Err(DecodeError::Missing(expected)),
            [_, extra, ..] => Err(DecodeError::UnexpectedElement {
                expected,
                found: extra.name.clone(),
            }),
        }
    }

    fn child(&self, name: &'static str) -> Result<&Self, DecodeError> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .ok_or(DecodeError::Missing(name))
    }

    fn ensure_leaf(&self) -> Result<(), DecodeError> {
        match self.children.first() {
            None => Ok(()),
            Some(child) => Err(DecodeError::UnexpectedElement {
                expected: "text content",
                found: child.name.clone(),
            }),
        }
    }
}

fn parse_document(xml: &str) -> Result<Element, DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(DecodeError::TrailingContent);
                }
                stack.push(Element::open(&start));
            }
            Event::Empty(start) => attach(&mut stack, &mut root, Element::open(&start))?,
            // quick-xml already verified that the end tag matches.
            Event::End(_) => {
                let element = stack.pop().ok_or(DecodeError::TrailingContent)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(DecodeError::TrailingContent),
                }
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes)?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(text),
                    None => return Err(DecodeError::TrailingContent),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(DecodeError::Unclosed(open.name));
    }
    root.ok_or(DecodeError::Empty)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DecodeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DecodeError::TrailingContent),
    }
    Ok(())
}

fn decode_params(params: &Element) -> Result<Vec<Value>, DecodeError> {
    params
        .children
        .iter()
        .map(|param| {
            param.expect("param", "<param>")?;
            decode_value(param.only_child("<value>")?)
        })
        .collect()
}

fn decode_value(element: &Element) -> Result<Value, DecodeError> {
    element.expect("value", "<value>")?;

    // A <value> without a type element is a string.
    if element.children.is_empty() {
        return Ok(Value::String(element.text.clone()));
    }

    let typed = element.only_child("a typed value")?;
    match typed.name.as_str() {
        "int" | "i4" | "i8" => {
            typed.ensure_leaf()?;
            parse_int(&typed.text).map(Value::Int)
        }
        "double" => {
            typed.ensure_leaf()?;
            parse_double(&typed.text).map(Value::Double)
        }
        "boolean" => {
            typed.ensure_leaf()?;
            parse_bool(&typed.text).map(Value::Bool)
        }
        "string" => {
            typed.ensure_leaf()?;
            Ok(Value::String(typed.text.clone()))
        }
        "array" => decode_array(typed),
        "struct" => decode_struct(typed),
        other => Err(DecodeError::Unsupported(other.to_owned())),
    }
}

fn decode_array(array: &Element) -> Result<Value, DecodeError> {
    let data = array.only_child("<data>")?;
    data.expect("data", "<data>")?;
    data.children
        .iter()
        .map(decode_value)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn decode_struct(element: &Element) -> Result<Value, DecodeError> {
    let mut members = Struct::with_capacity(element.children.len());
    for member in &element.children {
        member.expect("member", "<member>")?;
        let name = member.child("name")?;
        name.ensure_leaf()?;
        let value = decode_value(member.child("value")?)?;
        members.insert(name.text.trim().to_owned(), value);
    }
    Ok(Value::Struct(members))
}

fn parse_int(text: &str) -> Result<i64, DecodeError> {
    text.trim().parse().map_err(|_| DecodeError::InvalidScalar {
        kind: "int",
        text: text.to_owned(),
    })
}

fn parse_double(text: &str) -> Result<f64, DecodeError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| DecodeError::InvalidScalar {
            kind: "double",
            text: text.to_owned(),
        })
}

fn parse_bool(text: &str) -> Result<bool, DecodeError> {
    match text.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        _ => Err(DecodeError::InvalidScalar {
            kind: "boolean",
            text: text.to_owned(),
        }),
    }
}

//! Value → markup.

use std::borrow::Cow;
use std::fmt::Write;

use super::value::Value;

/// Encode a value as its type tag, e.g. `<int>42</int>`.
///
/// The result is the content of a `<value>` element, without the wrapper.
/// Non-finite doubles render as Rust prints them (`NaN`, `inf`), which no
/// XML-RPC server accepts; callers must not send them.
#[must_use]
pub fn encode_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Escape `&`, `<` and `>` for use in element text.
///
/// Single pass, so an `&` introduced by escaping is never escaped again.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

pub(crate) fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Int(n) => {
            let _ = write!(out, "<int>{n}</int>");
        }
        // f64's Display is the shortest string that parses back to the same
        // value and never uses exponent notation.
        Value::Double(n) => {
            let _ = write!(out, "<double>{n}</double>");
        }
        Value::Bool(b) => {
            out.push_str(if *b {
                "<boolean>1</boolean>"
            } else {
                "<boolean>0</boolean>"
            });
        }
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                out.push_str("<value>");
                write_value(out, item);
                out.push_str("</value>");
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members.iter() {
                out.push_str("<member><name>");
                out.push_str(&escape(name));
                out.push_str("</name><value>");
                write_value(out, member);
                out.push_str("</value></member>");
            }
            out.push_str("</struct>");
        }
    }
}

//! Codec error types.

use thiserror::Error;

/// Errors raised while decoding an XML-RPC document.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A CDATA section did not contain valid UTF-8.
    #[error("invalid UTF-8 in CDATA section: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The document contained no root element.
    #[error("empty document")]
    Empty,

    /// An element was left open at the end of the document.
    #[error("unclosed element <{0}>")]
    Unclosed(String),

    /// Content appeared after the root element was closed.
    #[error("unexpected content after the root element")]
    TrailingContent,

    /// An element appeared where a different one was expected.
    #[error("unexpected element <{found}>, expected {expected}")]
    UnexpectedElement {
        /// What the decoder was looking for.
        expected: &'static str,
        /// The element name actually found.
        found: String,
    },

    /// A required child element was missing.
    #[error("missing <{0}> element")]
    Missing(&'static str),

    /// A scalar tag held text that does not parse as its type.
    #[error("invalid {kind} value {text:?}")]
    InvalidScalar {
        /// The scalar tag name (`int`, `double`, `boolean`).
        kind: &'static str,
        /// The offending text.
        text: String,
    },

    /// A value tag this codec does not support (`nil`, `base64`, ...).
    #[error("unsupported value type <{0}>")]
    Unsupported(String),

    /// A fault response without a string `faultString` member.
    #[error("fault response has no faultString")]
    MissingFaultString,

    /// A response carried zero or several `<param>` elements.
    #[error("expected exactly one <param> in response, found {0}")]
    ParamCount(usize),
}

/// Errors raised while converting foreign data into a [`Value`](super::Value).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// XML-RPC has no null tag.
    #[error("null cannot be encoded as an XML-RPC value")]
    Null,
}

//! XML-RPC codec.
//!
//! Converts between [`Value`] trees and the XML-RPC wire format spoken by
//! Odoo's `/xmlrpc/2/*` endpoints.
//!
//! # Encoding
//!
//! Encoding is infallible and produces minified markup. Strings escape `&`,
//! `<` and `>`; struct members keep insertion order so output is
//! deterministic.
//!
//! # Decoding
//!
//! Decoding runs the document through `quick-xml`, builds a small element
//! tree and then interprets it. Whitespace between tags is ignored, entities
//! inside `<string>` and `<name>` are unescaped, and faults come back as
//! [`MethodResponse::Fault`] rather than an error so callers can tell a
//! remote failure from a malformed document.
//!
//! # Example
//!
//! ```rust
//! use costos_core::xmlrpc::{MethodCall, Value, parse_call};
//!
//! let call = MethodCall::new("search_count", vec![Value::from("product.template")]);
//! let parsed = parse_call(&call.to_xml()).expect("round trip");
//! assert_eq!(parsed, call);
//! ```

mod decode;
mod encode;
mod error;
mod message;
mod value;

pub use decode::{parse_call, parse_response, parse_value};
pub use encode::{encode_value, escape};
pub use error::{DecodeError, ValueError};
pub use message::{Fault, MethodCall, MethodResponse};
pub use value::{Struct, Value, ValueKind};

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(Value::Int),
            any::<f64>()
                .prop_filter("finite", |n| n.is_finite())
                .prop_map(Value::Double),
            any::<bool>().prop_map(Value::Bool),
            "[ -~áéíóúñ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-z_]{1,8}", inner), 0..4)
                    .prop_map(|members| Value::Struct(members.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_response_round_trips(value in arb_value()) {
            let xml = MethodResponse::Success(value.clone()).to_xml();
            let decoded = parse_response(&xml).expect("decode").into_result().expect("no fault");
            prop_assert_eq!(decoded.kind(), value.kind());
            prop_assert_eq!(decoded, value);
        }

        #[test]
        fn prop_call_round_trips(method in "[a-z_.]{1,16}", params in prop::collection::vec(arb_value(), 0..4)) {
            let call = MethodCall::new(method, params);
            prop_assert_eq!(parse_call(&call.to_xml()).expect("decode"), call);
        }

        #[test]
        fn prop_fault_round_trips(code in any::<i64>(), message in "[ -~]{0,24}") {
            let fault = Fault::new(code, message);
            let decoded = parse_response(&MethodResponse::Fault(fault.clone()).to_xml()).expect("decode");
            prop_assert_eq!(decoded, MethodResponse::Fault(fault));
        }
    }

    #[test]
    fn test_round_trip_keeps_integer_and_double_tags() {
        for value in [Value::Int(42), Value::Double(42.5), Value::Double(42.0)] {
            let xml = MethodResponse::Success(value.clone()).to_xml();
            let decoded = parse_response(&xml)
                .expect("decode")
                .into_result()
                .expect("no fault");
            assert_eq!(decoded.kind(), value.kind());
        }
    }

    #[test]
    fn test_round_trip_escaped_string() {
        let value = Value::from("a & b < c > d");
        let xml = MethodResponse::Success(value.clone()).to_xml();
        assert!(xml.contains("a &amp; b &lt; c &gt; d"));
        assert_eq!(
            parse_response(&xml)
                .expect("decode")
                .into_result()
                .expect("no fault"),
            value
        );
    }
}

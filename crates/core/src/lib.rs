//! Costos Core - XML-RPC codec and shared types.
//!
//! This crate provides the pieces shared by every Costos component:
//! - `odoo` - Odoo XML-RPC client and catalog operations
//! - `cli` - Operator command-line tools
//! - `integration-tests` - Stub Odoo server and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Encoding and decoding XML-RPC documents is deterministic and can
//! be tested without a server.
//!
//! # Modules
//!
//! - [`xmlrpc`] - XML-RPC values, method calls, responses and faults
//! - [`types`] - Newtype wrappers for Odoo record IDs and validated costs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod xmlrpc;

pub use types::*;
pub use xmlrpc::{
    DecodeError, Fault, MethodCall, MethodResponse, Struct, Value, ValueError, ValueKind,
};

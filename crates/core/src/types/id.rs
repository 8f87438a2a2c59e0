//! Newtype IDs for Odoo record references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally passing a category ID where a product ID is expected.

/// Macro to define a type-safe Odoo record ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Into<i64>` and `Into<Value>` implementations
///
/// # Example
///
/// ```rust
/// # use costos_core::define_id;
/// define_id!(WarehouseId);
/// define_id!(LocationId);
///
/// let warehouse = WarehouseId::new(1);
/// let location = LocationId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: WarehouseId = location;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<$name> for $crate::xmlrpc::Value {
            fn from(id: $name) -> Self {
                Self::Int(id.0)
            }
        }
    };
}

// Odoo `res.users` id returned by `authenticate`
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(CompanyId);

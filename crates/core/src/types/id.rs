//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. All IDs in this
//! system are strings assigned by external services: user IDs come from the
//! auth provider, cart item IDs from the data store, payment keys from the
//! payment processor.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use face_calendar_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new("user_2aBcD");
/// let order_id = OrderId::new("order_01");
///
/// // These are different types, so this won't compile:
/// // let _: UserId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the underlying `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the ID is empty or whitespace-only.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Standard entity IDs
define_id!(UserId);
define_id!(OrderId);
define_id!(CartItemId);
define_id!(PaymentKey);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = OrderId::new("order_abc123");
        assert_eq!(id.as_str(), "order_abc123");
        assert_eq!(id.to_string(), "order_abc123");
        assert_eq!(String::from(id), "order_abc123");
    }

    #[test]
    fn test_id_equality() {
        assert_eq!(UserId::new("u1"), UserId::from("u1"));
        assert_ne!(UserId::new("u1"), UserId::new("u2"));
    }

    #[test]
    fn test_id_is_empty() {
        assert!(CartItemId::new("").is_empty());
        assert!(CartItemId::new("   ").is_empty());
        assert!(!CartItemId::new("c1").is_empty());
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = PaymentKey::new("pk_test");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"pk_test\"");

        let back: PaymentKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

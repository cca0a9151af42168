//! Per-type field declarations.
//!
//! A configuration structure describes its fields once, as a `'static` table
//! of [`FieldSpec`]s, and hands out mutable views of the same fields in the
//! same order. The [`specification!`](crate::specification) macro writes both
//! halves from a short field list:
//!
//! ```rust
//! use confstack::specification;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! specification!(Server {
//!     host(env = "HOSTNAME", default = "localhost"),
//!     port(default = "8080"),
//! });
//! ```

use crate::coerce::Value;

/// Declaration of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    name: &'static str,
    default: Option<&'static str>,
    env: Option<&'static str>,
    ignored: bool,
    embedded: bool,
}

impl FieldSpec {
    /// Declare a field with no annotations.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            env: None,
            ignored: false,
            embedded: false,
        }
    }

    /// Literal applied by the default pass.
    pub const fn with_default(self, value: &'static str) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    /// Name used in place of the field name when building the environment key.
    pub const fn with_env(self, name: &'static str) -> Self {
        Self {
            env: Some(name),
            ..self
        }
    }

    /// Exclude the field from the default and environment passes.
    pub const fn ignored(self) -> Self {
        Self {
            ignored: true,
            ..self
        }
    }

    /// Nested structure whose fields are keyed as if they belonged to the parent.
    pub const fn embedded(self) -> Self {
        Self {
            embedded: true,
            ..self
        }
    }

    /// Field name, without any raw identifier prefix.
    pub fn name(&self) -> &'static str {
        self.name.strip_prefix("r#").unwrap_or(self.name)
    }

    /// Declared default literal, if any.
    pub fn default_value(&self) -> Option<&'static str> {
        self.default
    }

    /// Declared environment name override, if any.
    pub fn env_name(&self) -> Option<&'static str> {
        self.env
    }

    /// Whether the default and environment passes skip this field.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Whether nested fields are keyed without this field's name.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// The override name when declared, otherwise the field name.
    pub fn key_name(&self) -> &'static str {
        self.env.unwrap_or_else(|| self.name())
    }

    /// Environment variable consulted for this field under `prefix`.
    ///
    /// `port` under prefix `app` becomes `APP_PORT`; with no prefix it is `PORT`.
    pub fn env_key(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.key_name().to_uppercase()
        } else {
            format!("{}_{}", prefix, self.key_name()).to_uppercase()
        }
    }
}

/// A configuration structure the loader can walk.
///
/// `schema` and `fields_mut` must describe the same fields in the same order.
pub trait Specification {
    /// The field declaration table for this type.
    fn schema(&self) -> &'static [FieldSpec];

    /// Mutable views of the declared fields, in `schema` order.
    fn fields_mut(&mut self) -> Vec<&mut dyn Value>;

    /// This structure seen as a field value, for capability checks.
    fn as_value(&mut self) -> &mut dyn Value;
}

/// Implement [`Specification`] and [`Value`] for a struct from a field list.
///
/// Each field may carry options in parentheses:
///
/// - `default = "literal"`: applied by the default pass
/// - `env = "NAME"`: replaces the field name in the environment key
/// - `ignored`: never touched by the default or environment pass
/// - `embedded`: nested structure that adds no key segment
///
/// Capabilities the struct implements itself are listed after a colon
/// (`decoder`, `setter`, `text`). A struct with a capability is still
/// walked by the default pass but converted as a single value by the
/// environment pass. File members are always applied field by field.
///
/// ```rust
/// use confstack::{specification, BoxError, Setter};
///
/// #[derive(Debug, Default)]
/// struct Endpoint {
///     host: String,
///     port: u16,
/// }
///
/// impl Setter for Endpoint {
///     fn set(&mut self, value: &str) -> Result<(), BoxError> {
///         let (host, port) = value.split_once(':').ok_or("expected host:port")?;
///         self.host = host.to_string();
///         self.port = port.parse()?;
///         Ok(())
///     }
/// }
///
/// specification!(Endpoint: setter {
///     host(default = "localhost"),
///     port(default = "80"),
/// });
/// ```
///
/// [`Value`]: crate::Value
#[macro_export]
macro_rules! specification {
    (@field $spec:expr ;) => {
        $spec
    };
    (@field $spec:expr ; default = $value:literal $(, $($rest:tt)*)?) => {
        $crate::specification!(@field $spec.with_default($value) ; $($($rest)*)?)
    };
    (@field $spec:expr ; env = $value:literal $(, $($rest:tt)*)?) => {
        $crate::specification!(@field $spec.with_env($value) ; $($($rest)*)?)
    };
    (@field $spec:expr ; ignored $(, $($rest:tt)*)?) => {
        $crate::specification!(@field $spec.ignored() ; $($($rest)*)?)
    };
    (@field $spec:expr ; embedded $(, $($rest:tt)*)?) => {
        $crate::specification!(@field $spec.embedded() ; $($($rest)*)?)
    };
    (
        $ty:ty $(: $($capability:ident),+)? {
            $($field:ident $(( $($option:tt)* ))?),* $(,)?
        }
    ) => {
        impl $crate::Specification for $ty {
            fn schema(&self) -> &'static [$crate::FieldSpec] {
                const SCHEMA: &[$crate::FieldSpec] = &[
                    $($crate::specification!(
                        @field $crate::FieldSpec::new(stringify!($field)) ; $($($option)*)?
                    )),*
                ];
                SCHEMA
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<&mut dyn $crate::Value> {
                ::std::vec![$(&mut self.$field as &mut dyn $crate::Value),*]
            }

            fn as_value(&mut self) -> &mut dyn $crate::Value {
                self
            }
        }

        impl $crate::Value for $ty {
            fn as_specification(&mut self) -> ::std::option::Option<&mut dyn $crate::Specification> {
                ::std::option::Option::Some(self)
            }

            fn is_specification() -> bool {
                true
            }

            fn merge_json(
                &mut self,
                json: $crate::merge::Json,
            ) -> ::std::result::Result<(), $crate::merge::JsonError> {
                $crate::merge::merge_fields(self, json)
            }

            $($($crate::__capability!($capability);)+)?
        }
    };
}

/// Implement [`Value`](crate::Value) for a leaf type that converts itself.
///
/// Capabilities are `decoder`, `setter` and `text`, plus `json` for types
/// that implement `serde::Deserialize` and should read file members through
/// it. Without `json`, a file member is accepted only as a string for a
/// `text` type.
///
/// ```rust
/// use confstack::{value, BoxError, TextUnmarshaler};
///
/// #[derive(Debug, Default)]
/// struct Hex(Vec<u8>);
///
/// impl TextUnmarshaler for Hex {
///     fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), BoxError> {
///         let text = std::str::from_utf8(text)?;
///         let mut bytes = Vec::new();
///         for i in (0..text.len()).step_by(2) {
///             let pair = text.get(i..i + 2).ok_or("odd number of hex digits")?;
///             bytes.push(u8::from_str_radix(pair, 16)?);
///         }
///         self.0 = bytes;
///         Ok(())
///     }
/// }
///
/// value!(Hex: text);
/// ```
#[macro_export]
macro_rules! value {
    ($ty:ty $(: $($capability:ident),+)?) => {
        impl $crate::Value for $ty {
            $($($crate::__capability!($capability);)+)?
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capability {
    (decoder) => {
        fn as_decoder(&mut self) -> ::std::option::Option<&mut dyn $crate::Decoder> {
            ::std::option::Option::Some(self)
        }
    };
    (setter) => {
        fn as_setter(&mut self) -> ::std::option::Option<&mut dyn $crate::Setter> {
            ::std::option::Option::Some(self)
        }
    };
    (text) => {
        fn as_text_unmarshaler(
            &mut self,
        ) -> ::std::option::Option<&mut dyn $crate::TextUnmarshaler> {
            ::std::option::Option::Some(self)
        }
    };
    (json) => {
        fn merge_json(
            &mut self,
            json: $crate::merge::Json,
        ) -> ::std::result::Result<(), $crate::merge::JsonError> {
            $crate::merge::from_json(self, json)
        }
    };
}

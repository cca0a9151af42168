//! String coercion engine.
//!
//! Every field type implements [`Value`]. A value either exposes one of the
//! custom conversion capabilities ([`Decoder`], [`Setter`],
//! [`TextUnmarshaler`]), which take priority in that order, or converts the
//! string itself through [`Value::assign`].
//!
//! Built-in conversions:
//!
//! | Kind | Accepted input |
//! |------|----------------|
//! | `String`, `PathBuf` | any string, verbatim |
//! | signed/unsigned integers | decimal, `0x`, `0o`, `0b`, leading-zero octal, `_` separators |
//! | `bool` | `1 t T TRUE true True` / `0 f F FALSE false False` |
//! | `f32`, `f64` | decimal, scientific, `inf`, `nan` |
//! | `Duration` | `300ms`, `5s`, `2h30m`, `1.5h` |
//! | `IpAddr`, `SocketAddr` | standard textual forms |
//! | `Vec<T>` | comma separated `T` literals |
//! | `Option<T>`, `Box<T>` | as `T`, allocating when absent |
//!
//! Anything else (maps, for instance) is left untouched.
//!
//! The same types also accept JSON members from configuration files through
//! [`Value::merge_json`].

mod duration;
mod error;
mod number;

pub use error::{BoxError, CoerceError};

use crate::merge::{custom_error, json_kind, unmarshal_json_text, Json, JsonError};
use crate::schema::Specification;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;

/// Types that decode themselves from a string. Checked before [`Setter`].
pub trait Decoder {
    fn decode(&mut self, value: &str) -> Result<(), BoxError>;
}

/// Types that can set themselves from a string.
pub trait Setter {
    fn set(&mut self, value: &str) -> Result<(), BoxError>;
}

/// Types that deserialize themselves from UTF-8 text. Checked last.
pub trait TextUnmarshaler {
    fn unmarshal_text(&mut self, text: &[u8]) -> Result<(), BoxError>;
}

/// A field value the loader can write to.
///
/// The capability queries return `None` by default; a type opts into custom
/// conversion by returning `Some(self)` from one of them (the [`value!`] and
/// [`specification!`] macros generate this). `assign` is the built-in
/// conversion used when no capability is exposed; its default is a no-op.
///
/// [`value!`]: crate::value
/// [`specification!`]: crate::specification
pub trait Value {
    fn as_decoder(&mut self) -> Option<&mut dyn Decoder> {
        None
    }

    fn as_setter(&mut self) -> Option<&mut dyn Setter> {
        None
    }

    fn as_text_unmarshaler(&mut self) -> Option<&mut dyn TextUnmarshaler> {
        None
    }

    /// Nested structure view. Absent optional structures are allocated here.
    fn as_specification(&mut self) -> Option<&mut dyn Specification> {
        None
    }

    /// Whether values of this type are (or wrap) a nested structure.
    fn is_specification() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Convert `raw` into this value's type and store it.
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        let _ = raw;
        Ok(())
    }

    /// Apply a JSON member from a configuration file.
    ///
    /// The default accepts `null` as a no-op and hands strings to the
    /// [`TextUnmarshaler`] capability; anything else is rejected.
    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        let type_name = self.type_name();
        match json {
            Json::Null => Ok(()),
            Json::String(text) => {
                unmarshal_json_text(self.as_text_unmarshaler(), &type_name, &text)
            }
            other => Err(custom_error(format_args!(
                "{type_name} cannot be read from a JSON {}",
                json_kind(&other)
            ))),
        }
    }

    /// Type name used in error messages, without module paths.
    fn type_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Strip module paths from a full type name: `alloc::vec::Vec<core::time::Duration>`
/// becomes `Vec<Duration>`.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    for piece in full.split_inclusive(|c: char| "<>,()[]&; ".contains(c)) {
        let (path, delimiter) = match piece.char_indices().last() {
            Some((at, c)) if "<>,()[]&; ".contains(c) => piece.split_at(at),
            _ => (piece, ""),
        };
        short.push_str(path.rsplit("::").next().unwrap_or(path));
        short.push_str(delimiter);
    }
    short
}

/// Convert `raw` into `value`, preferring custom capabilities over the
/// built-in conversion.
pub fn coerce(value: &mut dyn Value, raw: &str) -> Result<(), CoerceError> {
    if let Some(decoder) = value.as_decoder() {
        return decoder.decode(raw).map_err(CoerceError::Custom);
    }
    if let Some(setter) = value.as_setter() {
        return setter.set(raw).map_err(CoerceError::Custom);
    }
    if let Some(text) = value.as_text_unmarshaler() {
        return text
            .unmarshal_text(raw.as_bytes())
            .map_err(CoerceError::Custom);
    }
    value.assign(raw)
}

/// Whether `value` exposes any custom conversion capability.
pub(crate) fn has_capability(value: &mut dyn Value) -> bool {
    value.as_decoder().is_some()
        || value.as_setter().is_some()
        || value.as_text_unmarshaler().is_some()
}

impl Value for String {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        raw.clone_into(self);
        Ok(())
    }

    crate::__capability!(json);
}

impl Value for PathBuf {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = PathBuf::from(raw);
        Ok(())
    }

    crate::__capability!(json);
}

impl Value for bool {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => return Err(CoerceError::syntax(raw)),
        };
        Ok(())
    }

    crate::__capability!(json);
}

macro_rules! from_str_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Value for $ty {
                fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
                    *self = raw.parse().map_err(|e| CoerceError::Custom(Box::new(e)))?;
                    Ok(())
                }

                crate::__capability!(json);
            }
        )*
    };
}

from_str_value!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl<T: Value + Default> Value for Option<T> {
    fn as_specification(&mut self) -> Option<&mut dyn Specification> {
        if self.is_none() && !T::is_specification() {
            return None;
        }
        self.get_or_insert_with(T::default).as_specification()
    }

    fn is_specification() -> bool {
        T::is_specification()
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        coerce(self.get_or_insert_with(T::default), raw)
    }

    /// `null` clears the option; anything else is applied to the contents,
    /// which are only allocated once the member has been accepted.
    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        if json.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(inner) => inner.merge_json(json),
            None => {
                let mut inner = T::default();
                inner.merge_json(json)?;
                *self = Some(inner);
                Ok(())
            }
        }
    }

    fn type_name(&self) -> String {
        match self {
            Some(inner) => inner.type_name(),
            None => short_type_name(std::any::type_name::<T>()),
        }
    }
}

impl<T: Value> Value for Box<T> {
    fn as_decoder(&mut self) -> Option<&mut dyn Decoder> {
        (**self).as_decoder()
    }

    fn as_setter(&mut self) -> Option<&mut dyn Setter> {
        (**self).as_setter()
    }

    fn as_text_unmarshaler(&mut self) -> Option<&mut dyn TextUnmarshaler> {
        (**self).as_text_unmarshaler()
    }

    fn as_specification(&mut self) -> Option<&mut dyn Specification> {
        (**self).as_specification()
    }

    fn is_specification() -> bool {
        T::is_specification()
    }

    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        (**self).assign(raw)
    }

    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        (**self).merge_json(json)
    }

    fn type_name(&self) -> String {
        (**self).type_name()
    }
}

impl<T: Value + Default> Value for Vec<T> {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        let mut items = Vec::new();
        for (index, piece) in raw.split(',').enumerate() {
            let mut item = T::default();
            coerce(&mut item, piece).map_err(|e| CoerceError::element(index, e))?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }

    /// A JSON array replaces the list once every element is accepted; `null`
    /// empties it.
    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        let elements = match json {
            Json::Null => {
                self.clear();
                return Ok(());
            }
            Json::Array(elements) => elements,
            other => {
                return Err(custom_error(format_args!(
                    "expected an array, found {}",
                    json_kind(&other)
                )))
            }
        };
        let mut items = Vec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            let mut item = T::default();
            item.merge_json(element)
                .map_err(|e| custom_error(format_args!("element {index}: {e}")))?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }
}

/// Maps have no string form. File members add entries to the map; `null`
/// empties it.
impl<K, V, S> Value for HashMap<K, V, S>
where
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
    S: BuildHasher,
{
    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        if json.is_null() {
            self.clear();
            return Ok(());
        }
        let entries: HashMap<K, V> = serde_json::from_value(json)?;
        self.extend(entries);
        Ok(())
    }
}

impl<K, V> Value for BTreeMap<K, V>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    fn merge_json(&mut self, json: Json) -> Result<(), JsonError> {
        if json.is_null() {
            self.clear();
            return Ok(());
        }
        let entries: BTreeMap<K, V> = serde_json::from_value(json)?;
        self.extend(entries);
        Ok(())
    }
}

//! File-merge pass: overlay JSON documents onto a specification.
//!
//! Every file is optional. A path that cannot be read, or whose contents are
//! not valid JSON, is skipped. A valid document is applied member by member:
//!
//! - members are matched to declared fields by name, exactly first and then
//!   ignoring ASCII case
//! - only fields named in the document are written
//! - a member that does not fit its field leaves that field alone; the rest
//!   of the document is still applied
//!
//! Fields left out of the declaration list are never touched.

use crate::coerce::{TextUnmarshaler, Value};
use crate::schema::Specification;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Map;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, trace};

pub use serde_json::{Error as JsonError, Value as Json};

/// Why a file contributed nothing.
#[derive(Debug, Error)]
enum SkipReason {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    Syntax(#[from] JsonError),
}

/// Merge each file in order; later files win over earlier ones.
pub fn merge_files<P: AsRef<Path>>(spec: &mut dyn Specification, paths: &[P]) {
    for path in paths {
        let path = path.as_ref();
        let document = match read_document(path) {
            Ok(document) => document,
            Err(reason) => {
                debug!(path = %path.display(), %reason, "skipping configuration file");
                continue;
            }
        };
        match merge_fields(spec, document) {
            Ok(()) => debug!(path = %path.display(), "merged configuration file"),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "configuration file partially applied")
            }
        }
    }
}

fn read_document(path: &Path) -> Result<Json, SkipReason> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Apply a JSON document to the declared fields of `spec`.
///
/// Every member is attempted. The first failure is returned once the rest
/// of the document has been applied. `null` is a no-op, and a string is
/// handed to the structure's [`TextUnmarshaler`] when it has one.
pub fn merge_fields(spec: &mut dyn Specification, document: Json) -> Result<(), JsonError> {
    let mut members = match document {
        Json::Null => return Ok(()),
        Json::Object(members) => members,
        Json::String(text) => {
            let value = spec.as_value();
            let type_name = value.type_name();
            return unmarshal_json_text(value.as_text_unmarshaler(), &type_name, &text);
        }
        other => {
            return Err(custom_error(format_args!(
                "expected an object, found {}",
                json_kind(&other)
            )))
        }
    };

    let schema = spec.schema();
    let mut first_error = None;
    for (field, value) in schema.iter().zip(spec.fields_mut()) {
        let Some(member) = take_member(&mut members, field.name()) else {
            continue;
        };
        trace!(field = field.name(), "applying file value");
        if let Err(err) = Value::merge_json(value, member) {
            first_error
                .get_or_insert_with(|| custom_error(format_args!("{}: {err}", field.name())));
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Replace `slot` with the deserialized document; `null` leaves it alone.
pub fn from_json<T: DeserializeOwned>(slot: &mut T, json: Json) -> Result<(), JsonError> {
    if json.is_null() {
        return Ok(());
    }
    *slot = serde_json::from_value(json)?;
    Ok(())
}

/// Remove the member for `name`, preferring an exact key match.
fn take_member(members: &mut Map<String, Json>, name: &str) -> Option<Json> {
    if let Some(member) = members.remove(name) {
        return Some(member);
    }
    let key = members
        .keys()
        .find(|key| key.eq_ignore_ascii_case(name))?
        .clone();
    members.remove(&key)
}

pub(crate) fn unmarshal_json_text(
    target: Option<&mut dyn TextUnmarshaler>,
    type_name: &str,
    text: &str,
) -> Result<(), JsonError> {
    match target {
        Some(target) => target.unmarshal_text(text.as_bytes()).map_err(custom_error),
        None => Err(custom_error(format_args!(
            "{type_name} cannot be read from a JSON string"
        ))),
    }
}

pub(crate) fn custom_error(message: impl Display) -> JsonError {
    JsonError::custom(message)
}

pub(crate) fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

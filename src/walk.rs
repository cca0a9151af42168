//! Structure walker shared by the default and environment passes.
//!
//! Both passes visit every declared, non-ignored field depth first, in
//! declaration order. Optional nested structures are allocated on the way
//! down. A conversion failure stops the walk; fields already written stay
//! written.

use crate::coerce::{coerce, has_capability, Value};
use crate::env::Environment;
use crate::error::{ConfigResult, ParseError};
use crate::schema::{FieldSpec, Specification};
use tracing::trace;

/// Apply declared defaults to every field of `spec`, recursing into nested
/// structures regardless of their capabilities.
pub fn fill_defaults(spec: &mut dyn Specification) -> ConfigResult<()> {
    let schema = spec.schema();
    for (field, value) in schema.iter().zip(spec.fields_mut()) {
        if field.is_ignored() {
            continue;
        }

        if let Some(nested) = value.as_specification() {
            fill_defaults(nested)?;
            continue;
        }

        if let Some(default) = field.default_value() {
            trace!(field = field.name(), "applying default");
            coerce(value, default).map_err(|source| {
                ParseError::default_value(field.name(), value.type_name(), default, source)
            })?;
        }
    }
    Ok(())
}

/// Overlay environment values onto `spec`.
///
/// Keys are built from `prefix` and the field path; nested structures that
/// expose a conversion capability are read as a single value instead of
/// being walked.
pub fn fill_environment(
    spec: &mut dyn Specification,
    prefix: &str,
    env: &dyn Environment,
) -> ConfigResult<()> {
    let schema = spec.schema();
    for (field, value) in schema.iter().zip(spec.fields_mut()) {
        if field.is_ignored() {
            continue;
        }

        let key = field.env_key(prefix);

        if let Some(nested) = value.as_specification() {
            if !has_capability(nested.as_value()) {
                let child_prefix = if field.is_embedded() { prefix } else { key.as_str() };
                fill_environment(nested, child_prefix, env)?;
                continue;
            }
            assign_from_env(nested.as_value(), field, &key, env)?;
            continue;
        }

        assign_from_env(value, field, &key, env)?;
    }
    Ok(())
}

fn assign_from_env(
    value: &mut dyn Value,
    field: &FieldSpec,
    key: &str,
    env: &dyn Environment,
) -> ConfigResult<()> {
    let Some(raw) = env.lookup(key) else {
        return Ok(());
    };

    trace!(key, "applying environment value");
    coerce(value, &raw).map_err(|source| {
        ParseError::environment(key, field.key_name(), value.type_name(), raw.as_str(), source)
    })?;
    Ok(())
}

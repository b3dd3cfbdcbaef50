/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion stage (`!s`, `!r`, `!a`, and registered tags).

use crate::error::{TemplateError, TemplateResult};
use crate::registry::HookRegistry;
use crate::value::Value;
use std::borrow::Cow;

/// Apply an optional conversion tag to a resolved value.
///
/// Without a tag the value passes through untouched. With a tag the result
/// is always a [`Value::Str`]. Registered hooks are consulted before the
/// built-in tags.
pub fn convert_value<'a>(
    value: &'a Value,
    conversion: Option<char>,
    hooks: &HookRegistry,
) -> TemplateResult<Cow<'a, Value>> {
    let Some(tag) = conversion else {
        return Ok(Cow::Borrowed(value));
    };

    if let Some(hook) = hooks.conversion(tag) {
        return Ok(Cow::Owned(Value::Str(hook.convert(value))));
    }

    let converted = match tag {
        's' => value.to_string(),
        'r' => value.repr(),
        'a' => value.ascii(),
        other => return Err(TemplateError::UnknownConversion { conversion: other }),
    };
    Ok(Cow::Owned(Value::Str(converted)))
}

/// Check that `conversion` names a registered or built-in tag without
/// applying it.
pub fn check_conversion(conversion: Option<char>, hooks: &HookRegistry) -> TemplateResult<()> {
    match conversion {
        None | Some('s' | 'r' | 'a') => Ok(()),
        Some(tag) if hooks.conversion(tag).is_some() => Ok(()),
        Some(other) => Err(TemplateError::UnknownConversion { conversion: other }),
    }
}

//! Get-or-default attribute reads.
//!
//! Every read reports whether the default was used instead of patching the
//! element, so decoding never mutates its input. The encoder always writes
//! every attribute, which heals the file on the next save.

use super::{CodecError, CodecResult};
use quick_xml::events::BytesStart;

/// Attribute value plus whether it came from the caller's default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrValue<T> {
    pub value: T,
    pub defaulted: bool,
}

impl<T> AttrValue<T> {
    fn present(value: T) -> Self {
        Self {
            value,
            defaulted: false,
        }
    }

    fn fallback(value: T) -> Self {
        Self {
            value,
            defaulted: true,
        }
    }
}

pub(crate) fn read_string(
    element: &BytesStart<'_>,
    name: &str,
    default: &str,
) -> CodecResult<AttrValue<String>> {
    Ok(match raw_value(element, name)? {
        Some(value) => AttrValue::present(value),
        None => AttrValue::fallback(default.to_string()),
    })
}

/// Reads a boolean attribute; only the exact literals `true` and `false`
/// are accepted.
pub(crate) fn read_bool(
    element: &BytesStart<'_>,
    name: &str,
    default: bool,
) -> CodecResult<AttrValue<bool>> {
    let Some(value) = raw_value(element, name)? else {
        return Ok(AttrValue::fallback(default));
    };
    match value.as_str() {
        "true" => Ok(AttrValue::present(true)),
        "false" => Ok(AttrValue::present(false)),
        _ => Err(parse_error(element, name, value, "`true` or `false`")),
    }
}

/// Reads a decimal integer attribute.
pub(crate) fn read_int(
    element: &BytesStart<'_>,
    name: &str,
    default: i64,
) -> CodecResult<AttrValue<i64>> {
    let Some(value) = raw_value(element, name)? else {
        return Ok(AttrValue::fallback(default));
    };
    match value.trim().parse::<i64>() {
        Ok(parsed) => Ok(AttrValue::present(parsed)),
        Err(_) => Err(parse_error(element, name, value, "a decimal integer")),
    }
}

pub(crate) fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn raw_value(element: &BytesStart<'_>, name: &str) -> CodecResult<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn parse_error(
    element: &BytesStart<'_>,
    attribute: &str,
    value: String,
    expected: &'static str,
) -> CodecError {
    CodecError::Parse {
        element: element_name(element),
        attribute: attribute.to_string(),
        value,
        expected,
    }
}

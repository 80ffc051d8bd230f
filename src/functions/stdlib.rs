//! The standard code unit shipped with the crate.
//!
//! Hosts load their own code units next to this one; descriptors that omit the
//! assembly search this unit too.

use serde_json::{Map, Value};

use super::CodeUnit;
use crate::core::FunctionError;

pub const STD_UNIT: &str = "jsonxform.std";
pub const TEXT: &str = "Text";
pub const COLLECTIONS: &str = "Collections";

pub fn code_unit() -> CodeUnit {
    let declared = CodeUnit::new(STD_UNIT)
        .function(TEXT, "ToUpper", to_upper)
        .and_then(|u| u.function(TEXT, "ToLower", to_lower))
        .and_then(|u| u.function(TEXT, "Format", format))
        .and_then(|u| u.function(TEXT, "KeyValueToObject", keyvalue_to_object))
        .and_then(|u| u.function(COLLECTIONS, "Concat", concat))
        .and_then(|u| u.function(COLLECTIONS, "Count", count));
    match declared {
        Ok(unit) => unit,
        // Names above are distinct literals.
        Err(e) => unreachable!("standard code unit is malformed: {e}"),
    }
}

fn string_arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a str, FunctionError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(FunctionError::Type(format!(
            "{name}: argument {index} must be a string, got {other}"
        ))),
        None => Err(FunctionError::Argument(format!(
            "{name}: missing argument {index}"
        ))),
    }
}

fn expect_arity(args: &[Value], expected: usize, name: &str) -> Result<(), FunctionError> {
    if args.len() != expected {
        return Err(FunctionError::Argument(format!(
            "{name}: expected {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

/// ToUpper(string) -> string
pub fn to_upper(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, "ToUpper")?;
    Ok(Value::String(string_arg(args, 0, "ToUpper")?.to_uppercase()))
}

/// ToLower(string) -> string
pub fn to_lower(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, "ToLower")?;
    Ok(Value::String(string_arg(args, 0, "ToLower")?.to_lowercase()))
}

/// Format(format_string, values_array) -> string
///
/// Each `{}` takes the next value; placeholders without a value stay literal.
/// A null format string yields null.
pub fn format(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity(args, 2, "Format")?;
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let format_string = string_arg(args, 0, "Format")?;
    let values: &[Value] = args[1].as_array().map(Vec::as_slice).unwrap_or(&[]);

    let mut result = String::new();
    let mut values = values.iter();
    let mut parts = format_string.split("{}");
    if let Some(first) = parts.next() {
        result.push_str(first);
    }
    for part in parts {
        match values.next() {
            Some(Value::String(s)) => result.push_str(s),
            Some(other) => result.push_str(&other.to_string()),
            None => result.push_str("{}"),
        }
        result.push_str(part);
    }
    Ok(Value::String(result))
}

/// KeyValueToObject(input, kv_separator, pair_separator) -> object
pub fn keyvalue_to_object(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity(args, 3, "KeyValueToObject")?;
    let input = string_arg(args, 0, "KeyValueToObject")?;
    let kv_sep = string_arg(args, 1, "KeyValueToObject")?;
    let pair_sep = string_arg(args, 2, "KeyValueToObject")?;
    if kv_sep.is_empty() || pair_sep.is_empty() {
        return Err(FunctionError::Argument(
            "KeyValueToObject: separators must not be empty".to_string(),
        ));
    }

    let mut map = Map::new();
    for pair in input.split(pair_sep) {
        let trimmed = pair.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut split = trimmed.splitn(2, kv_sep);
        let key = split.next().unwrap_or("").trim();
        let value = split.next().unwrap_or("").trim();
        if !key.is_empty() {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    Ok(Value::Object(map))
}

/// Concat(values...) -> string
///
/// Registered variadic, the call site passes all arguments as one array.
/// Strings are joined as-is, nulls are skipped, other values use their JSON text.
pub fn concat(args: &[Value]) -> Result<Value, FunctionError> {
    let items: &[Value] = match args {
        [Value::Array(items)] => items,
        _ => args,
    };
    let mut out = String::new();
    for item in items {
        match item {
            Value::Null => {}
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
    }
    Ok(Value::String(out))
}

/// Count(array) -> number
pub fn count(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity(args, 1, "Count")?;
    match &args[0] {
        Value::Array(items) => Ok(Value::from(items.len())),
        other => Err(FunctionError::Type(format!(
            "Count: argument 0 must be an array, got {other}"
        ))),
    }
}

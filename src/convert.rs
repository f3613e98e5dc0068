//! Argument extraction and response shaping.
//!
//! Tools pull typed arguments out of the raw `arguments` object with the
//! `get_*` helpers, and shape upstream payloads into stable result objects.

use serde_json::{json, Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::upstream::Fields;

/// Helper to get a required string argument from JSON arguments.
///
/// Blank strings count as missing; non-string values are invalid.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    get_optional_string(args, name)?.ok_or_else(|| McpError::MissingArg(name.to_string()))
}

fn wrong_type(name: &str, expected: &str, got: &JsonValue) -> McpError {
    let got = match got {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    };
    McpError::InvalidArg {
        name: name.to_string(),
        reason: format!("expected {}, got {}", expected, got),
    }
}

/// Helper to get a required entity ID that is safe to splice into a path.
pub fn get_id_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    let id = get_string_arg(args, name)?;
    validate_id(name, &id)?;
    Ok(id)
}

/// Helper to get an optional entity ID.
pub fn get_optional_id(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match get_optional_string(args, name)? {
        Some(id) => {
            validate_id(name, &id)?;
            Ok(Some(id))
        }
        None => Ok(None),
    }
}

fn validate_id(name: &str, id: &str) -> Result<()> {
    if id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: format!(
                "'{}' may only contain letters, digits, '-' and '_'",
                id
            ),
        })
    }
}

/// Helper to get an optional string argument from JSON arguments.
///
/// Absent, null and blank all mean "not given"; any other non-string is invalid.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_type(name, "a string", other)),
    }
}

/// Helper to get an optional argument restricted to a fixed set of values.
pub fn get_optional_choice(
    args: &Map<String, JsonValue>,
    name: &str,
    allowed: &[&str],
) -> Result<Option<String>> {
    match get_optional_string(args, name)? {
        Some(v) if allowed.contains(&v.as_str()) => Ok(Some(v)),
        Some(v) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: format!("'{}' is not one of: {}", v, allowed.join(", ")),
        }),
        None => Ok(None),
    }
}

/// Helper to get an optional position: "top", "bottom", or a positive number.
pub fn get_optional_position(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    let invalid = |v: &str| McpError::InvalidArg {
        name: name.to_string(),
        reason: format!("'{}' must be 'top', 'bottom', or a positive number", v),
    };
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => match n.as_f64() {
            Some(f) if f > 0.0 => Ok(Some(n.to_string())),
            _ => Err(invalid(&n.to_string())),
        },
        Some(JsonValue::String(s)) => {
            let s = s.trim().to_lowercase();
            if s == "top" || s == "bottom" {
                return Ok(Some(s));
            }
            match s.parse::<f64>() {
                Ok(f) if f > 0.0 => Ok(Some(s)),
                _ => Err(invalid(&s)),
            }
        }
        Some(other) => Err(invalid(&other.to_string())),
    }
}

/// Helper to get an optional u64 argument from JSON arguments.
pub fn get_optional_u64(args: &Map<String, JsonValue>, name: &str) -> Result<Option<u64>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| wrong_type(name, "a non-negative integer", v)),
    }
}

/// Helper to get an optional boolean argument.
///
/// Accepts JSON booleans as well as the strings "true"/"false".
pub fn get_optional_bool(args: &Map<String, JsonValue>, name: &str) -> Result<Option<bool>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(McpError::InvalidArg {
                name: name.to_string(),
                reason: format!("'{}' is not a boolean", s),
            }),
        },
        Some(other) => Err(wrong_type(name, "a boolean", other)),
    }
}

/// Helper to get a required list of strings, given either as an array or a
/// comma-separated string.
pub fn get_string_list_arg(args: &Map<String, JsonValue>, name: &str) -> Result<Vec<String>> {
    let items: Vec<String> = match args.get(name) {
        Some(JsonValue::Array(arr)) => arr
            .iter()
            .map(|v| {
                v.as_str().map(|s| s.trim().to_string()).ok_or_else(|| McpError::InvalidArg {
                    name: name.to_string(),
                    reason: "Expected array of strings".to_string(),
                })
            })
            .collect::<Result<_>>()?,
        Some(JsonValue::String(s)) => s.split(',').map(|p| p.trim().to_string()).collect(),
        _ => return Err(McpError::MissingArg(name.to_string())),
    };
    let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return Err(McpError::MissingArg(name.to_string()));
    }
    Ok(items)
}

/// Copy optional arguments into request fields, renaming to the upstream field names.
///
/// Each pair is `(argument name, upstream field name)`. Strings, booleans and
/// numbers are forwarded; null and blank strings are skipped; arrays and
/// objects are invalid.
pub fn copy_optional(
    args: &Map<String, JsonValue>,
    pairs: &[(&str, &str)],
    fields: &mut Fields,
) -> Result<()> {
    for (arg, field) in pairs {
        let value = match args.get(*arg) {
            None | Some(JsonValue::Null) => continue,
            Some(JsonValue::String(s)) if s.trim().is_empty() => continue,
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Bool(b)) => b.to_string(),
            Some(JsonValue::Number(n)) => n.to_string(),
            Some(other) => return Err(wrong_type(arg, "a string, number or boolean", other)),
        };
        fields.insert(field.to_string(), value);
    }
    Ok(())
}

/// Read a string field from an upstream entity.
pub fn str_field<'a>(value: &'a JsonValue, field: &str) -> Option<&'a str> {
    value.get(field).and_then(|v| v.as_str())
}

/// The `id` of an upstream entity.
pub fn entity_id(value: &JsonValue) -> Option<&str> {
    str_field(value, "id")
}

/// Shape a successful passthrough call.
///
/// `extra` must be an object; its keys are merged into the result.
pub fn ok_result(action: &str, message: impl Into<String>, data: JsonValue, extra: JsonValue) -> JsonValue {
    let mut result = json!({
        "success": true,
        "action": action,
        "message": message.into(),
    });
    if let (Some(obj), JsonValue::Object(extra)) = (result.as_object_mut(), extra) {
        obj.extend(extra);
    }
    result["data"] = data;
    result
}

/// Compact card summary.
pub fn card_summary(card: &JsonValue) -> JsonValue {
    json!({
        "id": entity_id(card),
        "name": str_field(card, "name"),
        "id_list": str_field(card, "idList"),
        "id_board": str_field(card, "idBoard"),
        "url": str_field(card, "shortUrl").or_else(|| str_field(card, "url")),
    })
}

/// Compact list summary.
pub fn list_summary(list: &JsonValue) -> JsonValue {
    json!({
        "id": entity_id(list),
        "name": str_field(list, "name"),
        "closed": list.get("closed").and_then(|v| v.as_bool()).unwrap_or(false),
        "id_board": str_field(list, "idBoard"),
    })
}

/// Compact member summary.
pub fn member_summary(member: &JsonValue) -> JsonValue {
    json!({
        "id": entity_id(member),
        "username": str_field(member, "username"),
        "full_name": display_name(member),
        "email": str_field(member, "email"),
    })
}

/// Compact checklist summary.
pub fn checklist_summary(checklist: &JsonValue) -> JsonValue {
    json!({
        "id": entity_id(checklist),
        "name": str_field(checklist, "name"),
        "id_card": str_field(checklist, "idCard"),
        "id_board": str_field(checklist, "idBoard"),
        "item_count": checklist
            .get("checkItems")
            .and_then(|v| v.as_array())
            .map(|a| a.len())
            .unwrap_or(0),
    })
}

/// A member's display name: `fullName`, falling back to `displayName`.
pub fn display_name(member: &JsonValue) -> Option<&str> {
    str_field(member, "fullName").or_else(|| str_field(member, "displayName"))
}

/// Number of items when `value` is an array, else zero.
pub fn count(value: &JsonValue) -> usize {
    value.as_array().map(|a| a.len()).unwrap_or(0)
}

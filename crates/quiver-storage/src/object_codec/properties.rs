//! Property JSON handling.
//!
//! Properties travel as one JSON document. The full decode path hands the
//! whole document to serde; the projection path below deserializes the
//! top level into raw value slices and only parses the values the caller
//! asked for, which keeps selective reads from paying for a full JSON tree.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{Map, Number, Value};

use quiver_core::PropertyProjection;

use crate::error::{CodecError, CodecResult};

/// Marshal the property mapping for storage.
///
/// Null-valued properties are stripped first: nullability is expressed by
/// absence on the wire. An absent mapping encodes as JSON `null`.
pub(super) fn marshal_properties(
    properties: Option<&Map<String, Value>>,
) -> CodecResult<Vec<u8>> {
    let bytes = match properties {
        None => serde_json::to_vec(&Value::Null)?,
        Some(map) if map.values().any(Value::is_null) => {
            let filtered: Map<String, Value> = map
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            serde_json::to_vec(&filtered)?
        }
        Some(map) => serde_json::to_vec(map)?,
    };
    Ok(bytes)
}

/// Parse only the projected keys out of a raw property document.
///
/// A `null` document (an object stored without properties) yields nothing.
/// `out` is cleared and refilled rather than reallocated, so a caller that
/// materializes many objects in a row keeps the map's capacity across
/// iterations.
pub fn unmarshal_properties(
    data: &[u8],
    out: &mut Map<String, Value>,
    projection: &PropertyProjection,
) -> CodecResult<()> {
    out.clear();

    let Some(fields) = serde_json::from_slice::<Option<HashMap<String, &RawValue>>>(data)? else {
        return Ok(());
    };
    for name in &projection.names {
        let Some(raw) = fields.get(name) else {
            continue;
        };
        out.insert(name.clone(), parse_value(name, raw)?);
    }
    Ok(())
}

fn parse_value(property: &str, raw: &RawValue) -> CodecResult<Value> {
    let text = raw.get().trim();
    match text.as_bytes().first() {
        Some(b'"') => Ok(Value::String(serde_json::from_str(text)?)),
        Some(b't') | Some(b'f') => Ok(Value::Bool(serde_json::from_str(text)?)),
        Some(b'[') => parse_array(property, text),
        Some(b'{') => Ok(Value::Object(serde_json::from_str(text)?)),
        Some(b'-' | b'0'..=b'9') => parse_number(property, text),
        _ => Err(unknown_type(property, text)),
    }
}

/// Numbers are surfaced as f64; schema enrichment narrows them later.
fn parse_number(property: &str, text: &str) -> CodecResult<Value> {
    let parsed: f64 = serde_json::from_str(text)?;
    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| unknown_type(property, text))
}

/// Reference values carry exactly one field.
#[derive(Deserialize)]
struct BeaconRef {
    beacon: String,
}

fn parse_array(property: &str, text: &str) -> CodecResult<Value> {
    let elements: Vec<&RawValue> = serde_json::from_str(text)?;

    // A reference list is told apart from a plain array by probing the first
    // element's raw text for a beacon key. A string element that happens to
    // contain the probe text sends the array down the reference branch and
    // fails there; scalar arrays never carry that text in practice.
    let is_ref_list = elements
        .first()
        .is_some_and(|el| el.get().contains(r#""beacon""#));

    if is_ref_list {
        let mut beacons = Vec::with_capacity(elements.len());
        for element in &elements {
            let reference: BeaconRef = serde_json::from_str(element.get())?;
            let mut entry = Map::with_capacity(1);
            entry.insert("beacon".to_string(), Value::String(reference.beacon));
            beacons.push(Value::Object(entry));
        }
        return Ok(Value::Array(beacons));
    }

    let mut array = Vec::with_capacity(elements.len());
    for element in &elements {
        let text = element.get().trim();
        let value = match text.as_bytes().first() {
            Some(b'"') => Value::String(serde_json::from_str(text)?),
            Some(b't') | Some(b'f') => Value::Bool(serde_json::from_str(text)?),
            Some(b'-' | b'0'..=b'9') => parse_number(property, text)?,
            // mixed or nested arrays are not supported here
            _ => return Err(unknown_type(property, text)),
        };
        array.push(value);
    }
    Ok(Value::Array(array))
}

fn unknown_type(property: &str, text: &str) -> CodecError {
    let found = match text.as_bytes().first() {
        Some(b'"') => "string",
        Some(b't' | b'f') => "boolean",
        Some(b'n') => "null",
        Some(b'[') => "array",
        Some(b'{') => "object",
        Some(b'-' | b'0'..=b'9') => "number",
        _ => "unknown",
    };
    CodecError::UnknownPropertyType {
        property: property.to_string(),
        found: found.to_string(),
    }
}

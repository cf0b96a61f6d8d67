use crate::error::StepFault;
use crate::plan::OutputRef;
use serde_json::Value;
use std::collections::HashMap;

/// Rewrite a step's raw input, replacing placeholder tokens with the outputs
/// of completed steps.
///
/// The walk is structural: maps and arrays are descended recursively, and a
/// string leaf that is *entirely* a token (`{{step_1.output.summary}}`)
/// becomes the referenced value, which may be any JSON type. Everything else
/// passes through unchanged. Pure and deterministic, which keeps downstream
/// cache keys stable.
pub fn resolve_input(
    raw: &Value,
    outputs: &HashMap<String, Value>,
) -> Result<Value, StepFault> {
    match raw {
        Value::String(s) => match OutputRef::parse(s) {
            Some(reference) => resolve_reference(&reference, outputs),
            None => Ok(raw.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_input(item, outputs))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| Ok((key.clone(), resolve_input(value, outputs)?)))
            .collect::<Result<serde_json::Map<_, _>, StepFault>>()
            .map(Value::Object),
        _ => Ok(raw.clone()),
    }
}

fn resolve_reference(
    reference: &OutputRef,
    outputs: &HashMap<String, Value>,
) -> Result<Value, StepFault> {
    let mut current = outputs
        .get(&reference.step_id)
        .ok_or_else(|| StepFault::unresolved_placeholder(&reference.token()))?;

    for segment in &reference.path {
        current = lookup_segment(current, segment)
            .ok_or_else(|| StepFault::placeholder_path(&reference.token(), segment))?;
    }
    Ok(current.clone())
}

fn lookup_segment<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        // Numeric segments index into arrays.
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

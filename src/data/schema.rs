use serde_json::{json, Map, Value};

/// Autodetect a JSON-schema-like description of a document.
///
/// Arrays are described by their first element, objects list every key as
/// required. Only the first element of any array is inspected.
pub fn autodetect_schema(value: &Value) -> Value {
    match value {
        Value::Array(items) => match items.first() {
            Some(first) => autodetect_schema(first),
            None => json!({ "type": "array" }),
        },
        Value::Object(map) => object_schema(map),
        other => json!({ "type": type_name(other) }),
    }
}

fn object_schema(map: &Map<String, Value>) -> Value {
    let mut properties = Map::new();
    for (key, value) in map {
        let property = match value {
            Value::Array(items) => match items.first() {
                Some(first) => json!({ "type": "array", "items": autodetect_schema(first) }),
                None => json!({ "type": "array" }),
            },
            Value::Object(inner) => object_schema(inner),
            scalar => json!({ "type": type_name(scalar) }),
        };
        properties.insert(key.clone(), property);
    }
    let required: Vec<&String> = map.keys().collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

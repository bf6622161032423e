use serde_json::Value;

/// Walk `path` through nested objects.
pub fn attr<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(raw, |v, key| v.get(*key))
}

pub fn bool_attr(raw: &Value, path: &[&str]) -> Option<bool> {
    attr(raw, path).and_then(Value::as_bool)
}

pub fn str_attr<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a str> {
    attr(raw, path).and_then(Value::as_str)
}

/// Describe a value that was present but had an unexpected shape.
pub fn shape_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

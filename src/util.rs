use serde_json::Value;

/// Returns the first element of a JSON:API document's `data` array.
pub fn first_resource(document: &Value) -> Option<&Value> {
    document
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|items| items.first())
}

pub fn resource_id(resource: &Value) -> Option<&str> {
    resource.get("id").and_then(|i| i.as_str())
}

pub fn resource_attribute<'a>(resource: &'a Value, name: &str) -> Option<&'a str> {
    resource
        .get("attributes")
        .and_then(|a| a.get(name))
        .and_then(|s| s.as_str())
}

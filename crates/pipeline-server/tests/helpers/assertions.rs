//! Custom assertions para tests.

use serde_json::Value;

/// Verifica que un JSON tenga la forma de `MetricResponse`.
pub fn assert_metric_envelope(json: &Value) {
    let obj = json.as_object().expect("Response should be a JSON object");

    for field in ["metric", "value", "window", "params", "as_of", "source"] {
        assert!(obj.contains_key(field), "Missing '{}' field", field);
    }

    assert!(obj["metric"].is_string(), "'metric' should be a string");
    assert!(
        obj["value"].is_null() || obj["value"].is_number(),
        "'value' should be null or number"
    );
    assert!(obj["window"].is_string(), "'window' should be a string");
    assert!(obj["params"].is_object(), "'params' should be an object");
    assert!(obj["source"].is_string(), "'source' should be a string");

    let as_of = obj["as_of"].as_str().expect("'as_of' should be a string");
    assert!(
        chrono::DateTime::parse_from_rfc3339(as_of).is_ok(),
        "'as_of' should be RFC 3339: {}",
        as_of
    );

    if let Some(samples) = obj.get("samples") {
        assert!(samples.is_u64(), "'samples' should be an integer");
    }

    // Un valor nulo siempre trae razon
    if obj["value"].is_null() {
        let reason = obj
            .get("reason")
            .and_then(Value::as_str)
            .expect("null value without 'reason'");
        assert!(!reason.is_empty(), "'reason' should not be empty");
    } else {
        assert!(!obj.contains_key("reason"), "'reason' set on a value");
    }
}

/// Verifica el body de error `{error, message}`.
pub fn assert_error_body(json: &Value, error: &str) {
    assert_eq!(json["error"], error, "Unexpected error kind: {}", json);
    assert!(
        json["message"].as_str().is_some_and(|m| !m.is_empty()),
        "Error body missing message: {}",
        json
    );
}

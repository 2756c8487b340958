//! JSON-lines span formatter.
//!
//! Each finished span becomes one self-contained JSON object on its own line,
//! which keeps the export greppable and easy to load with `jq` or a dataframe
//! library:
//!
//! ```json
//! {"service":"galleria","trace_id":"4bf9…","span_id":"00f0…","parent_span_id":null,
//!  "name":"handle_event","kind":"internal","start":"2026-01-05T10:00:00.000120Z",
//!  "duration_us":84,"attributes":{"event_type":"EndReached { dir: … }"},
//!  "events":[{"name":"page request issued","time":"…","attributes":{"offset":40}}],
//!  "status":"unset"}
//! ```

use opentelemetry::trace::{SpanId, SpanKind, Status};
use opentelemetry::{Key, KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde_json::{json, Map, Value as JsonValue};
use std::time::SystemTime;

pub struct SpanFormatter {
    service: String,
}

impl SpanFormatter {
    /// Takes the service name from the resource's `service.name`.
    pub fn new(resource: &Resource) -> Self {
        let service = resource
            .get(Key::from_static_str("service.name"))
            .map_or_else(|| "galleria".to_string(), |v| v.to_string());
        Self { service }
    }

    pub fn format_span(&self, span: &SpanData) -> JsonValue {
        let parent = (span.parent_span_id != SpanId::INVALID).then(|| format!("{:016x}", span.parent_span_id));
        let duration_us = span
            .end_time
            .duration_since(span.start_time)
            .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));

        let events: Vec<JsonValue> = span
            .events
            .iter()
            .map(|event| {
                json!({
                    "name": event.name,
                    "time": timestamp(event.timestamp),
                    "attributes": attributes_object(&event.attributes),
                })
            })
            .collect();

        json!({
            "service": self.service,
            "trace_id": format!("{:032x}", span.span_context.trace_id()),
            "span_id": format!("{:016x}", span.span_context.span_id()),
            "parent_span_id": parent,
            "name": span.name,
            "kind": kind_name(&span.span_kind),
            "start": timestamp(span.start_time),
            "duration_us": duration_us,
            "attributes": attributes_object(&span.attributes),
            "events": events,
            "status": status_text(&span.status),
        })
    }
}

fn timestamp(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(time).to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

const fn kind_name(kind: &SpanKind) -> &'static str {
    match kind {
        SpanKind::Internal => "internal",
        SpanKind::Server => "server",
        SpanKind::Client => "client",
        SpanKind::Producer => "producer",
        SpanKind::Consumer => "consumer",
    }
}

fn status_text(status: &Status) -> String {
    match status {
        Status::Unset => "unset".to_string(),
        Status::Ok => "ok".to_string(),
        Status::Error { description } => format!("error: {description}"),
    }
}

/// Attributes as a JSON object with native value types. Later duplicates win.
fn attributes_object(attributes: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => json!(b),
        Value::I64(i) => json!(i),
        Value::F64(f) => json!(f),
        Value::String(s) => json!(s.as_str()),
        Value::Array(_) => json!(value.to_string()),
    }
}

impl std::fmt::Debug for SpanFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanFormatter").field("service", &self.service).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_keep_native_types() {
        let attrs = vec![
            KeyValue::new("dir", "2024/05"),
            KeyValue::new("offset", 40_i64),
            KeyValue::new("has_more", false),
        ];
        assert_eq!(
            attributes_object(&attrs),
            json!({ "dir": "2024/05", "offset": 40, "has_more": false })
        );
    }

    #[test]
    fn service_name_comes_from_the_resource() {
        let resource = Resource::new(vec![KeyValue::new("service.name", "galleria-test")]);
        assert_eq!(SpanFormatter::new(&resource).service, "galleria-test");
    }

    #[test]
    fn error_status_carries_its_description() {
        let status = Status::error("HTTP 500");
        assert_eq!(status_text(&status), "error: HTTP 500");
    }
}

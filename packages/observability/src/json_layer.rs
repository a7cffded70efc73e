//! JSON layer producing one log entry per line.
//!
//! Each entry carries: timestamp (RFC 3339), level, service, pid, target,
//! message, event fields, and the fields of every enclosing span.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

type FieldMap = BTreeMap<String, serde_json::Value>;

/// A single structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub service: String,
    pub pid: u32,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldMap,
    /// Name of the innermost span, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
    /// Fields recorded on enclosing spans. Inner spans win on conflicts.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub span_fields: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

#[derive(Default)]
struct FieldVisitor {
    fields: FieldMap,
    message: Option<String>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.insert(field, serde_json::Value::String(value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string()));
        self.insert(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }
}

/// Span extension holding the fields recorded on that span.
struct SpanFields(FieldMap);

/// Layer that serializes each event as a [`LogEntry`] line.
pub struct JsonLayer<W> {
    service_name: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service_name: String, make_writer: W) -> Self {
        Self {
            service_name,
            pid: std::process::id(),
            make_writer,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::default();
        values.record(&mut visitor);

        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(existing) => existing.0.extend(visitor.fields),
            None => extensions.insert(SpanFields(visitor.fields)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut span_name = None;
        let mut span_fields = FieldMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(fields) = span.extensions().get::<SpanFields>() {
                    span_fields.extend(fields.0.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                span_name = Some(span.name().to_string());
            }
        }

        let metadata = event.metadata();
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            level: level_to_string(*metadata.level()),
            service: self.service_name.clone(),
            pid: self.pid,
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
            span: span_name,
            span_fields,
            file: metadata.file().map(str::to_string),
            line: metadata.line(),
        };

        if let Ok(json) = serde_json::to_string(&entry) {
            let mut writer = self.make_writer.make_writer();
            let _ = writeln!(writer, "{json}");
        }
    }
}

fn level_to_string(level: Level) -> String {
    match level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARN",
        Level::ERROR => "ERROR",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFileWriter;
    use tempfile::tempdir;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture(f: impl FnOnce()) -> Vec<serde_json::Value> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.jsonl");
        let writer = LogFileWriter::new(&path).unwrap();
        let subscriber =
            tracing_subscriber::registry().with(JsonLayer::new("test-service".into(), writer));

        tracing::subscriber::with_default(subscriber, f);

        std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_event_fields_and_message() {
        let lines = capture(|| {
            tracing::warn!(exit_code = 2, retried = false, "buck2 failed");
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["level"], "WARN");
        assert_eq!(line["service"], "test-service");
        assert_eq!(line["message"], "buck2 failed");
        assert_eq!(line["fields"]["exit_code"], 2);
        assert_eq!(line["fields"]["retried"], false);
        assert!(line.get("span").is_none());
    }

    #[test]
    fn test_span_fields_are_attached() {
        let lines = capture(|| {
            let outer = tracing::info_span!("request", request_id = "req-1");
            let _outer = outer.enter();
            let inner = tracing::info_span!("operation", operation = "buck2-targets");
            let _inner = inner.enter();
            tracing::info!("dispatching");
        });

        let line = &lines[0];
        assert_eq!(line["span"], "operation");
        assert_eq!(line["span_fields"]["request_id"], "req-1");
        assert_eq!(line["span_fields"]["operation"], "buck2-targets");
    }

    #[test]
    fn test_recorded_span_fields_are_merged() {
        let lines = capture(|| {
            let span = tracing::info_span!("request", outcome = tracing::field::Empty);
            let _guard = span.enter();
            span.record("outcome", "ok");
            tracing::debug!("done");
        });

        assert_eq!(lines[0]["span_fields"]["outcome"], "ok");
    }

    #[test]
    fn test_log_entry_serialization_skips_empty() {
        let entry = LogEntry {
            timestamp: "2024-01-15T10:30:00.000000Z".to_string(),
            level: "INFO".to_string(),
            service: "buck2-explorer".to_string(),
            pid: 12345,
            target: "explorer_ipc::server".to_string(),
            message: "listening".to_string(),
            fields: FieldMap::new(),
            span: None,
            span_fields: FieldMap::new(),
            file: None,
            line: None,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"service\":\"buck2-explorer\""));
        assert!(!json.contains("span_fields"));
        assert!(!json.contains("\"fields\""));
    }
}

//! Custom tracing layer for JSONL output.
//!
//! This layer produces machine-parseable JSONL logs on stderr while
//! keeping stdout clean for command payloads. Correlation keys
//! (`run_id`, `host_id`, `stage`, `command`) are lifted to the top level
//! whether they were recorded on the event itself or on an enclosing span.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

/// Correlation keys shared by events and spans.
#[derive(Debug, Clone, Default, PartialEq)]
struct Correlation {
    run_id: Option<String>,
    host_id: Option<String>,
    stage: Option<String>,
    command: Option<String>,
}

impl Correlation {
    /// Store `value` if `name` is a correlation key. Returns false otherwise.
    /// Empty values are swallowed so they never shadow a span's value.
    fn record(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "run_id" => &mut self.run_id,
            "host_id" => &mut self.host_id,
            "stage" => &mut self.stage,
            "command" => &mut self.command,
            _ => return false,
        };
        if !value.is_empty() {
            *slot = Some(value);
        }
        true
    }

    /// Fill unset keys from an outer context.
    fn inherit(&mut self, outer: &Correlation) {
        if self.run_id.is_none() {
            self.run_id.clone_from(&outer.run_id);
        }
        if self.host_id.is_none() {
            self.host_id.clone_from(&outer.host_id);
        }
        if self.stage.is_none() {
            self.stage.clone_from(&outer.stage);
        }
        if self.command.is_none() {
            self.command.clone_from(&outer.command);
        }
    }

    fn write_into(self, obj: &mut serde_json::Map<String, serde_json::Value>) {
        let pairs = [
            ("run_id", self.run_id),
            ("host_id", self.host_id),
            ("stage", self.stage),
            ("command", self.command),
        ];
        for (key, value) in pairs {
            if let Some(v) = value {
                obj.insert(key.to_string(), serde_json::Value::String(v));
            }
        }
    }
}

/// Extracts message, correlation keys, and remaining fields.
struct JsonFieldVisitor {
    correlation: Correlation,
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
}

impl JsonFieldVisitor {
    fn new() -> Self {
        JsonFieldVisitor {
            correlation: Correlation::default(),
            fields: serde_json::Map::new(),
            message: None,
        }
    }

    fn record_text(&mut self, field: &Field, text: String) {
        if field.name() == "message" {
            self.message = Some(text);
        } else if !self.correlation.record(field.name(), text.clone()) {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::String(text));
        }
    }
}

impl Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_text(field, format!("{:?}", value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::Number(n));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Bool(value));
    }
}

/// Collects only the correlation keys of a span.
struct SpanVisitor(Correlation);

impl Visit for SpanVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.record(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.record(field.name(), format!("{:?}", value));
    }
}

/// JSONL tracing layer that outputs to stderr.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    /// Create a new JSONL layer writing to stderr.
    pub fn stderr() -> Self {
        JsonlLayer::new(io::stderr())
    }
}

impl<W: Write> JsonlLayer<W> {
    /// Create a new JSONL layer with a custom writer.
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = SpanVisitor(Correlation::default());
        attrs.record(&mut visitor);

        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(visitor.0);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let ts = Utc::now();

        let mut visitor = JsonFieldVisitor::new();
        event.record(&mut visitor);

        // Innermost span wins for keys the event did not set itself.
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(outer) = span.extensions().get::<Correlation>() {
                    visitor.correlation.inherit(outer);
                }
            }
        }

        let level: Level = (*event.metadata().level()).into();
        let mut obj = serde_json::Map::new();
        obj.insert("ts".to_string(), serde_json::json!(ts.to_rfc3339()));
        obj.insert("level".to_string(), serde_json::json!(level));
        obj.insert(
            "event".to_string(),
            serde_json::json!(event.metadata().target()),
        );
        visitor.correlation.write_into(&mut obj);
        if let Some(msg) = visitor.message {
            obj.insert("message".to_string(), serde_json::json!(msg));
        }
        if !visitor.fields.is_empty() {
            obj.insert(
                "fields".to_string(),
                serde_json::Value::Object(visitor.fields),
            );
        }

        let json = serde_json::to_string(&serde_json::Value::Object(obj)).unwrap_or_default();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    struct BufWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> serde_json::Value {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = JsonlLayer::new(BufWriter(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);

        let output = buffer.lock().unwrap();
        let line = String::from_utf8_lossy(&output);
        serde_json::from_str(line.trim()).expect("one JSON line")
    }

    #[test]
    fn layer_writes_level_message_and_target() {
        let parsed = capture(|| {
            tracing::warn!(target: "outcomes.lookup_miss", message = "no row");
        });
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["message"], "no row");
        assert_eq!(parsed["event"], "outcomes.lookup_miss");
        assert!(parsed["ts"].is_string());
    }

    #[test]
    fn event_correlation_keys_are_top_level() {
        let parsed = capture(|| {
            tracing::info!(
                target: "run.started",
                run_id = "run-1",
                host_id = "host-1",
                stage = "init",
                message = "go"
            );
        });
        assert_eq!(parsed["run_id"], "run-1");
        assert_eq!(parsed["host_id"], "host-1");
        assert_eq!(parsed["stage"], "init");
        assert!(parsed.get("fields").is_none());
    }

    #[test]
    fn span_fills_missing_keys() {
        let parsed = capture(|| {
            let span = tracing::info_span!("cmd", run_id = "run-span", command = "sample");
            let _enter = span.enter();
            tracing::info!(target: "sample.drawn", stage = "sample", count = 100u64, message = "drawn");
        });
        assert_eq!(parsed["run_id"], "run-span");
        assert_eq!(parsed["command"], "sample");
        assert_eq!(parsed["stage"], "sample");
        assert_eq!(parsed["fields"]["count"], 100);
    }

    #[test]
    fn numeric_and_bool_fields_keep_types() {
        let parsed = capture(|| {
            tracing::info!(target: "mechanism.calibrated", multiplier = 1.5, fallback = false, message = "ok");
        });
        assert_eq!(parsed["fields"]["multiplier"], 1.5);
        assert_eq!(parsed["fields"]["fallback"], false);
    }

    #[test]
    fn correlation_inherit_keeps_own_values() {
        let mut inner = Correlation::default();
        inner.record("stage", "render".to_string());
        let mut outer = Correlation::default();
        outer.record("stage", "init".to_string());
        outer.record("run_id", "run-9".to_string());
        inner.inherit(&outer);
        assert_eq!(inner.stage.as_deref(), Some("render"));
        assert_eq!(inner.run_id.as_deref(), Some("run-9"));
        assert!(!inner.record("other", String::new()));
        assert!(inner.record("command", String::new()));
        assert!(inner.command.is_none());
    }
}

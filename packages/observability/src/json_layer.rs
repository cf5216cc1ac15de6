//! JSON lines output for the tracing registry.
//!
//! Each event becomes one object:
//!
//! ```text
//! {"ts":"...","level":"INFO","service":"labtrack","pid":4242,
//!  "target":"labtrack_engine::lifecycle","msg":"sample moved",
//!  "sample_id":"PLATE_001","fields":{"to":"Incubator_37C"}}
//! ```
//!
//! `sample_id` is lifted out of `fields` so one sample's trail can be
//! followed with a single top-level filter.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::io::Write;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Field name promoted to the top level of every line that carries it.
pub const SAMPLE_ID_FIELD: &str = "sample_id";

/// One line of the log file.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub ts: String,
    pub level: &'static str,
    pub service: String,
    pub pid: u32,
    pub target: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_id: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

#[derive(Default)]
struct Captured {
    msg: String,
    sample_id: Option<String>,
    fields: Map<String, Value>,
}

impl Captured {
    fn text(&mut self, field: &Field, text: String) {
        match field.name() {
            "message" => self.msg = text,
            SAMPLE_ID_FIELD => self.sample_id = Some(text),
            name => {
                self.fields.insert(name.to_string(), Value::String(text));
            }
        }
    }

    fn value(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for Captured {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.text(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.text(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.text(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.value(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.value(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.value(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // Assay readings may be NaN; JSON has no number for it.
        let value = Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.value(field, value);
    }
}

/// Layer that appends a [`LogLine`] per event to `make_writer`.
pub struct JsonLayer<W> {
    service: String,
    pid: u32,
    make_writer: W,
}

impl<W> JsonLayer<W> {
    pub fn new(service: impl Into<String>, make_writer: W) -> Self {
        Self {
            service: service.into(),
            pid: std::process::id(),
            make_writer,
        }
    }

    fn line(&self, event: &Event<'_>, span: Option<String>) -> LogLine {
        let mut captured = Captured::default();
        event.record(&mut captured);
        let meta = event.metadata();
        LogLine {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            level: meta.level().as_str(),
            service: self.service.clone(),
            pid: self.pid,
            target: meta.target().to_string(),
            msg: captured.msg,
            sample_id: captured.sample_id,
            fields: captured.fields,
            span,
        }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let span = ctx.event_span(event).map(|s| s.name().to_string());
        let line = self.line(event, span);
        if let Ok(json) = serde_json::to_string(&line) {
            let _ = writeln!(self.make_writer.make_writer(), "{json}");
        }
    }
}

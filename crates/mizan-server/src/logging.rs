use std::{collections::VecDeque, sync::Arc};

use tokio::sync::broadcast;

/// `EnvFilter` directives used when `RUST_LOG` is unset.
pub(crate) const DEFAULT_LOG_FILTER: &str =
    "mizan_server=info,mizan_core=info,mizan_legal=info,tower_http=debug";

/// Lines kept for replay when a new log stream subscriber connects.
pub(crate) const LOG_RING_CAPACITY: usize = 500;

/// Mirrors every log event as a JSON line onto a broadcast channel and a
/// bounded replay buffer, feeding `/api/logs`.
pub(crate) struct BroadcastLayer {
    pub tx: broadcast::Sender<String>,
    pub ring: Arc<std::sync::Mutex<VecDeque<String>>>,
}

/// Splits an event into its message and the remaining structured fields.
#[derive(Default)]
struct EventFields {
    message: String,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl EventFields {
    fn put(&mut self, name: &str, value: serde_json::Value) {
        if name == "message" {
            self.message = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(name.to_string(), value);
        }
    }
}

impl tracing::field::Visit for EventFields {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.put(field.name(), value.into());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.put(field.name(), value.into());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.put(field.name(), value.into());
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.put(field.name(), value.into());
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.put(field.name(), value.into());
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.put(field.name(), format!("{value:?}").into());
    }
}

pub(crate) fn category_for(target: &str) -> &'static str {
    if target.contains("risk") {
        "risk"
    } else if target.contains("legal") {
        "legal"
    } else if target.contains("tower_http") {
        "http"
    } else {
        "system"
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for BroadcastLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let level = match *event.metadata().level() {
            tracing::Level::ERROR => "err",
            tracing::Level::WARN => "warn",
            tracing::Level::INFO => "info",
            tracing::Level::DEBUG => "debug",
            tracing::Level::TRACE => return,
        };

        let mut visited = EventFields::default();
        event.record(&mut visited);

        let mut line = serde_json::json!({
            "ts": chrono::Utc::now().timestamp(),
            "level": level,
            "message": visited.message,
            "category": category_for(event.metadata().target()),
        });
        if !visited.fields.is_empty() {
            line["fields"] = serde_json::Value::Object(visited.fields);
        }
        let json = line.to_string();

        let _ = self.tx.send(json.clone());
        if let Ok(mut ring) = self.ring.lock() {
            ring.push_back(json);
            if ring.len() > LOG_RING_CAPACITY {
                ring.pop_front();
            }
        }
    }
}

//! Logger capability used by the engine for per-operation diagnostics.

/// Accepts free-form diagnostic messages. Fire-and-forget.
pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// Emits each message as a `tracing` warning tagged with a session label,
/// e.g. `"PUT:/api/v1/notes/<id>"`.
#[derive(Clone, Debug)]
pub struct TracingLogger {
    session: String,
}

impl TracingLogger {
    pub fn session(label: impl Into<String>) -> Self {
        TracingLogger {
            session: label.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::warn!(session = %self.session, "{}", message);
    }
}

//! Engine Settings Domain Model
//!
//! Deployment-side knobs for embedding the expression engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings applied by callers that embed the engine.
///
/// The engine itself has no timeout; the evaluation use case applies
/// `timeout_ms` around each call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Upper bound for one evaluation in milliseconds. `None` or `0` disables it.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,

    /// Whether evaluation output should list the variables that were resolved.
    #[serde(default)]
    pub trace: bool,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_timeout_ms() -> Option<u64> {
    Some(5_000)
}

impl EngineSettings {
    /// Returns the effective timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Returns a copy with the timeout replaced.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns a copy with tracing switched on or off.
    #[must_use]
    pub const fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            trace: false,
        }
    }
}

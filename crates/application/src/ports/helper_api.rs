//! Helper namespace port
//!
//! The helper namespace is an opaque set of named capabilities owned by the
//! embedding caller. The engine forwards it to every execution unchanged.

use async_trait::async_trait;
use varex_domain::ScriptValue;

/// Named callable capabilities exposed to expression code as `api`.
#[async_trait]
pub trait HelperApi: Send + Sync {
    /// Invokes the helper `name` with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns a message describing the failure, prefixed with its error
    /// class (e.g. `TypeError: ...`). The runtime reports it verbatim.
    async fn call(&self, name: &str, args: Vec<ScriptValue>) -> Result<ScriptValue, String>;

    /// Returns a non-callable property of the namespace, if there is one.
    fn property(&self, _name: &str) -> Option<ScriptValue> {
        None
    }
}

/// A helper namespace with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHelpers;

#[async_trait]
impl HelperApi for NoHelpers {
    async fn call(&self, name: &str, _args: Vec<ScriptValue>) -> Result<ScriptValue, String> {
        Err(format!("TypeError: api.{name} is not a function"))
    }
}

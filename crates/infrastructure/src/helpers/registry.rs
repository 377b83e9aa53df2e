//! Helper namespace built from named closures.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use varex_application::ports::HelperApi;
use varex_domain::ScriptValue;

type HelperResult = Result<ScriptValue, String>;
type HelperFn = Arc<dyn Fn(Vec<ScriptValue>) -> BoxFuture<'static, HelperResult> + Send + Sync>;

/// A [`HelperApi`] assembled from named functions and constant properties.
///
/// Error messages returned by helpers should carry their class, e.g.
/// `TypeError: ...`; they reach the caller verbatim.
#[derive(Clone, Default)]
pub struct HelperRegistry {
    functions: HashMap<String, HelperFn>,
    properties: HashMap<String, ScriptValue>,
}

impl HelperRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a synchronous helper.
    #[must_use]
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[ScriptValue]) -> HelperResult + Send + Sync + 'static,
    {
        let function: HelperFn =
            Arc::new(move |args: Vec<ScriptValue>| -> BoxFuture<'static, HelperResult> {
                Box::pin(futures::future::ready(function(&args)))
            });
        self.functions.insert(name.into(), function);
        self
    }

    /// Adds an asynchronous helper.
    #[must_use]
    pub fn with_async_function<F, Fut>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Vec<ScriptValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HelperResult> + Send + 'static,
    {
        let function: HelperFn =
            Arc::new(move |args: Vec<ScriptValue>| -> BoxFuture<'static, HelperResult> {
                Box::pin(function(args))
            });
        self.functions.insert(name.into(), function);
        self
    }

    /// Adds a constant, non-callable property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: ScriptValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Helper function names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("functions", &self.names())
            .field("properties", &self.properties)
            .finish()
    }
}

#[async_trait]
impl HelperApi for HelperRegistry {
    async fn call(&self, name: &str, args: Vec<ScriptValue>) -> HelperResult {
        let Some(function) = self.functions.get(name).cloned() else {
            return Err(format!("TypeError: api.{name} is not a function"));
        };
        function(args).await
    }

    fn property(&self, name: &str) -> Option<ScriptValue> {
        self.properties.get(name).cloned()
    }
}

//! Per-call evaluation state
//!
//! A session lives for exactly one top-level evaluation. It memoizes resolved
//! variables and tracks which names are currently being resolved, which is
//! what cycle detection keys on.

use std::collections::{HashMap, HashSet};

use varex_domain::{ResolvedVariable, VariableKind};

/// Cache and in-progress set for one evaluation call.
#[derive(Debug, Default)]
pub struct EvaluationSession {
    cache: HashMap<String, String>,
    in_progress: HashSet<String>,
    resolved: Vec<ResolvedVariable>,
}

impl EvaluationSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `name` is currently being resolved.
    #[must_use]
    pub fn is_in_progress(&self, name: &str) -> bool {
        self.in_progress.contains(name)
    }

    /// Returns the memoized value of `name`, if it was already resolved.
    #[must_use]
    pub fn cached(&self, name: &str) -> Option<&str> {
        self.cache.get(name).map(String::as_str)
    }

    /// Marks `name` as being resolved.
    ///
    /// Returns false if it already was; callers check `is_in_progress` first.
    pub fn begin(&mut self, name: &str) -> bool {
        self.in_progress.insert(name.to_string())
    }

    /// Clears the in-progress mark of `name` and memoizes its value.
    pub fn finish(&mut self, name: &str, kind: VariableKind, value: String) {
        self.in_progress.remove(name);
        self.resolved
            .push(ResolvedVariable::new(name, kind, value.clone()));
        self.cache.insert(name.to_string(), value);
    }

    /// Number of variables currently being resolved.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }

    /// Consumes the session, returning resolved variables in completion order.
    #[must_use]
    pub fn into_resolved(self) -> Vec<ResolvedVariable> {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_begin_and_finish() {
        let mut session = EvaluationSession::new();
        assert!(session.begin("A"));
        assert!(session.is_in_progress("A"));
        assert_eq!(session.cached("A"), None);
        assert_eq!(session.depth(), 1);

        session.finish("A", VariableKind::Constant, "1".to_string());
        assert!(!session.is_in_progress("A"));
        assert_eq!(session.cached("A"), Some("1"));
        assert_eq!(session.depth(), 0);
    }

    #[test]
    fn test_begin_twice_reports_reentry() {
        let mut session = EvaluationSession::new();
        assert!(session.begin("A"));
        assert!(!session.begin("A"));
    }

    #[test]
    fn test_resolved_keeps_completion_order() {
        let mut session = EvaluationSession::new();
        session.begin("OUTER");
        session.begin("INNER");
        session.finish("INNER", VariableKind::Constant, "i".to_string());
        session.finish("OUTER", VariableKind::Expression, "o".to_string());

        let names: Vec<_> = session
            .into_resolved()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["INNER", "OUTER"]);
    }
}

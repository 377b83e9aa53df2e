//! Application use cases (business logic orchestration).

mod evaluate_expression;

pub use evaluate_expression::*;

//! Go-template-compatible rendering engine (§4.D).
//!
//! This crate owns the grammar, the `{{ }}` tokenizer, and the render
//! pass. It deliberately knows nothing about where variables or
//! functions come from — that's [`Evaluator`], implemented by
//! `servflow-context`, which is what keeps the two crates from forming a
//! dependency cycle (context needs the renderer, the renderer must not
//! need context).

mod error;
mod eval;
mod expr;
mod position;
mod template;

pub use error::TemplateError;
pub use eval::{eval_expr, value_to_rendered_string, Evaluator};
pub use expr::{parse_expression, Expr, PathSegment};
pub use position::Position;
pub use template::{Template, TemplatePart};

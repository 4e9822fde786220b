//! `{{ }}` template parsing and rendering (§4.D).
//!
//! A [`Template`] is parsed once into a sequence of [`TemplatePart`]s and
//! can then be rendered repeatedly against different evaluators — the
//! same plan step renders once per request, never re-parsing its source.

use std::fmt;
use std::sync::Arc;

use crate::error::TemplateError;
use crate::eval::{eval_expr, value_to_rendered_string, Evaluator};
use crate::expr::parse_expression;
use crate::position::Position;

/// Caps the number of `{{ }}` expressions a single template may contain,
/// mirroring the corpus's DoS guard on template parsing.
const MAX_TEMPLATE_EXPRESSIONS: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Static {
        content: Arc<str>,
        position: Position,
    },
    Expression {
        content: Arc<str>,
        position: Position,
        length: usize,
        strip_left: bool,
        strip_right: bool,
    },
}

/// A parsed template, ready to render against any [`Evaluator`].
#[derive(Debug, Clone)]
pub struct Template {
    source: Arc<str>,
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Parse `source` into cached parts. Fails only on an unclosed `{{`
    /// or a template with more than [`MAX_TEMPLATE_EXPRESSIONS`] blocks —
    /// the expression content itself is not parsed until render time.
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source_str = source.into();
        let parts = Self::parse(&source_str)?;
        Ok(Self {
            source: Arc::from(source_str.as_str()),
            parts,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    pub fn has_expressions(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, TemplatePart::Expression { .. }))
    }

    /// Render against `evaluator`, substituting each `{{ }}` block with
    /// its evaluated value in a single left-to-right pass.
    pub fn render(&self, evaluator: &dyn Evaluator) -> Result<String, TemplateError> {
        let mut result = String::with_capacity(self.source.len());
        let mut strip_next_leading = false;

        for part in &self.parts {
            match part {
                TemplatePart::Static { content, .. } => {
                    if strip_next_leading {
                        result.push_str(content.trim_start());
                        strip_next_leading = false;
                    } else {
                        result.push_str(content);
                    }
                }
                TemplatePart::Expression {
                    content,
                    position,
                    strip_left,
                    strip_right,
                    ..
                } => {
                    if *strip_left {
                        let trimmed_len = result.trim_end().len();
                        result.truncate(trimmed_len);
                    }

                    let expr = parse_expression(content.trim(), *position)?;
                    let value = eval_expr(&expr, evaluator)?;
                    result.push_str(&value_to_rendered_string(&value));

                    if *strip_right {
                        strip_next_leading = true;
                    }
                }
            }
        }

        Ok(result)
    }

    fn parse(source: &str) -> Result<Vec<TemplatePart>, TemplateError> {
        let mut parts = Vec::new();
        let mut current_static = String::new();
        let mut static_start = Position::start();

        let chars: Vec<char> = source.chars().collect();
        let len = chars.len();
        let mut i = 0;
        let mut line = 1;
        let mut column = 1;

        while i < len {
            if i + 1 < len && chars[i] == '{' && chars[i + 1] == '{' {
                if !current_static.is_empty() {
                    parts.push(TemplatePart::Static {
                        content: Arc::from(current_static.as_str()),
                        position: static_start,
                    });
                    current_static.clear();
                }

                let expr_start = Position::new(line, column, i);

                let mut j = i + 2;
                let mut expr_line = line;
                let mut expr_column = column + 2;
                let mut closed = false;

                while j + 1 < len {
                    if chars[j] == '\n' {
                        expr_line += 1;
                        expr_column = 1;
                    }
                    if chars[j] == '}' && chars[j + 1] == '}' {
                        closed = true;
                        break;
                    }
                    j += 1;
                    expr_column += 1;
                }

                if !closed {
                    return Err(TemplateError::UnclosedExpression {
                        position: expr_start,
                    });
                }

                let mut expr_start_idx = i + 2;
                let mut expr_end_idx = j;
                let mut strip_left = false;
                let mut strip_right = false;

                if expr_start_idx < len && chars[expr_start_idx] == '-' {
                    strip_left = true;
                    expr_start_idx += 1;
                }
                if expr_end_idx > expr_start_idx && chars[expr_end_idx - 1] == '-' {
                    strip_right = true;
                    expr_end_idx -= 1;
                }

                let expr_content: String = chars[expr_start_idx..expr_end_idx].iter().collect();
                let full_length = j + 2 - i;

                parts.push(TemplatePart::Expression {
                    content: Arc::from(expr_content.as_str()),
                    position: expr_start,
                    length: full_length,
                    strip_left,
                    strip_right,
                });

                let expr_count = parts
                    .iter()
                    .filter(|p| matches!(p, TemplatePart::Expression { .. }))
                    .count();
                if expr_count > MAX_TEMPLATE_EXPRESSIONS {
                    return Err(TemplateError::ParseError {
                        position: expr_start,
                        message: format!(
                            "template contains too many expressions: {expr_count} (max {MAX_TEMPLATE_EXPRESSIONS})"
                        ),
                    });
                }

                i = j + 2;
                line = expr_line;
                column = expr_column + 2;
                static_start = Position::new(line, column, i);
            } else {
                current_static.push(chars[i]);
                if chars[i] == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
                i += 1;
            }
        }

        if !current_static.is_empty() {
            parts.push(TemplatePart::Static {
                content: Arc::from(current_static.as_str()),
                position: static_start,
            });
        }

        Ok(parts)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

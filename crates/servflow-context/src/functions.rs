//! Built-in and protocol-binding function implementations (§4.D).
//!
//! Dispatched from [`RequestContext`](crate::RequestContext)'s
//! [`Evaluator`](servflow_template::Evaluator) impl. Kept in a free
//! function rather than inherent methods so the match arm list reads as
//! one table of "name in, behavior out".

use std::sync::OnceLock;

use serde_json::Value;
use servflow_template::{value_to_rendered_string, TemplateError};

use crate::context::RequestContext;
use crate::validation::ValidationError;

pub(crate) fn dispatch(
    ctx: &RequestContext,
    name: &str,
    args: &[Value],
) -> Result<Value, TemplateError> {
    match name {
        "secret" => {
            let key = string_arg(name, args, 0)?;
            Ok(Value::String(std::env::var(key).unwrap_or_default()))
        }
        "tool_param" => {
            let key = string_arg(name, args, 0)?;
            Ok(ctx.tool_param(key).unwrap_or(Value::Null))
        }
        "header" => {
            let key = string_arg(name, args, 0)?;
            Ok(ctx.header(key).map(Value::String).unwrap_or(Value::Null))
        }
        "param" => {
            let key = string_arg(name, args, 0)?;
            Ok(ctx.query_param(key).map(Value::String).unwrap_or(Value::Null))
        }
        "urlparam" => {
            let key = string_arg(name, args, 0)?;
            Ok(ctx.url_param(key).map(Value::String).unwrap_or(Value::Null))
        }
        "body" => {
            let path = string_arg(name, args, 0)?;
            Ok(ctx.body_path(path).unwrap_or(Value::Null))
        }
        "email" => {
            arity(name, args, 2)?;
            let value = value_to_rendered_string(&args[0]);
            let title = value_to_rendered_string(&args[1]);
            let ok = email_regex().is_match(&value);
            if !ok {
                ctx.push_validation_error(ValidationError::new(
                    title,
                    format!("`{value}` is not a valid email address"),
                ));
            }
            Ok(Value::Bool(ok))
        }
        "empty" => {
            arity(name, args, 2)?;
            let value = value_to_rendered_string(&args[0]);
            let title = value_to_rendered_string(&args[1]);
            let ok = value.is_empty();
            if !ok {
                ctx.push_validation_error(ValidationError::new(title, "expected an empty value"));
            }
            Ok(Value::Bool(ok))
        }
        "notempty" => {
            arity(name, args, 2)?;
            let value = value_to_rendered_string(&args[0]);
            let title = value_to_rendered_string(&args[1]);
            let ok = !value.is_empty();
            if !ok {
                ctx.push_validation_error(ValidationError::new(title, "expected a non-empty value"));
            }
            Ok(Value::Bool(ok))
        }
        "bcrypt" => {
            arity(name, args, 3)?;
            let plain = value_to_rendered_string(&args[0]);
            let hashed = value_to_rendered_string(&args[1]);
            let title = value_to_rendered_string(&args[2]);
            let ok = bcrypt::verify(&plain, &hashed).unwrap_or(false);
            if !ok {
                ctx.push_validation_error(ValidationError::new(title, "password does not match"));
            }
            Ok(Value::Bool(ok))
        }
        "index" => {
            arity(name, args, 2)?;
            Ok(index_into(&args[0], &args[1]))
        }
        "default" => {
            arity(name, args, 2)?;
            if value_to_rendered_string(&args[0]).is_empty() {
                Ok(args[1].clone())
            } else {
                Ok(args[0].clone())
            }
        }
        "json" => {
            arity(name, args, 1)?;
            Ok(Value::String(
                serde_json::to_string(&args[0]).unwrap_or_default(),
            ))
        }
        "lower" => {
            let s = string_arg(name, args, 0)?;
            Ok(Value::String(s.to_lowercase()))
        }
        "upper" => {
            let s = string_arg(name, args, 0)?;
            Ok(Value::String(s.to_uppercase()))
        }
        _ => Err(TemplateError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), TemplateError> {
    if args.len() != expected {
        return Err(TemplateError::ArityMismatch {
            name: name.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

fn string_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a str, TemplateError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(TemplateError::TypeMismatch {
            name: name.to_string(),
            index,
            expected: "string",
            actual: "other",
        }),
        None => Err(TemplateError::ArityMismatch {
            name: name.to_string(),
            expected: index + 1,
            actual: args.len(),
        }),
    }
}

fn index_into(collection: &Value, key: &Value) -> Value {
    match (collection, key) {
        (Value::Array(items), Value::Number(n)) => n
            .as_u64()
            .and_then(|i| items.get(i as usize))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::Object(map), Value::String(k)) => map.get(k).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn email_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

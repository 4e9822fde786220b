//! `ObjectBuilder`: a recursive JSON tree of templated leaves (§4.E).

use indexmap::IndexMap;
use serde_json::Value;
use servflow_core::StatusCode;
use servflow_template::{Evaluator, Template};

use crate::built::BuiltResponse;
use crate::error::ResponseError;

/// One node of a response object tree. A node with non-empty `fields`
/// is an interior object node; a node with `value` set and no `fields`
/// is a leaf rendered as a template; a node with neither is the empty
/// object.
///
/// Leaves hold an already-parsed [`Template`], precompiled once at plan
/// construction (§4.F step 3) rather than reparsed on every `build()`.
#[derive(Debug, Clone, Default)]
pub struct ResponseObject {
    pub value: Option<Template>,
    pub fields: IndexMap<String, ResponseObject>,
}

impl ResponseObject {
    pub fn leaf(template: Template) -> Self {
        Self {
            value: Some(template),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, node: ResponseObject) -> Self {
        self.fields.insert(name.into(), node);
        self
    }
}

/// Coerce a rendered leaf string: valid JSON parses to its value,
/// anything else — including the empty string — is kept as a raw
/// string (§4.E: "a leaf containing an empty rendered string emits the
/// empty string, not null").
fn coerce_leaf(rendered: &str) -> Value {
    serde_json::from_str(rendered).unwrap_or_else(|_| Value::String(rendered.to_string()))
}

fn render_node(node: &ResponseObject, evaluator: &dyn Evaluator) -> Result<Value, ResponseError> {
    if !node.fields.is_empty() {
        let mut object = serde_json::Map::with_capacity(node.fields.len());
        for (name, child) in &node.fields {
            object.insert(name.clone(), render_node(child, evaluator)?);
        }
        return Ok(Value::Object(object));
    }

    let Some(template) = &node.value else {
        return Ok(Value::Object(serde_json::Map::new()));
    };

    // Permissive mode (§9): a leaf template that fails to render emits
    // an empty string rather than aborting the whole response.
    let rendered = template.render(evaluator).unwrap_or_default();
    Ok(coerce_leaf(&rendered))
}

pub struct ObjectBuilder {
    code: StatusCode,
    root: ResponseObject,
}

impl ObjectBuilder {
    pub fn new(code: StatusCode, root: ResponseObject) -> Self {
        Self { code, root }
    }

    pub fn build(&self, evaluator: &dyn Evaluator) -> Result<BuiltResponse, ResponseError> {
        let value = render_node(&self.root, evaluator)?;
        let body = serde_json::to_string(&value).expect("serde_json::Value always serializes");
        Ok(BuiltResponse {
            code: self.code.get(),
            content_type: Some("application/json"),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servflow_template::{PathSegment, TemplateError};

    fn leaf(source: &str) -> ResponseObject {
        ResponseObject::leaf(Template::new(source).unwrap())
    }

    struct MapEvaluator(serde_json::Value);
    impl Evaluator for MapEvaluator {
        fn resolve(&self, segments: &[PathSegment]) -> Option<Value> {
            let mut current = &self.0;
            for segment in segments {
                current = match segment {
                    PathSegment::Field(name) => current.get(name)?,
                    PathSegment::Index(i) => current.get(i)?,
                };
            }
            Some(current.clone())
        }
        fn call(&self, name: &str, _args: &[Value]) -> Result<Value, TemplateError> {
            Err(TemplateError::UnknownFunction { name: name.to_string() })
        }
    }

    #[test]
    fn empty_root_emits_empty_object() {
        let builder = ObjectBuilder::new(StatusCode::new(200).unwrap(), ResponseObject::default());
        let built = builder.build(&MapEvaluator(serde_json::json!({}))).unwrap();
        assert_eq!(built.body, "{}");
        assert_eq!(built.content_type, Some("application/json"));
    }

    #[test]
    fn leaf_rendering_to_valid_json_is_parsed() {
        let root = ResponseObject::default().with_field("count", leaf("{{.n}}"));
        let builder = ObjectBuilder::new(StatusCode::new(200).unwrap(), root);
        let built = builder.build(&MapEvaluator(serde_json::json!({"n": 3}))).unwrap();
        assert_eq!(built.body, serde_json::json!({"count": 3}).to_string());
    }

    #[test]
    fn leaf_rendering_to_non_json_stays_a_raw_string() {
        let root = ResponseObject::default().with_field("name", leaf("{{.name}}"));
        let builder = ObjectBuilder::new(StatusCode::new(200).unwrap(), root);
        let built = builder
            .build(&MapEvaluator(serde_json::json!({"name": "not json"})))
            .unwrap();
        assert_eq!(built.body, serde_json::json!({"name": "not json"}).to_string());
    }

    #[test]
    fn empty_rendered_leaf_is_empty_string_not_null() {
        let root = ResponseObject::default().with_field("missing", leaf("{{.missing}}"));
        let builder = ObjectBuilder::new(StatusCode::new(200).unwrap(), root);
        let built = builder.build(&MapEvaluator(serde_json::json!({}))).unwrap();
        assert_eq!(built.body, serde_json::json!({"missing": ""}).to_string());
    }

    #[test]
    fn interior_nodes_mirror_config_shape() {
        let root = ResponseObject::default().with_field(
            "user",
            ResponseObject::default()
                .with_field("id", leaf("{{.id}}"))
                .with_field("name", leaf("{{.name}}")),
        );
        let builder = ObjectBuilder::new(StatusCode::new(200).unwrap(), root);
        let built = builder
            .build(&MapEvaluator(serde_json::json!({"id": 1, "name": "ada"})))
            .unwrap();
        assert_eq!(
            built.body,
            serde_json::json!({"user": {"id": 1, "name": "ada"}}).to_string()
        );
    }
}

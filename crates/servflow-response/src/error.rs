//! Errors a response builder can raise while rendering (§4.E).

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResponseError {
    #[error("response template failed to render: {0}")]
    Render(#[from] servflow_template::TemplateError),
}

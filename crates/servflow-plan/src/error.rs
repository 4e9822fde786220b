//! Plan-compilation errors (§4.F step 2): schema errors and per-action
//! config errors accumulate together rather than failing fast.

#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error("schema error at `{path}`: {message}")]
    SchemaValidation { path: String, message: String },

    #[error("action `{action_id}`: {message}")]
    ActionConfig { action_id: String, message: String },
}

#[derive(Debug, Clone, Default, thiserror::Error)]
#[error("{} error(s) compiling plan: {}", errors.len(), errors.iter().map(std::string::ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationErrors {
    pub errors: Vec<CompileError>,
}

impl ValidationErrors {
    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn into_result<T>(self, ok: T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(ok)
        } else {
            Err(self)
        }
    }
}

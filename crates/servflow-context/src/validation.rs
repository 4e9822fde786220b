//! Validation errors accumulated by structured-conditional functions
//! (`email`, `empty`, `notempty`, `bcrypt` — §4.D).

use serde::Serialize;

/// One failed check, as appended by a conditional function when its
/// predicate is false. `title` is the human-facing label the plan author
/// gave the check; `message` explains why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub title: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

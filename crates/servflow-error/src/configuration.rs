//! Errors produced by plan compilation (§4.F, §7). Never returned from a
//! request walk — compilation happens once, at configuration load.

/// A schema-level validation failure: an empty id, a bad HTTP method, a
/// response code outside `[100,599]`, or a reference to an unknown step.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct SchemaValidationError {
    /// Dotted path into the `APIConfig` that failed validation, e.g.
    /// `"actions.fetch_user.next"`.
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl SchemaValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// An action whose `type` is unregistered, or whose `config` is missing a
/// field the registered action declares as required.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("action `{action_id}`: {message}")]
pub struct ActionConfigError {
    /// The offending action's id within the plan.
    pub action_id: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ActionConfigError {
    pub fn new(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            message: message.into(),
        }
    }
}

/// Aggregate of every validation failure found while compiling an
/// `APIConfig`. Compilation collects as many errors as it can rather than
/// stopping at the first one, so an operator sees the whole list at once.
#[derive(Debug, Clone, Default, thiserror::Error, PartialEq, Eq)]
pub struct ConfigurationError {
    pub schema_errors: Vec<SchemaValidationError>,
    pub action_errors: Vec<ActionConfigError>,
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} configuration error(s):",
            self.schema_errors.len() + self.action_errors.len()
        )?;
        for e in &self.schema_errors {
            writeln!(f, "  - {e}")?;
        }
        for e in &self.action_errors {
            writeln!(f, "  - {e}")?;
        }
        Ok(())
    }
}

impl ConfigurationError {
    /// An empty aggregate — no errors found.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if no schema or action-config errors were collected.
    pub fn is_empty(&self) -> bool {
        self.schema_errors.is_empty() && self.action_errors.is_empty()
    }

    pub fn push_schema(&mut self, err: SchemaValidationError) {
        self.schema_errors.push(err);
    }

    pub fn push_action(&mut self, err: ActionConfigError) {
        self.action_errors.push(err);
    }

    /// Merge another aggregate's errors into this one.
    pub fn extend(&mut self, other: ConfigurationError) {
        self.schema_errors.extend(other.schema_errors);
        self.action_errors.extend(other.action_errors);
    }

    /// Turn this aggregate into `Err(self)` unless it is empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

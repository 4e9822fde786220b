//! The error an action's [`Executable`](https://docs.rs/servflow-action)
//! can return from a single step (§7). Routing (whether it goes to
//! `fail` or propagates) is the runtime's job, not this type's.

/// Error returned by a single action execution or template render.
///
/// `clean_failure` marks the sentinel "this is a policy decision, not an
/// exception" case from §7 (`ErrFailure`): actions set it when the
/// failure is an expected outcome (e.g. "record not found") rather than
/// an infrastructure fault, but it does not change routing — both kinds
/// go to `fail` if defined, else propagate identically.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
    pub clean_failure: bool,
    pub canceled: bool,
}

impl ExecutionError {
    /// An execution fault (I/O error, panic-adjacent bug in an action).
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            clean_failure: false,
            canceled: false,
        }
    }

    /// A clean, expected failure (`ErrFailure` in §7) — still routes to
    /// `fail`, but distinguishable from an infrastructure fault by
    /// callers that want to log differently.
    pub fn clean_failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            clean_failure: true,
            canceled: false,
        }
    }

    /// Wrap a template rendering failure — §7 says these route exactly
    /// like an execution fault.
    pub fn template(message: impl Into<String>) -> Self {
        Self::fault(message)
    }

    /// A sub-execution stopped because its context was canceled. The
    /// parallel action (§5) swallows these rather than aggregating them.
    pub fn canceled(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            clean_failure: true,
            canceled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_is_not_clean_failure() {
        assert!(!ExecutionError::fault("boom").clean_failure);
    }

    #[test]
    fn clean_failure_is_marked() {
        assert!(ExecutionError::clean_failure("not found").clean_failure);
    }

    #[test]
    fn display_is_just_the_message() {
        assert_eq!(ExecutionError::fault("boom").to_string(), "boom");
    }
}

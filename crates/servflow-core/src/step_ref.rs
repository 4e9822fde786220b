//! Namespaced step identifiers.
//!
//! Every reference between plan steps (`next`, `onTrue`, `onFalse`,
//! `http.next`, `mcp.start`) is written in a config file as a prefixed
//! string (`actions.<id>`, `conditionals.<id>`, `responses.<id>`). The
//! compiler canonicalizes these into a [`StepRef`] once; the runtime
//! never re-parses strings while walking the graph.

use std::fmt;
use std::sync::Arc;

/// Which map a [`StepRef`] indexes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `actions.<id>`
    Action,
    /// `conditionals.<id>`
    Conditional,
    /// `responses.<id>`
    Response,
}

impl Namespace {
    /// The config-file prefix for this namespace, without the trailing dot.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Action => "actions",
            Self::Conditional => "conditionals",
            Self::Response => "responses",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A canonicalized, namespaced reference to a step in a [compiled plan](https://docs.rs/servflow-plan).
///
/// Cheap to clone (`Arc<str>` for the bare id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepRef {
    namespace: Namespace,
    id: Arc<str>,
}

/// Error returned when a raw `"namespace.id"` string does not parse into a [`StepRef`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid step reference `{0}`: expected `actions.<id>`, `conditionals.<id>` or `responses.<id>`")]
pub struct StepRefParseError(pub String);

impl StepRef {
    /// Build a reference directly, bypassing string parsing.
    pub fn new(namespace: Namespace, id: impl Into<Arc<str>>) -> Self {
        Self {
            namespace,
            id: id.into(),
        }
    }

    /// Shorthand for `StepRef::new(Namespace::Action, id)`.
    pub fn action(id: impl Into<Arc<str>>) -> Self {
        Self::new(Namespace::Action, id)
    }

    /// Shorthand for `StepRef::new(Namespace::Conditional, id)`.
    pub fn conditional(id: impl Into<Arc<str>>) -> Self {
        Self::new(Namespace::Conditional, id)
    }

    /// Shorthand for `StepRef::new(Namespace::Response, id)`.
    pub fn response(id: impl Into<Arc<str>>) -> Self {
        Self::new(Namespace::Response, id)
    }

    /// Parse a config-file reference like `"actions.fetch_user"`.
    ///
    /// The bare id may itself contain dots (e.g. `actions.fetch.user`);
    /// only the first segment is taken as the namespace.
    pub fn parse(raw: &str) -> Result<Self, StepRefParseError> {
        let (prefix, rest) = raw
            .split_once('.')
            .ok_or_else(|| StepRefParseError(raw.to_string()))?;
        if rest.is_empty() {
            return Err(StepRefParseError(raw.to_string()));
        }
        let namespace = match prefix {
            "actions" => Namespace::Action,
            "conditionals" => Namespace::Conditional,
            "responses" => Namespace::Response,
            _ => return Err(StepRefParseError(raw.to_string())),
        };
        Ok(Self {
            namespace,
            id: Arc::from(rest),
        })
    }

    /// The namespace this reference belongs to.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// The bare id, without namespace prefix.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.id)
    }
}

impl std::str::FromStr for StepRef {
    type Err = StepRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

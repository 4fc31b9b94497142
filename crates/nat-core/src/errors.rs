//! Structured error taxonomy shared by the NAT crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and key/value detail carried by every [`GraphError`].
///
/// Codes are short kebab-case tags such as `duplicate-edge` or
/// `rollback-failed`. Mirrored mutations record where they stopped under the
/// `phase` key (`mirror` or `rollback`) and whether the forward half was
/// undone under `rollback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case tag that tests and callers match on.
    pub code: String,
    /// One-line description of the failure.
    pub message: String,
    /// Node ids, capacities and transaction phase, sorted by key.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// What the caller can do next, when there is something to do.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with no context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `key=value`, replacing an earlier value under the same key.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets the hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Renders as `[code] message {k=v k=v}; hint`.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut pairs = self.context.iter();
        if let Some((key, value)) = pairs.next() {
            write!(f, " {{{key}={value}")?;
            for (key, value) in pairs {
                write!(f, " {key}={value}")?;
            }
            f.write_str("}")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; {hint}"),
            None => Ok(()),
        }
    }
}

/// How a caller should treat a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Expected no-op outcome; the store is unchanged and valid.
    Warning,
    /// An allocation failed or a budget was exhausted; the store is unchanged.
    Resource,
    /// The request itself was malformed; the store is unchanged.
    Invalid,
    /// An invariant could not be restored; the store must not be trusted.
    Fatal,
}

/// Canonical error type for graph store operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "class", content = "detail")]
pub enum GraphError {
    /// A node or edge with the same identity is already present.
    #[error("already exists: {0}")]
    AlreadyExists(ErrorInfo),
    /// The referenced node or edge does not exist.
    #[error("not found: {0}")]
    NotFound(ErrorInfo),
    /// An allocation failed or would exceed the configured budget.
    #[error("out of memory: {0}")]
    OutOfMemory(ErrorInfo),
    /// The caller supplied a malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(ErrorInfo),
    /// An internal invariant is broken and could not be repaired.
    #[error("corrupted: {0}")]
    Corrupted(ErrorInfo),
}

impl GraphError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            GraphError::AlreadyExists(info)
            | GraphError::NotFound(info)
            | GraphError::OutOfMemory(info)
            | GraphError::InvalidArgument(info)
            | GraphError::Corrupted(info) => info,
        }
    }

    /// Returns the stable machine readable code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Classifies the error.
    pub fn severity(&self) -> Severity {
        match self {
            GraphError::AlreadyExists(_) | GraphError::NotFound(_) => Severity::Warning,
            GraphError::OutOfMemory(_) => Severity::Resource,
            GraphError::InvalidArgument(_) => Severity::Invalid,
            GraphError::Corrupted(_) => Severity::Fatal,
        }
    }

    /// Returns true only for [`GraphError::Corrupted`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, GraphError::Corrupted(_))
    }

    /// Adds a context entry to the payload, keeping the variant.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.map_info(|info| info.with_context(key, value))
    }

    /// Sets a remediation hint on the payload, keeping the variant.
    /// Sets the hint.
    pub fn with_hint(self, hint: impl Into<String>) -> Self {
        self.map_info(|info| info.with_hint(hint))
    }

    fn map_info(self, f: impl FnOnce(ErrorInfo) -> ErrorInfo) -> Self {
        match self {
            GraphError::AlreadyExists(info) => GraphError::AlreadyExists(f(info)),
            GraphError::NotFound(info) => GraphError::NotFound(f(info)),
            GraphError::OutOfMemory(info) => GraphError::OutOfMemory(f(info)),
            GraphError::InvalidArgument(info) => GraphError::InvalidArgument(f(info)),
            GraphError::Corrupted(info) => GraphError::Corrupted(f(info)),
        }
    }
}

//! Error and warning types for the revision call graph model.
//!
//! Every fallible domain operation returns [`CallGraphError`]. Problems that the
//! decoder can recover from locally are reported as [`DecodeWarning`]s inside a
//! [`Decoded`] value instead of being logged from within the domain layer.

use thiserror::Error;

use crate::domain::hierarchy::Scope;
use crate::domain::methods::MethodId;

/// Errors produced while building, decoding or validating a call graph.
#[derive(Debug, Error)]
pub enum CallGraphError {
    /// A URI string failed to parse.
    #[error("malformed URI '{uri}': {reason}")]
    MalformedUri { uri: String, reason: String },

    /// A required field is absent (or empty, for coordinates).
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A method, caller, callee or call-site id is not an integer.
    #[error("invalid id in {field}: '{value}'")]
    InvalidId { field: String, value: String },

    /// Access modifier outside `public`, `private`, `protected` and `""`.
    #[error("unknown access modifier: '{0}'")]
    UnknownAccess(String),

    /// Scope name outside `internalTypes`, `externalTypes` and `resolvedTypes`.
    #[error("unknown scope: '{0}'")]
    UnknownScope(String),

    /// A call edge references a method id that no declared scope defines.
    #[error("dangling edge ({caller}, {callee}) in {scope}")]
    DanglingEdge {
        scope: &'static str,
        caller: MethodId,
        callee: MethodId,
    },

    /// The same type URI is declared in two scopes.
    #[error("type '{uri}' declared in both {first} and {second}")]
    ScopeConflict {
        uri: String,
        first: Scope,
        second: Scope,
    },

    /// Two ids of one type map to the same method URI, or one id is given twice.
    #[error("duplicate method '{uri}' at {path}")]
    DuplicateMethod { path: String, uri: String },

    /// A type was expected in a scope but is not there.
    #[error("type '{uri}' not found in {scope}")]
    TypeNotFound { uri: String, scope: Scope },

    /// Malformed JSON text or a value of the wrong JSON type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CallGraphError {
    pub(crate) fn malformed_uri(uri: &str, reason: impl Into<String>) -> Self {
        CallGraphError::MalformedUri {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }
}

pub type CallGraphResult<T> = Result<T, CallGraphError>;

/// A non-fatal problem the decoder recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// `timestamp` was absent; the value was defaulted to `-1`.
    MissingTimestamp,
    /// `timestamp` was present but not an integer; the value was defaulted to `-1`.
    InvalidTimestamp(String),
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeWarning::MissingTimestamp => write!(f, "no timestamp provided: assuming -1"),
            DecodeWarning::InvalidTimestamp(raw) => write!(f, "invalid timestamp {}: assuming -1", raw),
        }
    }
}

/// A successfully decoded value together with the warnings raised on the way.
#[derive(Debug)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<DecodeWarning>,
}

impl<T> Decoded<T> {
    pub fn new(value: T, warnings: Vec<DecodeWarning>) -> Self {
        Self { value, warnings }
    }

    /// Drop the warnings and keep the value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

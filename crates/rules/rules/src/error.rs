use thiserror::Error;

/// Boxed error returned by accessor implementations.
pub type AccessorError = Box<dyn std::error::Error + Send + Sync>;

/// Broad classification of a [`RuleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The ruleset or one of its constraints is malformed.
    Syntax,
    /// A resolved value cannot be tested by a primitive operator.
    Type,
    /// The registration or ignore-list API was misused.
    Parameter,
    /// An accessor failed while fetching its value.
    Accessor,
    /// Engine configuration could not be loaded.
    Config,
}

/// Errors that can occur during ruleset parsing, value resolution, or evaluation.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The ruleset shape is invalid (wrong node type, unknown operator,
    /// non-primitive limit, missing nested field, ...).
    #[error("rule syntax error: {0}")]
    Syntax(String),

    /// No accessor is registered under a name the ruleset refers to.
    #[error("rule syntax error: missing accessor definition for '{accessor}'{}", accessed_by(.parameters))]
    MissingAccessor {
        /// The top-level accessor name.
        accessor: String,
        /// Child paths that referenced the accessor; empty for direct access.
        parameters: Vec<String>,
    },

    /// A value evaluated against a primitive operator is not a primitive.
    #[error("type error: {0}")]
    Type(String),

    /// Invalid accessor registration or ignore-list entry.
    #[error("parameter error: {0}")]
    Parameter(String),

    /// An accessor returned an error. The original error is kept as the source.
    #[error("accessor '{accessor}' failed: {source}")]
    Accessor {
        /// Name of the failing accessor.
        accessor: String,
        /// The error produced by the accessor.
        #[source]
        source: AccessorError,
    },

    /// Engine configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A ruleset document could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),
}

impl RuleError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(_) | Self::MissingAccessor { .. } | Self::Parse(_) => ErrorKind::Syntax,
            Self::Type(_) => ErrorKind::Type,
            Self::Parameter(_) => ErrorKind::Parameter,
            Self::Accessor { .. } => ErrorKind::Accessor,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

fn accessed_by(parameters: &[String]) -> String {
    if parameters.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = parameters.iter().map(|p| format!("'{p}'")).collect();
    format!(", accessed by: {}", quoted.join(", "))
}

use thiserror::Error;

/// Failure while turning raw tokens into typed values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// An option that requires a value reached end of input, or was followed
    /// directly by another option.
    #[error("option '{option}' needs a value")]
    MissingValue { option: String },

    /// The token could not be converted by the caster selected for the option.
    #[error("option '{option}' must be {expected}, got '{value}'")]
    InvalidValue {
        option: String,
        value: String,
        expected: &'static str,
    },
}

impl ParseError {
    /// Name of the option or parameter the error refers to.
    pub fn option(&self) -> &str {
        match self {
            Self::MissingValue { option } | Self::InvalidValue { option, .. } => option,
        }
    }
}

/// Failure while binding parsed values to a signature, before the callable runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("missing required argument: '{name}'")]
    MissingArgument { name: String },

    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositionals { expected: usize, given: usize },

    #[error("got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { name: String },

    #[error("got multiple values for argument '{name}'")]
    MultipleValues { name: String },
}

/// A callable descriptor or its description text is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("duplicate parameter name '{name}'")]
    DuplicateName { name: String },

    #[error("parameter '{name}' without a default follows a parameter with one")]
    RequiredAfterDefault { name: String },

    #[error("{defaults} defaults given for {params} parameters")]
    TooManyDefaults { params: usize, defaults: usize },

    #[error("description line '{line}' names more than one parameter: {}", names.join(", "))]
    AmbiguousOption { line: String, names: Vec<String> },
}

/// Everything that can go wrong while executing a command.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// The callable itself returned an error.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

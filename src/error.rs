use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PwError {
    /// option given without the value it needs, e.g. a trailing `-l`
    #[error("{0} requires a value")]
    MissingOptionValue(String),

    #[error("invalid length '{0}': password length must be between 4 and 128")]
    InvalidLength(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("no character set enabled, at least one must be included")]
    EmptyCharset,

    #[error("unable to allocate a {0} character password")]
    AllocationFailure(usize),
}

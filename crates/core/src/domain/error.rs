// Domain Error Types

use thiserror::Error;

/// Reasons a message body cannot be turned into a work descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Malformed message body: {0}")]
    Malformed(String),

    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Field '{field}' cannot be used in an artifact name: {value:?}")]
    UnsafeName { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MalformedRequest,
    InvalidAmount,
    DuplicateSaga,
    UnknownSaga,
    InvalidStateTransition,
    ConfigError,
    StorageError,
    SerializationError,
    TransportError,
    SagaAborted,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SagaError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("saga already exists for reference_id={0}")]
    DuplicateSaga(String),

    #[error("no saga known for reference_id={0}")]
    UnknownSaga(String),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("storage error during {operation}: {details}")]
    StorageError { operation: String, details: String },

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("transport error during {operation}: {details}")]
    TransportError { operation: String, details: String },

    #[error("saga aborted reference_id={reference_id}: {details}")]
    SagaAborted { reference_id: String, details: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, SagaError>;

impl SagaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SagaError::MalformedRequest(_) => ErrorCode::MalformedRequest,
            SagaError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            SagaError::DuplicateSaga(_) => ErrorCode::DuplicateSaga,
            SagaError::UnknownSaga(_) => ErrorCode::UnknownSaga,
            SagaError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            SagaError::ConfigError(_) => ErrorCode::ConfigError,
            SagaError::StorageError { .. } => ErrorCode::StorageError,
            SagaError::SerializationError { .. } => ErrorCode::SerializationError,
            SagaError::TransportError { .. } => ErrorCode::TransportError,
            SagaError::SagaAborted { .. } => ErrorCode::SagaAborted,
            SagaError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn storage(operation: impl Into<String>, details: impl ToString) -> Self {
        SagaError::StorageError { operation: operation.into(), details: details.to_string() }
    }

    pub fn transport(operation: impl Into<String>, details: impl ToString) -> Self {
        SagaError::TransportError { operation: operation.into(), details: details.to_string() }
    }

    pub fn invalid_transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        SagaError::InvalidStateTransition { from: format!("{:?}", from), to: format!("{:?}", to) }
    }
}

impl From<io::Error> for SagaError {
    fn from(err: io::Error) -> Self {
        SagaError::StorageError { operation: "io".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for SagaError {
    fn from(err: serde_json::Error) -> Self {
        SagaError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<figment::Error> for SagaError {
    fn from(err: figment::Error) -> Self {
        SagaError::ConfigError(format!("config extraction failed: {}", err))
    }
}

impl From<reqwest::Error> for SagaError {
    fn from(err: reqwest::Error) -> Self {
        let operation = if err.is_timeout() {
            "http timeout"
        } else if err.is_connect() {
            "http connect"
        } else if err.is_decode() {
            "http decode"
        } else {
            "http request"
        };
        SagaError::TransportError { operation: operation.to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `SagaError` variants at the call site to preserve context.

#[macro_export]
macro_rules! storage_err {
    ($op:expr, $err:expr) => {
        $crate::foundation::SagaError::StorageError { operation: $op.into(), details: $err.to_string() }
    };
}

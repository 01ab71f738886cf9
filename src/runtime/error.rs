use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Type mismatch: {message}")]
    TypeMismatch { message: String },
    #[error("Operation not supported: {message}")]
    Unsupported { message: String },
}

impl EvalError {
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            message: message.into(),
        }
    }
}

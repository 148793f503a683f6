use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    #[error("invalid anchor pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
}

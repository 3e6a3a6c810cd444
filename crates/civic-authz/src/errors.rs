use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("invalid action: {0:?}")]
    InvalidAction(String),
    #[error("invalid permission: {0}")]
    InvalidPermission(String),
}

pub type AuthzResult<T> = Result<T, AuthzError>;

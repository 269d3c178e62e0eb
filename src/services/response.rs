use std::fmt::Display;

pub type AnyError = dyn std::error::Error + Send + Sync;

#[derive(Debug)]
pub enum ServiceError {
    StoreUnavailable,
    DatabaseError(Box<AnyError>),
    ParsingError,
    BadRequest,
    UserCloseConnection,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::StoreUnavailable => write!(f, "StoreUnavailable"),
            ServiceError::DatabaseError(res) => write!(f, "{}", res),
            ServiceError::ParsingError => write!(f, "ParsingError"),
            ServiceError::BadRequest => write!(f, "BadRequest"),
            ServiceError::UserCloseConnection => write!(f, "UserCloseConnection"),
        }
    }
}

impl std::error::Error for ServiceError {}

use thiserror::Error;

/// Error signal returned by every service operation. The HTTP layer maps each
/// variant to a status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found with id of {}", entity, id))
    }

    pub fn forbidden(user_id: impl std::fmt::Display, action: &str) -> Self {
        Self::Forbidden(format!("user {} is not authorized to {}", user_id, action))
    }

    /// Stable numeric code for logs.
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 1001,
            ServiceError::Unauthorized(_) => 1002,
            ServiceError::Forbidden(_) => 1003,
            ServiceError::NotFound(_) => 1004,
            ServiceError::Conflict(_) => 1005,
            ServiceError::Db(_) => 1200,
            ServiceError::Model(_) => 1201,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            // Model-level validation is a client error, surface its message as-is.
            models::errors::ModelError::Validation(msg) => ServiceError::Validation(msg),
            other => ServiceError::Model(other),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Db(e.to_string())
    }
}

use sea_orm::error::DbErr;

use crate::models::OrderStatus;

/// Errors raised by the stores, the reconciler and the inventory aggregator.
///
/// Every variant reaching an order transaction boundary causes a rollback.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Underlying engine failure (I/O, constraint violation, ...)
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    /// A write references a foreign entity that does not exist
    #[error("Referential error: {entity} {id} does not exist")]
    ReferentialError { entity: &'static str, id: i32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidState { from: OrderStatus, to: OrderStatus },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Coarse classification the presentation layer maps to user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Referential,
    NotFound,
    InvalidState,
    Validation,
    Storage,
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    pub fn referential(entity: &'static str, id: i32) -> Self {
        ServiceError::ReferentialError { entity, id }
    }

    pub fn not_found(entity: &str, id: i32) -> Self {
        ServiceError::NotFound(format!("{} {} not found", entity, id))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ReferentialError { .. } => ErrorCategory::Referential,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::InvalidState { .. } => ErrorCategory::InvalidState,
            Self::ValidationError(_) => ErrorCategory::Validation,
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                ErrorCategory::Storage
            }
        }
    }

    /// Message suitable for display.
    /// Storage faults return a generic message to avoid leaking engine details.
    pub fn user_message(&self) -> String {
        match self.category() {
            ErrorCategory::Storage => "Storage error".to_string(),
            _ => self.to_string(),
        }
    }
}

// Type aliases for call sites that speak of application or order errors
pub type AppError = ServiceError;
pub type OrderError = ServiceError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_mapping() {
        assert_eq!(
            ServiceError::referential("Article", 4).category(),
            ErrorCategory::Referential
        );
        assert_eq!(
            ServiceError::not_found("Order", 1).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ServiceError::InvalidState {
                from: OrderStatus::Annulee,
                to: OrderStatus::Confirmee,
            }
            .category(),
            ErrorCategory::InvalidState
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("disk full".into())).category(),
            ErrorCategory::Storage
        );
    }

    #[test]
    fn user_message_hides_storage_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("disk full".into())).user_message(),
            "Storage error"
        );
        assert_eq!(
            ServiceError::referential("Article", 42).user_message(),
            "Referential error: Article 42 does not exist"
        );
        assert_eq!(
            ServiceError::InvalidState {
                from: OrderStatus::Annulee,
                to: OrderStatus::Confirmee,
            }
            .user_message(),
            "Invalid state transition: Annulee -> Confirmee"
        );
    }
}

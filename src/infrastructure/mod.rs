pub mod customer_repo;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod product_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let target = info.constraint_name().unwrap_or("unique constraint");
                DomainError::Conflict(format!("Record already exists ({}).", target))
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

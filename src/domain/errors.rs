use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    InvalidReference(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Product(s) {} not found", join_ids(.0))]
    ProductsNotFound(Vec<Uuid>),
    #[error("Product(s) {} exceed(s) available quantities", join_ids(.0))]
    InsufficientStock(Vec<Uuid>),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub(crate) fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

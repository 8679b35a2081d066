use thiserror::Error;

/// Violations of domain invariants at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Price must be positive, got {0}")]
    InvalidPrice(String),

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(String),

    #[error("Signal {0} is not a BUY and cannot be paired")]
    NotABuy(String),
}

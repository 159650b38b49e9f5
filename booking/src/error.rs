use catalog::CatalogError;
use corelib::SeatId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("no seats selected")]
    EmptySelection,

    #[error("no booking in progress")]
    DraftNotFound,

    #[error("booking draft does not match token {0}")]
    DraftTokenMismatch(String),

    #[error("seats no longer available: {}", .0.join(", "))]
    SeatsUnavailable(Vec<SeatId>),

    #[error("payment declined: {0}")]
    PaymentDeclined(String),

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

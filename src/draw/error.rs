use thiserror::Error;

/// 单次抽奖的失败原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("Booking id must not be empty")]
    EmptyBookingId,

    #[error("Booking id {0} has already been used")]
    AlreadyConsumed(String),

    #[error("No prizes are configured")]
    InvalidPrizeTable,

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl DrawError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        DrawError::PersistenceFailure(err.to_string())
    }
}

use thiserror::Error;

use crate::scheduling::SchedulingError;
use crate::words::StoreError;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The session has no card left; callers must check `is_finished` first
    #[error("Review queue is empty")]
    EmptyQueue,
}

pub type Result<T> = std::result::Result<T, ReviewError>;

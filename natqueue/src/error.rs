use derive_more::Display;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[display(fmt = "queue is absent")]
    InvalidArgument,

    #[display(fmt = "could not allocate storage")]
    AllocationFailure,

    /// The normal "nothing to remove" return of a head removal.
    #[display(fmt = "queue is empty")]
    Empty,
}

impl std::error::Error for QueueError {}

impl From<std::collections::TryReserveError> for QueueError {
    fn from(_: std::collections::TryReserveError) -> Self {
        QueueError::AllocationFailure
    }
}

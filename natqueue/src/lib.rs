pub mod alloc;
pub mod cmd;
pub mod error;
pub mod natsort;
pub mod ops;
pub mod queue;

pub use alloc::{Allocator, FailPolicy};
pub use error::QueueError;
pub use queue::{Queue, TieBreak};

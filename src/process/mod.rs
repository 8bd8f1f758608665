//! Message orchestration and the batch runner.

pub mod batch;
pub mod message;

pub use batch::{BatchReport, BatchRunner};
pub use message::{MessageOutcome, MessageProcessor};

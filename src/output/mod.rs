// src/output/mod.rs
//! Output handling with clear separation of planning and execution.
//!
//! A plan lists where the rendered document goes; [`deliver`] performs
//! the I/O and reports per-target results.

mod clipboard;
mod types;
mod writer;

pub use clipboard::copy_to_clipboard;
pub use types::{
    CompletedOperation, DeliveryTarget, ExecutionStats, FailedOperation, OutputPlan, OutputReport,
};
pub use writer::deliver;

// src/output/writer.rs
//! Executes output operations by performing actual I/O.
//!
//! This is the only place the CLI writes files or stdout.

use super::clipboard::copy_to_clipboard;
use super::types::*;
use crate::error::AppError;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Delivers the output plan. Individual failures are recorded in the
/// report rather than aborting the remaining operations.
pub fn deliver(plan: OutputPlan) -> Result<OutputReport, AppError> {
    let mut report = OutputReport::new();
    let start_time = Instant::now();

    log::info!(
        "Executing output plan with {} operations",
        plan.operations.len()
    );

    for operation in plan.operations {
        let op_start = Instant::now();
        match execute_operation(&operation) {
            Ok(bytes_written) => {
                report = report.with_completed(CompletedOperation {
                    operation,
                    bytes_written,
                    duration_ms: op_start.elapsed().as_millis() as u64,
                });
            }
            Err(e) => {
                log::error!("Operation failed: {}", e);
                report = report.with_failed(FailedOperation {
                    operation,
                    error: e.to_string(),
                });
            }
        }
    }

    report.stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

    log::info!(
        "Output plan execution complete: {} succeeded, {} failed in {}ms",
        report.stats.operations_completed,
        report.stats.operations_failed,
        report.stats.total_duration_ms
    );

    Ok(report)
}

fn execute_operation(operation: &DeliveryTarget) -> Result<usize, AppError> {
    match operation {
        DeliveryTarget::WriteFile { path, content } => write_file(path, content),
        DeliveryTarget::CopyToClipboard { content } => {
            copy_to_clipboard(content)?;
            Ok(content.len())
        }
        DeliveryTarget::PrintToStdout { content } => {
            print_to_stdout(content)?;
            Ok(content.len())
        }
    }
}

fn write_file(path: &Path, content: &str) -> Result<usize, AppError> {
    log::debug!("Writing {} bytes to {}", content.len(), path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    log::info!("Wrote file: {}", path.display());
    Ok(content.len())
}

fn print_to_stdout(content: &str) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/doc.md");
        let plan = OutputPlan::new().with_operation(DeliveryTarget::WriteFile {
            path: path.clone(),
            content: "# Report".to_string(),
        });

        let report = deliver(plan).unwrap();

        assert!(report.is_success());
        assert_eq!(report.stats.bytes_written, 8);
        assert_eq!(fs::read_to_string(path).unwrap(), "# Report");
    }

    #[test]
    fn test_failed_write_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let plan = OutputPlan::new().with_operation(DeliveryTarget::WriteFile {
            path: blocker.join("child.md"),
            content: "text".to_string(),
        });
        let report = deliver(plan).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.stats.operations_failed, 1);
        assert_eq!(report.failed[0].operation.content(), "text");
    }
}

//! Read/write coefficient JSON files.
//!
//! The coefficient file is the artifact handed to the runtime implementation:
//! - central region numerator/denominator, degrees and training errors
//! - tail region numerator/denominator, degrees and training errors
//! - the boundary parameters the fits were produced for
//!
//! The schema is defined by `domain::CoefficientExport`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::CoefficientExport;
use crate::error::{AppError, EXIT_INPUT};

/// Write a coefficient JSON file (pretty-printed, trailing newline).
pub fn write_coefficients_json(path: &Path, export: &CoefficientExport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create coefficient JSON '{}': {e}", path.display()),
        )
    })?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, export)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write coefficient JSON: {e}")))?;
    std::io::Write::write_all(&mut writer, b"\n")
        .and_then(|()| std::io::Write::flush(&mut writer))
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write coefficient JSON: {e}")))?;

    Ok(())
}

/// Read a coefficient JSON file and check every region.
pub fn read_coefficients_json(path: &Path) -> Result<CoefficientExport, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open coefficient JSON '{}': {e}", path.display()),
        )
    })?;
    let export: CoefficientExport = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid coefficient JSON: {e}")))?;
    export
        .validate()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid coefficient JSON '{}': {e}", path.display())))?;
    Ok(export)
}

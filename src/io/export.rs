//! Export per-sample training errors to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or plotting scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::Region;
use crate::error::{AppError, EXIT_INPUT};
use crate::fit::SampleError;

/// Write per-sample errors of every region to a CSV file.
///
/// Regions are written in the order given; rows keep the sample order.
pub fn write_errors_csv(path: &Path, regions: &[(Region, &[SampleError])]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to create error CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "region,x,abscissa,weight,z_exact,z_fit,abs_error")
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write error CSV header: {e}")))?;

    for (region, errors) in regions {
        for e in *errors {
            writeln!(
                out,
                "{},{:e},{:.17e},{},{:.17e},{:.17e},{:e}",
                region, e.x, e.abscissa, e.weight, e.z_exact, e.z_fit, e.abs_error,
            )
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write error CSV row: {e}")))?;
        }
    }

    out.flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write error CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(x: f64, abs_error: f64) -> SampleError {
        SampleError {
            x,
            abscissa: x - 0.5,
            weight: 3.0,
            z_exact: -1.0,
            z_fit: -1.0 + abs_error,
            abs_error,
        }
    }

    #[test]
    fn writes_header_and_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.csv");
        let central = vec![row(0.03, 1e-6), row(0.5, 0.0)];
        let tail = vec![row(1e-10, 2e-9)];
        write_errors_csv(&path, &[(Region::Central, central.as_slice()), (Region::Tail, tail.as_slice())]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "region,x,abscissa,weight,z_exact,z_fit,abs_error");
        assert!(lines[1].starts_with("central,3e-2,"));
        assert!(lines[3].starts_with("tail,1e-10,"));
        assert!(lines[3].ends_with(",2e-9"));
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 7);
        }
    }
}

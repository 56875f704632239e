use std::io::Write;

use crate::{format_duration, LapRecord};

pub const CSV_HEADER: &str = "Lap,LapTime,CumulativeTime";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no laps to export")]
    NoLaps,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render laps as comma-separated rows under `CSV_HEADER`. Fields never hold
/// commas, so nothing is quoted. No trailing newline.
pub fn laps_to_csv(laps: &[LapRecord]) -> Result<String, ExportError> {
    if laps.is_empty() {
        return Err(ExportError::NoLaps);
    }
    let mut rows = Vec::with_capacity(laps.len() + 1);
    rows.push(CSV_HEADER.to_string());
    for lap in laps {
        rows.push(format!(
            "{},{},{}",
            lap.index,
            format_duration(lap.lap_duration_ms),
            format_duration(lap.cumulative_ms)
        ));
    }
    Ok(rows.join("\n"))
}

pub fn write_csv<W: Write>(laps: &[LapRecord], mut out: W) -> Result<(), ExportError> {
    let csv = laps_to_csv(laps)?;
    out.write_all(csv.as_bytes())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_laps() -> Vec<LapRecord> {
        vec![
            LapRecord {
                index: 1,
                lap_duration_ms: 500.0,
                cumulative_ms: 500.0,
            },
            LapRecord {
                index: 2,
                lap_duration_ms: 300.0,
                cumulative_ms: 800.0,
            },
        ]
    }

    #[test]
    fn test_laps_to_csv() {
        assert_eq!(
            laps_to_csv(&two_laps()).unwrap(),
            "Lap,LapTime,CumulativeTime\n1,00:00.500,00:00.500\n2,00:00.300,00:00.800"
        );
    }

    #[test]
    fn test_empty_export_refused() {
        assert!(matches!(laps_to_csv(&[]), Err(ExportError::NoLaps)));

        let mut out = Vec::new();
        assert!(matches!(write_csv(&[], &mut out), Err(ExportError::NoLaps)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&two_laps(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        assert_eq!(text.lines().count(), 3);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_no_laps_message() {
        assert_eq!(ExportError::NoLaps.to_string(), "no laps to export");
    }
}

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use timer_core::{write_csv, ExportError, LapRecord};

pub struct LapExporter {
    path: PathBuf,
}

impl LapExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the lap table, replacing any previous export. Refuses before
    /// touching the file when there are no laps.
    pub fn export(&self, laps: &[LapRecord]) -> Result<usize, ExportError> {
        if laps.is_empty() {
            return Err(ExportError::NoLaps);
        }
        let file = File::create(&self.path)?;
        write_csv(laps, BufWriter::new(file))?;
        log::info!("exported {} laps to {}", laps.len(), self.path.display());
        Ok(laps.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timer_core::TimerEngine;

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laps.csv");
        let exporter = LapExporter::new(&path);

        let mut sw = TimerEngine::new();
        sw.start(0.0);
        sw.lap(500.0);
        sw.lap(800.0);

        assert_eq!(exporter.export(sw.laps()).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Lap,LapTime,CumulativeTime\n1,00:00.500,00:00.500\n2,00:00.300,00:00.800"
        );
    }

    #[test]
    fn test_export_without_laps_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laps.csv");
        let exporter = LapExporter::new(&path);

        assert!(matches!(exporter.export(&[]), Err(ExportError::NoLaps)));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = LapExporter::new(dir.path().join("nope").join("laps.csv"));
        let mut sw = TimerEngine::new();
        sw.start(0.0);
        sw.lap(10.0);
        assert!(matches!(exporter.export(sw.laps()), Err(ExportError::Io(_))));
    }
}

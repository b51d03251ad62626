use anyhow::{Context, Result};
use std::fs::{create_dir_all, OpenOptions};
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("training data has {found} values where {expected} are expected")]
pub struct RecordLengthError {
    pub expected: usize,
    pub found: usize,
}

/// One trainee decision point: the position features and the value to regress towards.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingRecord {
    pub features: Vec<f64>,
    pub target: f64,
}

/// Records of one episode, all of the same feature dimension.
#[derive(Clone, Debug)]
pub struct RecordBuffer {
    dimension: usize,
    records: Vec<TrainingRecord>,
}

impl RecordBuffer {
    pub fn new(dimension: usize) -> Self { Self { dimension, records: Vec::new() } }

    pub fn dimension(&self) -> usize { self.dimension }

    pub fn push(&mut self, features: Vec<f64>, target: f64) -> Result<(), RecordLengthError> {
        if features.len() != self.dimension {
            return Err(RecordLengthError { expected: self.dimension, found: features.len() });
        }
        self.records.push(TrainingRecord { features, target });
        Ok(())
    }

    pub fn pop(&mut self) -> Option<TrainingRecord> { self.records.pop() }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn records(&self) -> &[TrainingRecord] { &self.records }

    /// Split into the (inputs, targets) pair `LinearModel::partial_fit` takes.
    pub fn to_batch(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        self.records.iter().map(|r| (r.features.clone(), r.target)).unzip()
    }
}

/// Appends records as comma-separated rows: features first, target last.
pub fn append_records<P: AsRef<Path>>(records: &[TrainingRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            create_dir_all(dir).with_context(|| format!("create records dir: {}", dir.display()))?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)
        .with_context(|| format!("open records file: {}", path.display()))?;
    let mut w = csv::WriterBuilder::new().has_headers(false).flexible(true).from_writer(file);
    for r in records {
        let mut row: Vec<String> = r.features.iter().map(|v| v.to_string()).collect();
        row.push(r.target.to_string());
        w.write_record(&row).context("write training record")?;
    }
    w.flush().context("flush training records")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_length_is_rejected() {
        let mut buf = RecordBuffer::new(3);
        assert!(buf.push(vec![0.1, 0.2, 0.3], 1.0).is_ok());
        let err = buf.push(vec![0.1], 1.0).unwrap_err();
        assert_eq!(err, RecordLengthError { expected: 3, found: 1 });
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn batch_keeps_arrival_order() {
        let mut buf = RecordBuffer::new(1);
        buf.push(vec![1.0], 0.5).unwrap();
        buf.push(vec![2.0], -0.5).unwrap();
        let (xs, ys) = buf.to_batch();
        assert_eq!(xs, vec![vec![1.0], vec![2.0]]);
        assert_eq!(ys, vec![0.5, -0.5]);
    }
}

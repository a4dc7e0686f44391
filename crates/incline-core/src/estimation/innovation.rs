//! Innovation records for offline noise tuning
//!
//! Every successful measurement update produces a residual y and its
//! covariance S. They are kept in a fixed-capacity ring buffer so a
//! long-running filter uses constant memory; the oldest record is
//! evicted first.

use std::collections::VecDeque;

use nalgebra::{Matrix2, Vector2};

/// Residual and its covariance from one update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnovationRecord {
    /// Innovation y = z − H·x
    pub y: Vector2<f64>,
    /// Innovation covariance S = H·P·Hᵀ + R
    pub s: Matrix2<f64>,
}

impl InnovationRecord {
    /// Normalized innovation squared yᵀ·S⁻¹·y
    ///
    /// Chi-square distributed with 2 degrees of freedom when the filter is
    /// consistent. `None` if S is not invertible.
    pub fn nis(&self) -> Option<f64> {
        let s_inv = self.s.try_inverse()?;
        Some(self.y.dot(&(s_inv * self.y)))
    }
}

/// Bounded log of innovation records
#[derive(Debug, Clone)]
pub struct InnovationLog {
    records: VecDeque<InnovationRecord>,
    capacity: usize,
    total: u64,
}

impl InnovationLog {
    /// Create a log holding at most `capacity` records (0 disables recording)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// Append a record, evicting the oldest one when full
    pub fn push(&mut self, record: InnovationRecord) {
        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Retained records, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &InnovationRecord> {
        self.records.iter()
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&InnovationRecord> {
        self.records.back()
    }

    /// Remove and return all retained records, oldest first
    pub fn drain(&mut self) -> Vec<InnovationRecord> {
        self.records.drain(..).collect()
    }

    /// Drop all records and reset the counter
    pub fn clear(&mut self) {
        self.records.clear();
        self.total = 0;
    }

    /// Number of retained records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records are retained
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of retained records
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records pushed since creation or the last clear,
    /// including evicted ones
    pub fn total_recorded(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(v: f64) -> InnovationRecord {
        InnovationRecord {
            y: Vector2::new(v, -v),
            s: Matrix2::identity(),
        }
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut log = InnovationLog::with_capacity(3);
        for i in 0..5 {
            log.push(record(i as f64));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.total_recorded(), 5);

        let kept: Vec<f64> = log.iter().map(|r| r.y.x).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
        assert_eq!(log.latest().map(|r| r.y.x), Some(4.0));
    }

    #[test]
    fn test_zero_capacity_counts_only() {
        let mut log = InnovationLog::with_capacity(0);
        log.push(record(1.0));

        assert!(log.is_empty());
        assert_eq!(log.total_recorded(), 1);
    }

    #[test]
    fn test_drain_empties_log() {
        let mut log = InnovationLog::with_capacity(4);
        log.push(record(1.0));
        log.push(record(2.0));

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        assert_eq!(log.total_recorded(), 2);
    }

    #[test]
    fn test_nis() {
        let r = InnovationRecord {
            y: Vector2::new(0.2, 0.1),
            s: Matrix2::new(0.04, 0.0, 0.0, 0.01),
        };

        // 0.2²/0.04 + 0.1²/0.01 = 1 + 1
        assert_relative_eq!(r.nis().unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nis_singular() {
        let r = InnovationRecord {
            y: Vector2::new(1.0, 1.0),
            s: Matrix2::zeros(),
        };
        assert!(r.nis().is_none());
    }
}

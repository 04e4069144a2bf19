//! Fractional Sibling Ordering
//!
//! Sibling order within a parent is a monotonically comparable `f64` key.
//! Inserting between two siblings takes the midpoint of their keys, so a
//! reorder touches exactly one row. Repeated midpoint insertion shrinks the
//! gaps; `needs_rebalancing` detects when a parent's keys should be respaced.

/// Calculates the fractional position for inserting a page between two siblings
pub struct PositionCalculator;

impl PositionCalculator {
    /// Calculate the position key for inserting between prev and next
    ///
    /// # Examples
    /// ```
    /// use pagespace_core::db::PositionCalculator;
    ///
    /// // First child
    /// assert_eq!(PositionCalculator::between(None, None), 1.0);
    /// // Before the first sibling
    /// assert_eq!(PositionCalculator::between(None, Some(1.0)), 0.0);
    /// // After the last sibling
    /// assert_eq!(PositionCalculator::between(Some(3.0), None), 4.0);
    /// // Between two siblings
    /// assert_eq!(PositionCalculator::between(Some(1.0), Some(2.0)), 1.5);
    /// ```
    pub fn between(prev: Option<f64>, next: Option<f64>) -> f64 {
        match (prev, next) {
            (None, None) => 1.0,
            (None, Some(next)) => next - 1.0,
            (Some(prev), None) => prev + 1.0,
            (Some(prev), Some(next)) => (prev + next) / 2.0,
        }
    }

    /// Check if rebalancing is needed (gap below precision threshold)
    pub fn needs_rebalancing(positions: &[f64]) -> bool {
        if positions.len() < 2 {
            return false;
        }

        for i in 1..positions.len() {
            let gap = positions[i] - positions[i - 1];
            if gap < 0.0001 {
                return true;
            }
        }
        false
    }

    /// Rebalance positions to even unit spacing
    ///
    /// # Example
    /// Input:  [1.0, 1.0001, 1.0002, 1.0003]
    /// Output: [1.0, 2.0, 3.0, 4.0]
    pub fn rebalance(count: usize) -> Vec<f64> {
        (1..=count).map(|i| i as f64).collect()
    }
}

//! Circular cross-correlation kernel
//!
//! For each non-sentinel lag `t` in a unit, computes
//! `sum_{k=0}^{n-1} x[k] * y[(t+k) mod n]` over the full-length signals the
//! unit carries. Plain double-precision dot product with wraparound indexing,
//! O(n) per lag — the dominant cost of the whole pipeline.

use crate::kernel::Kernel;
use crate::protocol::{CorrelationPartial, CorrelationUnit, SENTINEL_LAG};

/// Stateless circular cross-correlation kernel.
#[derive(Debug, Default)]
pub struct CorrelationKernel;

impl CorrelationKernel {
    pub fn new() -> Self {
        Self
    }

    fn correlate_at(x: &[f64], y: &[f64], lag: usize) -> f64 {
        let n = x.len();
        let mut sum = 0.0;
        for k in 0..n {
            sum += x[k] * y[(lag + k) % n];
        }
        sum
    }
}

impl Kernel for CorrelationKernel {
    type Unit = CorrelationUnit;
    type Partial = CorrelationPartial;

    fn process(&self, unit: &CorrelationUnit) -> CorrelationPartial {
        let mut values = vec![0.0; unit.lags.len()];
        for (slot, &lag) in unit.lags.iter().enumerate() {
            if lag != SENTINEL_LAG {
                values[slot] = Self::correlate_at(&unit.x, &unit.y, lag as usize);
            }
        }
        CorrelationPartial {
            source_id: unit.source_id,
            num_samples: unit.num_samples,
            lags: unit.lags.clone(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn unit(lags: Vec<i32>, x: Vec<f64>, y: Vec<f64>) -> CorrelationUnit {
        let n = x.len();
        CorrelationUnit::new(0, n, lags, Arc::new(x), Arc::new(y)).unwrap()
    }

    #[test]
    fn test_impulse_alignment() {
        // x and y both impulses at index 0: only lag 0 lines them up.
        let u = unit(
            vec![0, 1, 2, 3],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0],
        );
        let p = CorrelationKernel::new().process(&u);
        assert_eq!(p.values, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shifted_impulse() {
        // y's impulse sits at index 1, so the correlation peaks at lag 1:
        // x[0] * y[(1+0) mod 4] = 1.
        let u = unit(
            vec![0, 1, 2, 3],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
        );
        let p = CorrelationKernel::new().process(&u);
        assert_eq!(p.values, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_wraparound_indexing() {
        // Lag n-1 wraps: sum_k x[k] * y[(n-1+k) mod n].
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![4.0, 5.0, 6.0];
        let u = unit(vec![2], x.clone(), y.clone());
        let p = CorrelationKernel::new().process(&u);
        let expected = x[0] * y[2] + x[1] * y[0] + x[2] * y[1];
        assert_eq!(p.values[0], expected);
    }

    #[test]
    fn test_sentinel_slots_skipped() {
        let u = unit(
            vec![0, SENTINEL_LAG, SENTINEL_LAG],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        );
        let p = CorrelationKernel::new().process(&u);
        assert_eq!(p.values[0], 2.0);
        assert_eq!(p.values[1], 0.0);
        assert_eq!(p.values[2], 0.0);
        assert_eq!(p.lags, vec![0, SENTINEL_LAG, SENTINEL_LAG]);
    }

    #[test]
    fn test_matches_reference_formula() {
        let x = vec![0.5, -1.25, 2.0, 0.75, -0.5];
        let y = vec![1.5, 0.25, -0.75, 1.0, 2.25];
        let n = x.len();
        let u = unit((0..n as i32).collect(), x.clone(), y.clone());
        let p = CorrelationKernel::new().process(&u);
        for t in 0..n {
            let mut expected = 0.0;
            for k in 0..n {
                expected += x[k] * y[(t + k) % n];
            }
            assert_eq!(p.values[t], expected, "lag {t}");
        }
    }
}

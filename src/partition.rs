//! Row ownership.
//!
//! The shared-memory engine hands interior rows out round robin,
//! worker `k` of `W` owns `1 + k, 1 + k + W, ...`.
//! The distributed engine gives every rank one contiguous band of
//! `floor(d / ranks)` rows, and the last rank takes whatever is left
//! up to row `d - 2`.

use crate::error::*;
use std::iter::StepBy;
use std::ops::Range;

/// Interior rows owned by `worker` under the cyclic assignment.
pub fn cyclic_rows(
    dimension: usize,
    workers: usize,
    worker: usize,
) -> StepBy<Range<usize>> {
    debug_assert!(workers > 0);
    debug_assert!(worker < workers);
    (1 + worker..dimension.saturating_sub(1)).step_by(workers)
}

/// Half open range of rows `[start, end)` owned by one rank.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowBand {
    pub start: usize,
    pub end: usize,
}

impl RowBand {
    #[inline]
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn first(&self) -> usize {
        self.start
    }

    pub fn last(&self) -> usize {
        self.end - 1
    }

    /// Row just above the band, owned by the previous rank
    /// (or the top boundary).
    pub fn halo_above(&self) -> usize {
        self.start - 1
    }

    /// Row just below the band, owned by the next rank
    /// (or the bottom boundary).
    pub fn halo_below(&self) -> usize {
        self.end
    }

    /// The band plus both halo rows.
    pub fn with_halo(&self) -> Range<usize> {
        self.halo_above()..self.halo_below() + 1
    }
}

pub fn chunk_size(dimension: usize, ranks: usize) -> usize {
    dimension / ranks
}

/// Check that the band formula gives every rank at least one interior row
/// and keeps the last band off the bottom boundary.
pub fn validate_bands(dimension: usize, ranks: usize) -> RelaxResult<()> {
    if ranks == 0 {
        return Err(RelaxError::InvalidParameter(
            "at least one rank is required".to_string(),
        ));
    }
    let chunk = chunk_size(dimension, ranks);
    if dimension < 3 || chunk == 0 || 1 + (ranks - 1) * chunk >= dimension - 1
    {
        return Err(RelaxError::InvalidPartition { dimension, ranks });
    }
    Ok(())
}

pub fn band(dimension: usize, ranks: usize, rank: usize) -> RelaxResult<RowBand> {
    validate_bands(dimension, ranks)?;
    if rank >= ranks {
        return Err(RelaxError::InvalidParameter(format!(
            "rank {} out of range for {} ranks",
            rank, ranks
        )));
    }
    let chunk = chunk_size(dimension, ranks);
    let start = 1 + rank * chunk;
    let end = if rank == ranks - 1 {
        dimension - 1
    } else {
        1 + (rank + 1) * chunk
    };
    Ok(RowBand { start, end })
}

pub fn bands(dimension: usize, ranks: usize) -> RelaxResult<Vec<RowBand>> {
    validate_bands(dimension, ranks)?;
    (0..ranks).map(|rank| band(dimension, ranks, rank)).collect()
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn cyclic_rows_test() {
        let rows: Vec<usize> = cyclic_rows(11, 3, 1).collect();
        assert_eq!(rows, vec![2, 5, 8]);

        let rows: Vec<usize> = cyclic_rows(11, 1, 0).collect();
        assert_eq!(rows, (1..10).collect::<Vec<_>>());

        // More workers than rows, the tail owns nothing
        assert_eq!(cyclic_rows(4, 5, 4).count(), 0);
        assert_eq!(cyclic_rows(2, 1, 0).count(), 0);
    }

    #[test]
    fn band_test() {
        // chunk = 2, last rank absorbs rows 7..10
        let b = bands(11, 4).unwrap();
        assert_eq!(
            b,
            vec![
                RowBand { start: 1, end: 3 },
                RowBand { start: 3, end: 5 },
                RowBand { start: 5, end: 7 },
                RowBand { start: 7, end: 10 },
            ]
        );
        assert_eq!(b[3].len(), 3);
        assert_eq!(b[1].with_halo(), 2..6);
        assert_eq!(b[0].halo_above(), 0);
        assert_eq!(b[3].halo_below(), 10);

        assert_eq!(band(11, 1, 0).unwrap(), RowBand { start: 1, end: 10 });
    }

    #[test]
    fn invalid_band_test() {
        // chunk = 1, the formula would hand row 4 (boundary) to rank 3
        assert!(matches!(
            bands(5, 5),
            Err(RelaxError::InvalidPartition { .. })
        ));
        assert!(matches!(
            bands(3, 4),
            Err(RelaxError::InvalidPartition { .. })
        ));
        assert!(matches!(
            bands(2, 1),
            Err(RelaxError::InvalidPartition { .. })
        ));
        assert!(matches!(
            bands(11, 0),
            Err(RelaxError::InvalidParameter(_))
        ));
        assert!(matches!(
            band(11, 2, 2),
            Err(RelaxError::InvalidParameter(_))
        ));
    }
}

//! Run configuration shared by the drivers.

use crate::convergence::validate_precision;
use crate::error::*;

/// Everything a driver picks before calling an engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RelaxParameters {
    /// Side length of the square grid, boundary included.
    pub dimension: usize,

    /// Threads for the shared-memory engine, ranks for the distributed one.
    pub workers: usize,

    /// A cell has converged once a sweep moves it by at most this much.
    pub precision: f64,
}

impl std::default::Default for RelaxParameters {
    fn default() -> Self {
        RelaxParameters {
            dimension: 50,
            workers: 1,
            precision: 0.000001,
        }
    }
}

impl RelaxParameters {
    pub fn validate(&self) -> RelaxResult<()> {
        validate_precision(self.precision)?;
        if self.workers == 0 {
            return Err(RelaxError::InvalidParameter(
                "at least one worker is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Odd dimensions put a cell on the centre line, which keeps results
    /// comparable across sizes.
    pub fn force_odd(mut self) -> Self {
        if self.dimension % 2 == 0 {
            self.dimension += 1;
        }
        self
    }
}

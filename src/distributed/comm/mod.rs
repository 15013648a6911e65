//! Message passing between ranks.
//!
//! The distributed engine only needs blocking point-to-point sends and
//! receives plus a rooted broadcast, so that is all a communicator offers.
//! Sends are allowed to block until the matching receive is posted,
//! which is why the engine orders its halo exchange by rank parity.

mod channel;
#[cfg(feature = "mpi")]
mod mpi_comm;

pub use channel::*;
#[cfg(feature = "mpi")]
pub use mpi_comm::*;

use crate::error::*;

pub type Tag = u32;

/// Last owned row travelling to the next rank.
pub const HALO_DOWN: Tag = 0;
/// First owned row travelling to the previous rank.
pub const HALO_UP: Tag = 1;
pub const BROADCAST: Tag = 2;
pub const BARRIER: Tag = 3;

pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn send(&self, dest: usize, tag: Tag, data: &[f64]) -> RelaxResult<()>;

    /// Fill `data` with a message from `source`.
    /// The message must carry `tag` and exactly `data.len()` values.
    fn receive(
        &self,
        source: usize,
        tag: Tag,
        data: &mut [f64],
    ) -> RelaxResult<()>;

    /// Every rank ends with the root's `data`.
    fn broadcast(&self, root: usize, data: &mut [f64]) -> RelaxResult<()> {
        if self.rank() == root {
            for dest in (0..self.size()).filter(|r| *r != root) {
                self.send(dest, BROADCAST, data)?;
            }
            Ok(())
        } else {
            self.receive(root, BROADCAST, data)
        }
    }

    /// Nobody leaves until everybody has arrived.
    fn barrier(&self) -> RelaxResult<()> {
        if self.rank() == 0 {
            for source in 1..self.size() {
                self.receive(source, BARRIER, &mut [])?;
            }
        } else {
            self.send(0, BARRIER, &[])?;
        }
        self.broadcast(0, &mut [])
    }
}

use super::*;
use mpi::topology::SimpleCommunicator;
use mpi::traits::{
    Communicator as _, CommunicatorCollectives as _, Destination as _,
    Equivalence, Root as _, Source as _,
};

/// Ranks are real MPI processes.
/// MPI aborts the job on transport errors, so these calls only fail
/// when a message has the wrong shape.
pub struct MpiComm {
    world: SimpleCommunicator,
}

impl MpiComm {
    pub fn new(world: SimpleCommunicator) -> Self {
        MpiComm { world }
    }

    pub fn world(&self) -> &SimpleCommunicator {
        &self.world
    }
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.world.rank() as usize
    }

    fn size(&self) -> usize {
        self.world.size() as usize
    }

    fn send(&self, dest: usize, tag: Tag, data: &[f64]) -> RelaxResult<()> {
        self.world
            .process_at_rank(dest as mpi::Rank)
            .send_with_tag(data, tag as mpi::Tag);
        Ok(())
    }

    fn receive(
        &self,
        source: usize,
        tag: Tag,
        data: &mut [f64],
    ) -> RelaxResult<()> {
        let status = self
            .world
            .process_at_rank(source as mpi::Rank)
            .receive_into_with_tag(data, tag as mpi::Tag);
        let count = status.count(f64::equivalent_datatype()) as usize;
        if count != data.len() {
            return Err(RelaxError::PeerCommunication(format!(
                "rank {} expected {} values from rank {}, got {}",
                self.rank(),
                data.len(),
                source,
                count
            )));
        }
        Ok(())
    }

    fn broadcast(&self, root: usize, data: &mut [f64]) -> RelaxResult<()> {
        self.world
            .process_at_rank(root as mpi::Rank)
            .broadcast_into(data);
        Ok(())
    }

    fn barrier(&self) -> RelaxResult<()> {
        self.world.barrier();
        Ok(())
    }
}

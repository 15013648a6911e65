use super::*;
use crossbeam_channel::{bounded, Receiver, Sender};

#[derive(Debug)]
struct Envelope {
    tag: Tag,
    payload: Vec<f64>,
}

/// One rank's end of an in-process universe.
/// Every ordered pair of ranks has its own zero capacity channel, so a send
/// only completes once the peer receives it, like a synchronous MPI send.
pub struct ChannelComm {
    rank: usize,
    size: usize,
    outbox: Vec<Option<Sender<Envelope>>>,
    inbox: Vec<Option<Receiver<Envelope>>>,
}

impl Communicator for ChannelComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&self, dest: usize, tag: Tag, data: &[f64]) -> RelaxResult<()> {
        let link = self.outbox.get(dest).and_then(Option::as_ref).ok_or_else(
            || {
                RelaxError::PeerCommunication(format!(
                    "rank {} has no link to rank {}",
                    self.rank, dest
                ))
            },
        )?;
        link.send(Envelope {
            tag,
            payload: data.to_vec(),
        })
        .map_err(|_| {
            RelaxError::PeerCommunication(format!(
                "rank {} hung up before receiving from rank {}",
                dest, self.rank
            ))
        })
    }

    fn receive(
        &self,
        source: usize,
        tag: Tag,
        data: &mut [f64],
    ) -> RelaxResult<()> {
        let link = self.inbox.get(source).and_then(Option::as_ref).ok_or_else(
            || {
                RelaxError::PeerCommunication(format!(
                    "rank {} has no link from rank {}",
                    self.rank, source
                ))
            },
        )?;
        let envelope = link.recv().map_err(|_| {
            RelaxError::PeerCommunication(format!(
                "rank {} hung up before sending to rank {}",
                source, self.rank
            ))
        })?;
        if envelope.tag != tag {
            return Err(RelaxError::PeerCommunication(format!(
                "rank {} expected tag {} from rank {}, got {}",
                self.rank, tag, source, envelope.tag
            )));
        }
        if envelope.payload.len() != data.len() {
            return Err(RelaxError::PeerCommunication(format!(
                "rank {} expected {} values from rank {}, got {}",
                self.rank,
                data.len(),
                source,
                envelope.payload.len()
            )));
        }
        data.copy_from_slice(&envelope.payload);
        Ok(())
    }
}

/// A fixed group of ranks living in one process, one OS thread each.
pub struct ChannelUniverse {
    comms: Vec<ChannelComm>,
}

impl ChannelUniverse {
    pub fn new(size: usize) -> Self {
        let mut outboxes: Vec<Vec<Option<Sender<Envelope>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();
        let mut inboxes: Vec<Vec<Option<Receiver<Envelope>>>> = (0..size)
            .map(|_| (0..size).map(|_| None).collect())
            .collect();

        for source in 0..size {
            for dest in (0..size).filter(|d| *d != source) {
                let (sender, receiver) = bounded(0);
                outboxes[source][dest] = Some(sender);
                inboxes[dest][source] = Some(receiver);
            }
        }

        let comms = outboxes
            .into_iter()
            .zip(inboxes)
            .enumerate()
            .map(|(rank, (outbox, inbox))| ChannelComm {
                rank,
                size,
                outbox,
                inbox,
            })
            .collect();
        ChannelUniverse { comms }
    }

    pub fn size(&self) -> usize {
        self.comms.len()
    }

    pub fn into_comms(self) -> Vec<ChannelComm> {
        self.comms
    }

    /// Run `f` once per rank, each on its own named thread,
    /// and return the results in rank order.
    /// A rank that panics drops its links, so its peers see a
    /// communication error instead of blocking forever.
    pub fn run<T, F>(self, f: F) -> RelaxResult<Vec<T>>
    where
        T: Send,
        F: Fn(&ChannelComm) -> T + Sync,
    {
        let f = &f;
        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.comms.len());
            for comm in self.comms {
                let rank = comm.rank;
                let handle = std::thread::Builder::new()
                    .name(format!("relax-rank-{}", rank))
                    .spawn_scoped(scope, move || f(&comm))
                    .map_err(|e| {
                        RelaxError::WorkerSpawn(format!("rank {}: {}", rank, e))
                    })?;
                handles.push((rank, handle));
            }

            // Join everybody before reporting, a rank left unjoined would
            // turn its panic into a panic of the whole scope.
            let joined: Vec<RelaxResult<T>> = handles
                .into_iter()
                .map(|(rank, handle)| {
                    handle.join().map_err(|_| {
                        RelaxError::PeerCommunication(format!(
                            "rank {} panicked",
                            rank
                        ))
                    })
                })
                .collect();
            joined.into_iter().collect()
        })
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn send_receive_test() {
        let results = ChannelUniverse::new(2)
            .run(|comm| -> RelaxResult<Vec<f64>> {
                let mut data = vec![0.0; 3];
                if comm.rank() == 0 {
                    comm.send(1, HALO_DOWN, &[1.0, 2.0, 3.0])?;
                    comm.receive(1, HALO_UP, &mut data)?;
                } else {
                    comm.receive(0, HALO_DOWN, &mut data)?;
                    comm.send(0, HALO_UP, &[4.0, 5.0, 6.0])?;
                }
                Ok(data)
            })
            .unwrap();
        assert_eq!(results[0].as_ref().unwrap(), &vec![4.0, 5.0, 6.0]);
        assert_eq!(results[1].as_ref().unwrap(), &vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn broadcast_test() {
        let results = ChannelUniverse::new(4)
            .run(|comm| -> RelaxResult<Vec<f64>> {
                let mut values = vec![comm.rank() as f64; 4];
                for root in 0..comm.size() {
                    comm.broadcast(root, &mut values[root..root + 1])?;
                }
                comm.barrier()?;
                Ok(values)
            })
            .unwrap();
        for r in results {
            assert_eq!(r.unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
        }
    }

    #[test]
    fn tag_mismatch_test() {
        let results = ChannelUniverse::new(2)
            .run(|comm| -> RelaxResult<()> {
                if comm.rank() == 0 {
                    comm.send(1, HALO_UP, &[1.0])
                } else {
                    comm.receive(0, HALO_DOWN, &mut [0.0])
                }
            })
            .unwrap();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(RelaxError::PeerCommunication(_))
        ));
    }

    #[test]
    fn hang_up_test() {
        let mut comms = ChannelUniverse::new(2).into_comms();
        let survivor = comms.remove(0);
        drop(comms);
        assert!(matches!(
            survivor.send(1, HALO_DOWN, &[1.0]),
            Err(RelaxError::PeerCommunication(_))
        ));
        assert!(matches!(
            survivor.receive(1, HALO_UP, &mut [0.0]),
            Err(RelaxError::PeerCommunication(_))
        ));
        assert!(matches!(
            survivor.send(0, HALO_DOWN, &[1.0]),
            Err(RelaxError::PeerCommunication(_))
        ));
    }

    #[test]
    fn panicking_rank_test() {
        let result = ChannelUniverse::new(2).run(|comm| -> RelaxResult<()> {
            if comm.rank() == 1 {
                panic!("rank 1 gives up");
            }
            comm.receive(1, HALO_UP, &mut [0.0])
        });
        assert!(matches!(result, Err(RelaxError::PeerCommunication(_))));
    }
}

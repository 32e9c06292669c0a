//! Feature: mpi transport, one process per worker
//!
//! Run programs built on it with
//!
//! cargo mpirun --np 4 --example <name> --features mpi
#![cfg(feature = "mpi")]
use crate::comm::{check_len, displacements, Collective, Result};
use crate::error::CommError;
use mpi::collective::SystemOperation;
use mpi::datatype::{Partition, PartitionMut};
use mpi::topology::{Color, SimpleCommunicator};
use mpi::traits::*;
use mpi::Count;

pub use mpi::environment::Universe;
pub use mpi::initialize;

/// Communicator of an mpi process group
pub struct MpiComm {
    comm: SimpleCommunicator,
}

impl MpiComm {
    /// World communicator of an initialized universe
    pub fn world(universe: &Universe) -> Self {
        Self {
            comm: universe.world(),
        }
    }

    fn counts_displs(counts: &[usize]) -> (Vec<Count>, Vec<Count>) {
        let displs = displacements(counts);
        (
            counts.iter().map(|&c| c as Count).collect(),
            displs.iter().map(|&d| d as Count).collect(),
        )
    }
}

impl Collective for MpiComm {
    fn rank(&self) -> usize {
        self.comm.rank() as usize
    }

    fn size(&self) -> usize {
        self.comm.size() as usize
    }

    fn send(&self, dest: usize, data: &[f64]) -> Result<()> {
        self.check_rank(dest)?;
        self.comm.process_at_rank(dest as i32).send(data);
        Ok(())
    }

    fn receive_into(&self, source: usize, buf: &mut [f64]) -> Result<()> {
        self.check_rank(source)?;
        let status = self.comm.process_at_rank(source as i32).receive_into(buf);
        check_len(buf.len(), status.count(f64::equivalent_datatype()) as usize)
    }

    fn broadcast_into(&self, root: usize, buf: &mut [f64]) -> Result<()> {
        self.check_rank(root)?;
        self.comm.process_at_rank(root as i32).broadcast_into(buf);
        Ok(())
    }

    fn scatter_varcount_into(
        &self,
        root: usize,
        send: &[f64],
        counts: &[usize],
        recv: &mut [f64],
    ) -> Result<()> {
        self.check_rank(root)?;
        check_len(self.size(), counts.len())?;
        check_len(counts[self.rank()], recv.len())?;
        let root_process = self.comm.process_at_rank(root as i32);
        if self.is_root(root) {
            check_len(counts.iter().sum(), send.len())?;
            let (counts, displs) = Self::counts_displs(counts);
            let partition = Partition::new(send, counts, displs);
            root_process.scatter_varcount_into_root(&partition, recv);
        } else {
            root_process.scatter_varcount_into(recv);
        }
        Ok(())
    }

    fn gather_varcount_into(
        &self,
        root: usize,
        send: &[f64],
        counts: &[usize],
        recv: &mut [f64],
    ) -> Result<()> {
        self.check_rank(root)?;
        check_len(self.size(), counts.len())?;
        check_len(counts[self.rank()], send.len())?;
        let root_process = self.comm.process_at_rank(root as i32);
        if self.is_root(root) {
            check_len(counts.iter().sum(), recv.len())?;
            let (counts, displs) = Self::counts_displs(counts);
            let mut partition = PartitionMut::new(recv, counts, displs);
            root_process.gather_varcount_into_root(send, &mut partition);
        } else {
            root_process.gather_varcount_into(send);
        }
        Ok(())
    }

    fn reduce_sum_into(&self, root: usize, send: &[f64], recv: &mut [f64]) -> Result<()> {
        self.check_rank(root)?;
        let root_process = self.comm.process_at_rank(root as i32);
        if self.is_root(root) {
            check_len(send.len(), recv.len())?;
            root_process.reduce_into_root(send, recv, SystemOperation::sum());
        } else {
            root_process.reduce_into(send, SystemOperation::sum());
        }
        Ok(())
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64> {
        let mut global = 0.;
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::max());
        Ok(global)
    }

    fn all_reduce_or(&self, local: bool) -> Result<bool> {
        let mut global = false;
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::logical_or());
        Ok(global)
    }

    fn split(&self, color: usize, key: usize) -> Result<Self> {
        self.comm
            .split_by_color_with_key(Color::with_value(color as i32), key as i32)
            .map(|comm| Self { comm })
            .ok_or_else(|| CommError::Split(format!("no communicator for color {}", color)))
    }
}

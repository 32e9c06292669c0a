//! In-process transport: one OS thread per worker
//!
//! Workers exchange messages over unbounded `mpsc` channels. A receive
//! blocks until a message from the requested peer *and* communicator
//! arrives; messages for other exchanges are parked in a pending queue,
//! which keeps per-peer FIFO order intact. A worker leaving `run`, by
//! return or by panic, says farewell to every peer; a receive waiting on a
//! departed peer fails with `Disconnected` instead of blocking forever.
//!
//! ```
//! use grid_decomp::{Collective, ThreadUniverse};
//!
//! let ranks = ThreadUniverse::new(4).run(|world| {
//!     let mut x = [world.rank() as f64];
//!     world.broadcast_into(2, &mut x).unwrap();
//!     x[0]
//! });
//! assert_eq!(ranks, vec![2.; 4]);
//! ```
use crate::comm::{check_len, displacements, Collective, Result};
use crate::error::CommError;
use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

struct Envelope {
    source: usize,
    context: u64,
    data: Vec<f64>,
}

enum Letter {
    Data(Envelope),
    /// Sender (world rank) has left and will post nothing more
    Farewell(usize),
}

/// Channel endpoints of one worker, shared by all of its communicators
struct Mailbox {
    world_rank: usize,
    outboxes: Vec<Option<Sender<Letter>>>,
    inbox: Receiver<Letter>,
    pending: RefCell<VecDeque<Envelope>>,
    departed: RefCell<HashSet<usize>>,
}

impl Mailbox {
    fn post(&self, dest: usize, context: u64, data: Vec<f64>) -> Result<()> {
        if dest == self.world_rank {
            self.pending.borrow_mut().push_back(Envelope {
                source: dest,
                context,
                data,
            });
            return Ok(());
        }
        let outbox = self
            .outboxes
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or(CommError::InvalidRank {
                rank: dest,
                size: self.outboxes.len(),
            })?;
        outbox
            .send(Letter::Data(Envelope {
                source: self.world_rank,
                context,
                data,
            }))
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    fn fetch(&self, source: usize, context: u64) -> Result<Vec<f64>> {
        {
            let mut pending = self.pending.borrow_mut();
            let hit = pending
                .iter()
                .position(|e| e.source == source && e.context == context);
            if let Some(envelope) = hit.and_then(|pos| pending.remove(pos)) {
                return Ok(envelope.data);
            }
        }
        // a farewell trails every message of its sender, so nothing from
        // `source` can arrive once it is recorded
        if self.departed.borrow().contains(&source) {
            return Err(CommError::Disconnected { peer: source });
        }
        loop {
            let letter = self
                .inbox
                .recv()
                .map_err(|_| CommError::Disconnected { peer: source })?;
            match letter {
                Letter::Data(envelope) => {
                    if envelope.source == source && envelope.context == context {
                        return Ok(envelope.data);
                    }
                    self.pending.borrow_mut().push_back(envelope);
                }
                Letter::Farewell(peer) => {
                    self.departed.borrow_mut().insert(peer);
                    if peer == source {
                        return Err(CommError::Disconnected { peer });
                    }
                }
            }
        }
    }
}

/// Posts a farewell to every peer when its worker leaves, also on unwind
struct Farewell {
    world_rank: usize,
    peers: Vec<Option<Sender<Letter>>>,
}

impl Drop for Farewell {
    fn drop(&mut self) {
        for peer in self.peers.iter().flatten() {
            // peers that are already gone need no notice
            let _ = peer.send(Letter::Farewell(self.world_rank));
        }
    }
}

/// Communicator of a thread-backed worker group
///
/// Lives on the thread of its worker; sub-groups created by `split` share
/// the worker's mailbox and differ by their context id.
pub struct ThreadComm {
    mailbox: Rc<Mailbox>,
    /// World ranks of the members, indexed by group rank
    members: Vec<usize>,
    rank: usize,
    context: u64,
    splits: Cell<u64>,
}

impl ThreadComm {
    fn world(
        world_rank: usize,
        outboxes: Vec<Option<Sender<Letter>>>,
        inbox: Receiver<Letter>,
    ) -> Self {
        let size = outboxes.len();
        Self {
            mailbox: Rc::new(Mailbox {
                world_rank,
                outboxes,
                inbox,
                pending: RefCell::new(VecDeque::new()),
                departed: RefCell::new(HashSet::new()),
            }),
            members: (0..size).collect(),
            rank: world_rank,
            context: 0,
            splits: Cell::new(0),
        }
    }

    fn post(&self, dest: usize, data: Vec<f64>) -> Result<()> {
        self.check_rank(dest)?;
        self.mailbox.post(self.members[dest], self.context, data)
    }

    fn fetch(&self, source: usize, expected: usize) -> Result<Vec<f64>> {
        self.check_rank(source)?;
        let data = self.mailbox.fetch(self.members[source], self.context)?;
        check_len(expected, data.len())?;
        Ok(data)
    }

    /// Fold one scalar per member at rank 0 in rank order, then broadcast
    fn all_reduce_with<F: Fn(f64, f64) -> f64>(&self, local: f64, op: F) -> Result<f64> {
        let mut value = [local];
        if self.rank == 0 {
            for source in 1..self.size() {
                let other = self.fetch(source, 1)?;
                value[0] = op(value[0], other[0]);
            }
        } else {
            self.post(0, value.to_vec())?;
        }
        self.broadcast_into(0, &mut value)?;
        Ok(value[0])
    }

    /// Every member receives the concatenation of all `local` chunks
    fn all_gather(&self, local: &[f64]) -> Result<Vec<f64>> {
        let counts = vec![local.len(); self.size()];
        let mut all = vec![0.; local.len() * self.size()];
        self.gather_varcount_into(0, local, &counts, &mut all)?;
        self.broadcast_into(0, &mut all)?;
        Ok(all)
    }
}

impl Collective for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.members.len()
    }

    fn send(&self, dest: usize, data: &[f64]) -> Result<()> {
        self.post(dest, data.to_vec())
    }

    fn receive_into(&self, source: usize, buf: &mut [f64]) -> Result<()> {
        let data = self.fetch(source, buf.len())?;
        buf.copy_from_slice(&data);
        Ok(())
    }

    fn broadcast_into(&self, root: usize, buf: &mut [f64]) -> Result<()> {
        self.check_rank(root)?;
        if self.is_root(root) {
            for dest in (0..self.size()).filter(|&d| d != root) {
                self.post(dest, buf.to_vec())?;
            }
            Ok(())
        } else {
            self.receive_into(root, buf)
        }
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
        check_len(counts[self.rank], recv.len())?;
        if !self.is_root(root) {
            return self.receive_into(root, recv);
        }
        check_len(counts.iter().sum(), send.len())?;
        for (dest, (&st, &sz)) in displacements(counts).iter().zip(counts).enumerate() {
            let chunk = &send[st..st + sz];
            if dest == root {
                recv.copy_from_slice(chunk);
            } else {
                self.post(dest, chunk.to_vec())?;
            }
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
        check_len(counts[self.rank], send.len())?;
        if !self.is_root(root) {
            return self.post(root, send.to_vec());
        }
        check_len(counts.iter().sum(), recv.len())?;
        for (source, (&st, &sz)) in displacements(counts).iter().zip(counts).enumerate() {
            let chunk = &mut recv[st..st + sz];
            if source == root {
                chunk.copy_from_slice(send);
            } else {
                chunk.copy_from_slice(&self.fetch(source, sz)?);
            }
        }
        Ok(())
    }

    fn reduce_sum_into(&self, root: usize, send: &[f64], recv: &mut [f64]) -> Result<()> {
        self.check_rank(root)?;
        if !self.is_root(root) {
            return self.post(root, send.to_vec());
        }
        check_len(send.len(), recv.len())?;
        recv.iter_mut().for_each(|v| *v = 0.);
        // Summation in rank order keeps results reproducible
        for source in 0..self.size() {
            let part = if source == root {
                send.to_vec()
            } else {
                self.fetch(source, send.len())?
            };
            for (acc, v) in recv.iter_mut().zip(part) {
                *acc += v;
            }
        }
        Ok(())
    }

    fn all_reduce_max(&self, local: f64) -> Result<f64> {
        self.all_reduce_with(local, |a, b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                a.max(b)
            }
        })
    }

    fn all_reduce_or(&self, local: bool) -> Result<bool> {
        let flag = if local { 1. } else { 0. };
        Ok(self.all_reduce_with(flag, f64::max)? > 0.5)
    }

    fn split(&self, color: usize, key: usize) -> Result<Self> {
        let seq = self.splits.get() + 1;
        self.splits.set(seq);
        let table = self.all_gather(&[color as f64, key as f64])?;

        let mut peers: Vec<(usize, usize)> = table
            .chunks(2)
            .enumerate()
            .filter(|(_, ck)| ck[0] as usize == color)
            .map(|(parent, ck)| (ck[1] as usize, parent))
            .collect();
        peers.sort_unstable();
        let rank = peers
            .iter()
            .position(|&(_, parent)| parent == self.rank)
            .ok_or_else(|| CommError::Split(format!("rank {} lost in split", self.rank)))?;

        Ok(Self {
            mailbox: Rc::clone(&self.mailbox),
            members: peers.iter().map(|&(_, parent)| self.members[parent]).collect(),
            rank,
            context: mix_context(self.context, seq, color),
            splits: Cell::new(0),
        })
    }
}

/// Derive the context id of a sub-group (FNV-1a style mixing)
fn mix_context(parent: u64, seq: u64, color: usize) -> u64 {
    const PRIME: u64 = 0x0100_0000_01b3;
    let mut h = parent ^ 0xcbf2_9ce4_8422_2325;
    for v in [seq, color as u64].iter() {
        h ^= *v;
        h = h.wrapping_mul(PRIME);
    }
    h
}

/// Launcher for a group of thread-backed workers
#[derive(Debug, Clone, Copy)]
pub struct ThreadUniverse {
    size: usize,
}

impl ThreadUniverse {
    /// Universe of `size` workers
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `work` once per worker, each on its own thread, and collect the
    /// results in rank order.
    ///
    /// A panic on any worker is resumed on the caller. Peers waiting on a
    /// worker that left early see `CommError::Disconnected`.
    pub fn run<F, R>(&self, work: F) -> Vec<R>
    where
        F: Fn(ThreadComm) -> R + Sync,
        R: Send,
    {
        let (senders, inboxes): (Vec<_>, Vec<_>) =
            (0..self.size).map(|_| channel::<Letter>()).unzip();
        let work = &work;
        thread::scope(|s| {
            let handles: Vec<_> = inboxes
                .into_iter()
                .enumerate()
                .map(|(rank, inbox)| {
                    let outboxes: Vec<_> = senders
                        .iter()
                        .enumerate()
                        .map(|(dest, tx)| if dest == rank { None } else { Some(tx.clone()) })
                        .collect();
                    let farewell = Farewell {
                        world_rank: rank,
                        peers: outboxes.clone(),
                    };
                    thread::Builder::new()
                        .name(format!("worker-{}", rank))
                        .spawn_scoped(s, move || {
                            let _farewell = farewell;
                            work(ThreadComm::world(rank, outboxes, inbox))
                        })
                })
                .collect();
            drop(senders);
            handles
                .into_iter()
                .map(|h| match h {
                    Ok(handle) => handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
                    Err(e) => panic!("failed to spawn worker thread: {}", e),
                })
                .collect()
        })
    }
}

//! Blocking collectives shared by every transport
//!
//! All operations are collective: every member of the communicator must
//! call the matching operation with consistent arguments (same root, same
//! `counts`), otherwise the group deadlocks. Buffers are plain `f64`
//! slices whose lengths are known to every member beforehand.
use crate::error::CommError;

/// Result of a collective operation
pub type Result<T> = std::result::Result<T, CommError>;

/// Group of workers which exchange data through blocking collectives
pub trait Collective: Sized {
    /// Rank of the calling worker inside this group
    fn rank(&self) -> usize;

    /// Number of workers in this group
    fn size(&self) -> usize;

    /// Point-to-point send to `dest`; must be matched by `receive_into`
    fn send(&self, dest: usize, data: &[f64]) -> Result<()>;

    /// Point-to-point receive from `source`
    fn receive_into(&self, source: usize, buf: &mut [f64]) -> Result<()>;

    /// Copy `buf` of `root` into `buf` of every other member
    fn broadcast_into(&self, root: usize, buf: &mut [f64]) -> Result<()>;

    /// Split `send` (significant only on `root`) into consecutive chunks of
    /// `counts[k]` values and deliver chunk `k` to rank `k`
    fn scatter_varcount_into(
        &self,
        root: usize,
        send: &[f64],
        counts: &[usize],
        recv: &mut [f64],
    ) -> Result<()>;

    /// Inverse of `scatter_varcount_into`; `recv` is significant only on `root`
    fn gather_varcount_into(
        &self,
        root: usize,
        send: &[f64],
        counts: &[usize],
        recv: &mut [f64],
    ) -> Result<()>;

    /// Elementwise sum of `send` over all members, delivered to `root`
    fn reduce_sum_into(&self, root: usize, send: &[f64], recv: &mut [f64]) -> Result<()>;

    /// Maximum of a scalar over all members, delivered to everyone
    fn all_reduce_max(&self, local: f64) -> Result<f64>;

    /// Logical or of a flag over all members, delivered to everyone
    fn all_reduce_or(&self, local: bool) -> Result<bool>;

    /// Partition the group into sub-groups of equal `color`.
    ///
    /// Ranks inside a sub-group are ordered by `key`, ties by parent rank.
    fn split(&self, color: usize, key: usize) -> Result<Self>;

    /// Is the calling worker `root`?
    fn is_root(&self, root: usize) -> bool {
        self.rank() == root
    }

    /// Fail with `InvalidRank` if `rank` is not a member
    fn check_rank(&self, rank: usize) -> Result<()> {
        if rank < self.size() {
            Ok(())
        } else {
            Err(CommError::InvalidRank {
                rank,
                size: self.size(),
            })
        }
    }
}

/// Fail with `LengthMismatch` unless `found == expected`
pub fn check_len(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(CommError::LengthMismatch { expected, found })
    }
}

/// Displacements of consecutive chunks with sizes `counts`
pub fn displacements(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .scan(0, |acc, &c| {
            let st = *acc;
            *acc += c;
            Some(st)
        })
        .collect()
}

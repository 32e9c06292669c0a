//! Collection of simplified collective routines
use crate::comm::{Collective, Result};
use num_traits::{FromPrimitive, ToPrimitive};

/// Broadcast scalar value from root to all workers
///
/// Integer sizes travel as `f64`, which is exact below 2^53.
pub fn broadcast_scalar<C, T>(comm: &C, root: usize, data: &mut T) -> Result<()>
where
    C: Collective,
    T: ToPrimitive + FromPrimitive + Copy,
{
    let mut buf = [data.to_f64().unwrap_or(f64::NAN)];
    comm.broadcast_into(root, &mut buf)?;
    if let Some(v) = T::from_f64(buf[0]) {
        *data = v;
    }
    Ok(())
}

/// Sum a scalar over all workers, result on root only
pub fn gather_sum<C: Collective>(comm: &C, root: usize, data: f64) -> Result<Option<f64>> {
    let mut sum = [0.];
    comm.reduce_sum_into(root, &[data], &mut sum)?;
    Ok(if comm.is_root(root) { Some(sum[0]) } else { None })
}

/// Sum a scalar over all workers, result on every worker
pub fn all_gather_sum<C: Collective>(comm: &C, data: f64) -> Result<f64> {
    let mut sum = [0.];
    comm.reduce_sum_into(0, &[data], &mut sum)?;
    comm.broadcast_into(0, &mut sum)?;
    Ok(sum[0])
}

/// Agree on a verdict only `root` can compute
///
/// `root` evaluates `check`; every worker returns the same flag.
pub fn root_verdict<C, F>(comm: &C, root: usize, check: F) -> Result<bool>
where
    C: Collective,
    F: FnOnce() -> bool,
{
    let local = if comm.is_root(root) { check() } else { false };
    comm.all_reduce_or(local)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::threads::ThreadUniverse;

    #[test]
    fn test_broadcast_scalar() {
        let out = ThreadUniverse::new(4).run(|world| {
            let mut n: usize = if world.rank() == 0 { 1000 } else { 0 };
            broadcast_scalar(&world, 0, &mut n).unwrap();
            let mut x = if world.rank() == 3 { 1000.4 } else { 0. };
            broadcast_scalar(&world, 3, &mut x).unwrap();
            (n, x)
        });
        assert!(out.iter().all(|&v| v == (1000, 1000.4)));
    }

    #[test]
    fn test_gather_sum() {
        let out = ThreadUniverse::new(3).run(|world| {
            let x = world.rank() as f64;
            (gather_sum(&world, 0, x).unwrap(), all_gather_sum(&world, x).unwrap())
        });
        assert_eq!(out[0], (Some(3.), 3.));
        assert_eq!(out[1], (None, 3.));
        assert_eq!(out[2], (None, 3.));
    }

    #[test]
    fn test_root_verdict() {
        let out = ThreadUniverse::new(4).run(|world| root_verdict(&world, 0, || true).unwrap());
        assert_eq!(out, vec![true; 4]);
        let out = ThreadUniverse::new(4).run(|world| root_verdict(&world, 1, || false).unwrap());
        assert_eq!(out, vec![false; 4]);
    }
}

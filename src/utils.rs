//! Collection of useful helper functions and test input generators
use ndarray::prelude::*;
use ndarray::Data;
use num_traits::Float;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Maximum absolute entry; NaN if any entry is NaN
pub fn inf_norm<A, S>(v: &ArrayBase<S, Ix1>) -> A
where
    A: Float,
    S: Data<Elem = A>,
{
    v.iter().fold(A::zero(), |m, &x| {
        if m.is_nan() || x.is_nan() {
            A::nan()
        } else {
            m.max(x.abs())
        }
    })
}

/// Test approx equality of two arrays element-wise
///
/// # Panics
/// Panics when difference is larger than 1e-9.
pub fn approx_eq<S, D>(result: &ArrayBase<S, D>, expected: &ArrayBase<S, D>)
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    approx_eq_tol(result, expected, 1e-9);
}

/// Test approx equality of two arrays element-wise with tolerance `dif`
///
/// # Panics
/// Panics when difference is larger than `dif`.
pub fn approx_eq_tol<S, D>(result: &ArrayBase<S, D>, expected: &ArrayBase<S, D>, dif: f64)
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    assert_eq!(result.shape(), expected.shape(), "Shapes differ.");
    for (a, b) in expected.iter().zip(result.iter()) {
        if (a - b).abs() > dif {
            panic!("Large difference of values, got {} expected {}.", b, a)
        }
    }
}

/// Random row-major n x n matrix with strictly dominant diagonal
///
/// Off-diagonal entries are uniform in [-1, 1). With `s` the off-diagonal
/// magnitude sum of a row, its diagonal entry has magnitude
/// `(2 - difficulty) * s + 1` and a random sign. `difficulty` is clamped to
/// [0, 1]; 1 gives the slowest converging systems.
pub fn diag_dom_rand<R: Rng>(n: usize, difficulty: f64, rng: &mut R) -> Vec<f64> {
    let difficulty = difficulty.max(0.).min(1.);
    let mut a = vec![0.; n * n];
    for i in 0..n {
        let row = &mut a[i * n..(i + 1) * n];
        let mut s = 0.;
        for (j, v) in row.iter_mut().enumerate() {
            if j != i {
                *v = rng.gen_range(-1.0..1.0);
                s += v.abs();
            }
        }
        let sign = if rng.gen_bool(0.5) { 1. } else { -1. };
        row[i] = sign * ((2. - difficulty) * s + 1.);
    }
    a
}

/// Vector of standard normal samples (Box-Muller)
pub fn randn<R: Rng>(n: usize, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u1: f64 = 1. - rng.gen::<f64>();
            let u2: f64 = rng.gen();
            (-2. * u1.ln()).sqrt() * (2. * std::f64::consts::PI * u2).cos()
        })
        .collect()
}

/// Random diagonally dominant system `(a, b)` of size `n`; a fixed `seed`
/// reproduces the same system
pub fn random_system(n: usize, difficulty: f64, seed: Option<u64>) -> (Vec<f64>, Vec<f64>) {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let a = diag_dom_rand(n, difficulty, &mut rng);
    let b = randn(n, &mut rng);
    (a, b)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_inf_norm() {
        assert_eq!(inf_norm(&array![1., -3., 2.]), 3.);
        assert_eq!(inf_norm(&Array1::<f64>::zeros(0)), 0.);
        assert!(inf_norm(&array![1., f64::NAN, 2.]).is_nan());
        assert!(inf_norm(&array![f64::NAN, 1.]).is_nan());
        assert_eq!(inf_norm(&array![1., f64::NEG_INFINITY]), f64::INFINITY);
    }

    #[test]
    fn test_diag_dom_rand_is_dominant() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let n = 30;
        for &difficulty in [0., 0.5, 1., 3.].iter() {
            let a = diag_dom_rand(n, difficulty, &mut rng);
            for i in 0..n {
                let off: f64 = (0..n).filter(|&j| j != i).map(|j| a[i * n + j].abs()).sum();
                assert!(a[i * n + i].abs() > off);
            }
        }
    }

    #[test]
    fn test_generators_are_seeded() {
        let a = randn(16, &mut ChaCha8Rng::seed_from_u64(1));
        let b = randn(16, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.is_finite()));
        assert_eq!(random_system(8, 0.5, Some(3)), random_system(8, 0.5, Some(3)));
    }
}

use jacobi_grid::distribute::{gather_matrix, scatter_matrix, COORDINATOR};
use jacobi_grid::utils::{approx_eq_tol, random_system};
use jacobi_grid::{
    solve, solve_distributed, solve_sequential, Collective, JacobiConfig, JacobiError,
    ProcessGrid, SolveReport, Solver, Termination, ThreadUniverse,
};
use ndarray::Array1;

/// Run `solve` on `p` thread workers; returns every worker's outcome and
/// the coordinator's solution
fn solve_threads(
    p: usize,
    n: usize,
    a: &[f64],
    b: &[f64],
    config: &JacobiConfig,
) -> (Vec<Result<SolveReport, JacobiError>>, Vec<f64>) {
    let mut out = ThreadUniverse::new(p).run(|world| {
        let root = world.rank() == COORDINATOR;
        let (a, b) = if root { (a, b) } else { (&[][..], &[][..]) };
        let mut x = vec![0.; if root { n } else { 0 }];
        let result = solve(n, a, b, &mut x, world, config);
        (result, x)
    });
    let x = std::mem::take(&mut out[0].1);
    (out.into_iter().map(|(r, _)| r).collect(), x)
}

#[test]
fn test_small_grid_scenario() {
    let n = 4;
    let mut a = vec![0.; n * n];
    for i in 0..n {
        for j in 0..n {
            a[i * n + j] = if i == j { 2. } else { 1e-13 * (1 + i + j) as f64 };
        }
    }
    let b = [2., 4., 6., 8.];
    let config = JacobiConfig::default().with_tolerance(1e-12);
    let (reports, x) = solve_threads(4, n, &a, &b, &config);
    for r in &reports {
        assert!(r.as_ref().unwrap().converged());
    }
    approx_eq_tol(&Array1::from(x), &Array1::from(vec![1., 2., 3., 4.]), 1e-9);
}

#[test]
fn test_grid_sizes_agree() {
    let n = 100;
    let (a, b) = random_system(n, 0.5, Some(100));
    let config = JacobiConfig::default();
    let (single, x1) = solve_threads(1, n, &a, &b, &config);
    let (grid, x25) = solve_threads(25, n, &a, &b, &config);
    assert!(single[0].as_ref().unwrap().converged());
    assert!(grid.iter().all(|r| r.as_ref().unwrap().converged()));
    approx_eq_tol(&Array1::from(x1), &Array1::from(x25), 1e-6);
}

#[test]
fn test_distributed_matches_sequential() {
    let n = 37;
    let (a, b) = random_system(n, 0.8, Some(9));
    let config = JacobiConfig::default();
    let mut expected = vec![0.; n];
    solve_sequential(n, &a, &b, &mut expected, &config).unwrap();
    for &p in [4, 9, 16].iter() {
        let (_, x) = solve_threads(p, n, &a, &b, &config);
        approx_eq_tol(&Array1::from(x), &Array1::from(expected.clone()), 1e-7);
    }
}

#[test]
fn test_repeated_solves_are_identical() {
    let n = 30;
    let (a, b) = random_system(n, 0.5, Some(2));
    let config = JacobiConfig::default();
    let (r1, x1) = solve_threads(9, n, &a, &b, &config);
    let (r2, x2) = solve_threads(9, n, &a, &b, &config);
    assert_eq!(x1, x2);
    assert_eq!(r1, r2);
}

#[test]
fn test_scalar_system_single_iteration() {
    let (reports, x) = solve_threads(1, 1, &[5.], &[10.], &JacobiConfig::default());
    let report = reports[0].as_ref().unwrap();
    assert_eq!(report.iterations, 1);
    // a single worker never builds a grid
    assert_eq!(report.solver, Solver::Sequential);
    assert_eq!(x, vec![2.]);

    // one worker on an explicit 1 x 1 grid takes the distributed path
    let out = ThreadUniverse::new(1).run(|world| {
        let grid = ProcessGrid::build(world).unwrap();
        let mut x = [0.];
        let report =
            solve_distributed(1, &[5.], &[10.], &mut x, &grid, &JacobiConfig::default()).unwrap();
        (report.iterations, report.solver, x[0])
    });
    assert_eq!(out, vec![(1, Solver::Grid { q: 1 }, 2.)]);

    // more workers always go through the grid
    let (reports, _) = solve_threads(4, 1, &[5.], &[10.], &JacobiConfig::default());
    for r in reports {
        assert_eq!(r.unwrap().solver, Solver::Grid { q: 2 });
    }
}

#[test]
fn test_non_square_worker_counts() {
    let (a, b) = random_system(6, 0.5, Some(1));
    for &p in [2, 3, 5, 8].iter() {
        let (reports, _) = solve_threads(p, 6, &a, &b, &JacobiConfig::default());
        assert_eq!(reports.len(), p);
        for r in reports {
            assert_eq!(r, Err(JacobiError::Config { workers: p }));
        }
    }
}

#[test]
fn test_divergence_reported_by_all_workers() {
    let n = 6;
    let mut a = vec![50.; n * n];
    for i in 0..n {
        a[i * n + i] = 1.;
    }
    let b = vec![1.; n];
    let (reports, _) = solve_threads(9, n, &a, &b, &JacobiConfig::default());
    for r in reports {
        match r {
            Err(JacobiError::Diverged { iteration, .. }) => assert!(iteration < 50),
            other => panic!("expected divergence, got {:?}", other),
        }
    }
}

#[test]
fn test_wrong_matrix_size_reported_by_all_workers() {
    let (reports, _) = solve_threads(4, 3, &[1.; 8], &[1.; 3], &JacobiConfig::default());
    for r in reports {
        assert!(matches!(
            r,
            Err(JacobiError::Dimension { what: "matrix", expected: 9, found: 8 })
        ));
    }
}

#[test]
fn test_iteration_cap_is_not_an_error() {
    let n = 12;
    let (a, b) = random_system(n, 1., Some(4));
    let config = JacobiConfig::default().with_max_iterations(3);
    let (reports, x) = solve_threads(4, n, &a, &b, &config);
    for r in reports {
        let r = r.unwrap();
        assert_eq!(r.termination, Termination::MaxIterations);
        assert_eq!(r.iterations, 3);
    }
    assert!(x.iter().all(|v| v.is_finite()));
}

#[test]
fn test_matrix_round_trip_any_grid() {
    for &n in [1, 5, 13].iter() {
        let a: Vec<f64> = (0..n * n).map(|i| i as f64 * 0.5).collect();
        for &p in [1, 4, 9, 16].iter() {
            let out = ThreadUniverse::new(p).run(|world| {
                let grid = ProcessGrid::build(world).unwrap();
                let root = grid.rank() == COORDINATOR;
                let input = if root { &a[..] } else { &[][..] };
                let block = scatter_matrix(&grid, n, input, COORDINATOR).unwrap();
                gather_matrix(&grid, n, &block, COORDINATOR).unwrap()
            });
            assert_eq!(out[0].as_ref(), Some(&a));
            assert!(out[1..].iter().all(|o| o.is_none()));
        }
    }
}

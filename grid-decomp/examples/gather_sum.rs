//! Run with
//!
//! cargo run --example gather_sum
use grid_decomp::functions::{all_gather_sum, gather_sum};
use grid_decomp::{Collective, ThreadUniverse};

fn main() {
    let size = 4;
    let expected: f64 = (0..size).map(|i| i as f64).sum();
    ThreadUniverse::new(size).run(|world| {
        let x = world.rank() as f64;

        // gather
        let y = gather_sum(&world, 0, x).unwrap();
        if world.rank() == 0 {
            assert_eq!(y, Some(expected));
        }

        // all gather
        let y = all_gather_sum(&world, x).unwrap();
        assert_eq!(y, expected);
    });
}

//! Run with
//!
//! cargo run --example broadcast_root
use grid_decomp::functions::broadcast_scalar;
use grid_decomp::{Collective, ThreadUniverse};

fn main() {
    let values = ThreadUniverse::new(2).run(|world| {
        let mut x = if world.rank() == 0 { 1000.4 } else { 0. };
        broadcast_scalar(&world, 0, &mut x).unwrap();
        x
    });
    assert_eq!(values, vec![1000.4, 1000.4]);
}

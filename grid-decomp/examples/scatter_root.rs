//! Run with
//!
//! cargo run --example scatter_root
//!
//! Splits a vector of length 7 over the rows of a 2x2 grid, then gathers
//! it back on the first grid column.
use grid_decomp::{block_sizes, Collective, ProcessGrid, ThreadUniverse};

fn main() {
    let n = 7;
    let global: Vec<f64> = (0..n).map(|i| i as f64).collect();
    ThreadUniverse::new(4).run(|world| {
        let grid = ProcessGrid::build(world).unwrap();
        if !grid.is_first_col() {
            return;
        }
        let counts = block_sizes(n, grid.q);
        let block = grid.row_block(n);

        let send = if grid.rank() == 0 { global.clone() } else { vec![] };
        let mut local = vec![0.; block.sz];
        grid.col_group()
            .scatter_varcount_into(0, &send, &counts, &mut local)
            .unwrap();
        assert_eq!(local, global[block.st..block.en].to_vec());

        let mut rcv = vec![0.; if grid.rank() == 0 { n } else { 0 }];
        grid.col_group()
            .gather_varcount_into(0, &local, &counts, &mut rcv)
            .unwrap();
        if grid.rank() == 0 {
            assert_eq!(rcv, global);
        }
    });
}

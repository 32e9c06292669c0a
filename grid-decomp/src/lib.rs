//! # grid-decomp
//!
//! Square process grids whose workers cooperate through blocking
//! collectives, plus the block decomposition rule used to split matrices
//! and vectors among them.
//!
//! Two transports implement [`Collective`]:
//! - [`ThreadComm`]: every worker is an OS thread of the current process
//! - `MpiComm` (feature `mpi`): every worker is an mpi process
//!
//! ```
//! use grid_decomp::{ProcessGrid, ThreadUniverse};
//!
//! let coords = ThreadUniverse::new(4).run(|world| {
//!     let grid = ProcessGrid::build(world).unwrap();
//!     (grid.row, grid.col)
//! });
//! assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
//! ```
pub mod blocks;
pub mod comm;
pub mod error;
pub mod functions;
pub mod grid;
pub mod mpi_comm;
pub mod threads;

pub use blocks::{block_size, block_sizes, block_start, Block};
pub use comm::Collective;
pub use error::{CommError, GridError};
pub use grid::{grid_coords, grid_side, ProcessGrid};
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;
pub use threads::{ThreadComm, ThreadUniverse};

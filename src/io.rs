//! Raw binary vectors: consecutive native-endian f64, no header
use std::fs;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// Read a file of packed f64 values
pub fn read_binary_file<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    let bytes = fs::read(path.as_ref())?;
    if bytes.len() % F64_BYTES != 0 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "{}: {} bytes is not a multiple of {}",
                path.as_ref().display(),
                bytes.len(),
                F64_BYTES
            ),
        ));
    }
    Ok(bytemuck::pod_collect_to_vec(&bytes))
}

/// Write `data` as packed f64 values, replacing the file
pub fn write_binary_file<P: AsRef<Path>>(path: P, data: &[f64]) -> Result<()> {
    fs::write(path, bytemuck::cast_slice::<f64, u8>(data))
}

/// Read matrix and right hand side; `n` is taken from the length of `b`.
///
/// Fails with `InvalidData` unless the matrix holds n * n entries.
pub fn read_system<P: AsRef<Path>, Q: AsRef<Path>>(
    matrix: P,
    rhs: Q,
) -> Result<(usize, Vec<f64>, Vec<f64>)> {
    let a = read_binary_file(matrix)?;
    let b = read_binary_file(rhs)?;
    let n = b.len();
    if a.len() != n * n {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "the input dimensions are not matching: matrix has {} entries, vector {}",
                a.len(),
                n
            ),
        ));
    }
    Ok((n, a, b))
}

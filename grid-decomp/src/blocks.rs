//! Block decomposition of an index range
//!
//! An axis of length `n` is split into `q` blocks; block `k` has
//! `n / q` entries plus one more if `k < n % q`, so the remainder lands
//! on the lowest indices and block sizes differ by at most one.

/// Contiguous range of global indices `[st, en)` with `sz = en - st`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Block {
    /// First global index
    pub st: usize,
    /// One past the last global index
    pub en: usize,
    /// Number of entries
    pub sz: usize,
}

impl Block {
    /// Block `k` of an axis of length `n` split into `q` parts
    pub fn new(n: usize, q: usize, k: usize) -> Self {
        let st = block_start(n, q, k);
        let sz = block_size(n, q, k);
        Self { st, en: st + sz, sz }
    }

    /// Block without entries, positioned at `st`
    pub fn empty(st: usize) -> Self {
        Self { st, en: st, sz: 0 }
    }

    /// Global indices shared with `other`
    pub fn intersect(&self, other: &Block) -> Block {
        let st = self.st.max(other.st);
        let en = self.en.min(other.en).max(st);
        Block { st, en, sz: en - st }
    }
}

/// Number of entries of block `k`
pub fn block_size(n: usize, q: usize, k: usize) -> usize {
    n / q + usize::from(k < n % q)
}

/// First global index of block `k`
pub fn block_start(n: usize, q: usize, k: usize) -> usize {
    k * (n / q) + k.min(n % q)
}

/// Sizes of all `q` blocks of an axis of length `n`
pub fn block_sizes(n: usize, q: usize) -> Vec<usize> {
    (0..q).map(|k| block_size(n, q, k)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_block_sizes_remainder_first() {
        assert_eq!(block_sizes(7, 3), vec![3, 2, 2]);
        assert_eq!(block_sizes(8, 3), vec![3, 3, 2]);
        assert_eq!(block_sizes(2, 3), vec![1, 1, 0]);
        assert_eq!(block_sizes(9, 3), vec![3, 3, 3]);
    }

    #[test]
    fn test_blocks_tile_axis() {
        for n in 0..40 {
            for q in 1..7 {
                let mut en = 0;
                for k in 0..q {
                    let b = Block::new(n, q, k);
                    assert_eq!(b.st, en);
                    assert_eq!(b.en - b.st, b.sz);
                    assert!(b.sz == n / q || b.sz == n / q + 1);
                    en = b.en;
                }
                assert_eq!(en, n);
            }
        }
    }

    #[test]
    fn test_intersect() {
        let a = Block::new(10, 2, 0);
        let b = Block::new(10, 3, 1);
        assert_eq!(a.intersect(&b), Block { st: 4, en: 5, sz: 1 });
        let c = Block::new(10, 3, 2);
        assert_eq!(a.intersect(&c).sz, 0);
    }
}

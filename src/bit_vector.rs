use bitvec::vec::BitVec;

/// The number of bits summarised by one entry of `block_counts`.
///
/// Must stay below 256 so that each count fits in a `u8`.
pub const BLOCK_SIZE: usize = 32;

/// A bit-vector of bounded size which caches the number of ones in each
/// `BLOCK_SIZE` block of bits, speeding up rank operations.
///
/// ```
/// use dk2_tree::bit_vector::BitVector;
/// let mut bv = BitVector::new(100);
/// bv.set(3, true);
/// bv.set(70, true);
/// assert_eq!(1, bv.rank1(70));
/// assert_eq!(2, bv.rank1(71));
/// bv.insert(0, 4);
/// assert!(bv.get(74));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
  data: BitVec,
  block_counts: Vec<u8>,
}

impl BitVector {
  /// Creates an all-zero BitVector containing `size` bits.
  pub fn new(size: usize) -> Self {
    BitVector {
      data: bitvec::bitvec![0; size],
      block_counts: vec![0; blocks_for(size)],
    }
  }
  /// Creates a BitVector holding a copy of the bits `[lo, hi)` of `from`.
  pub fn from_range(from: &BitVector, lo: usize, hi: usize) -> Self {
    let data: BitVec = from.data[lo..hi].iter().copied().collect();
    let mut bv = BitVector {
      block_counts: vec![0; blocks_for(data.len())],
      data,
    };
    bv.recompute(0);
    bv
  }
  /// Number of bits held.
  pub fn len(&self) -> usize {
    self.data.len()
  }
  /// Returns true if the BitVector holds no bits at all.
  pub fn is_empty(&self) -> bool {
    self.data.len() == 0
  }
  /// Returns the value of the n-th bit.
  ///
  /// Panics if `n >= self.len()`.
  pub fn get(&self, n: usize) -> bool {
    self.data[n]
  }
  /// Changes the n-th bit to `state`, returning true if its value changed.
  pub fn set(&mut self, n: usize, state: bool) -> bool {
    let changed = self.data[n] != state;
    if changed {
      self.data.set(n, state);
      let block = n / BLOCK_SIZE;
      if state { self.block_counts[block] += 1; }
      else     { self.block_counts[block] -= 1; }
    }
    changed
  }
  /// The number of ones in the bits `[0, n)`.
  pub fn rank1(&self, n: usize) -> usize {
    let full_blocks = n / BLOCK_SIZE;
    let counted: usize = self.block_counts[..full_blocks].iter()
      .map(|&c| c as usize)
      .sum();
    counted + ones_between(&self.data, full_blocks * BLOCK_SIZE, n)
  }
  /// The number of ones in the bits `[lo, hi)`, equal to `rank1(hi) - rank1(lo)`.
  ///
  /// Only the blocks lying entirely between `lo` and `hi` are read from the
  /// cache, the ragged ends are scanned.
  pub fn range_rank1(&self, lo: usize, hi: usize) -> usize {
    if hi <= lo { return 0 }
    let first_full = (lo + BLOCK_SIZE - 1) / BLOCK_SIZE;
    let last_full = hi / BLOCK_SIZE;
    if first_full >= last_full {
      return ones_between(&self.data, lo, hi)
    }
    let middle: usize = self.block_counts[first_full..last_full].iter()
      .map(|&c| c as usize)
      .sum();
    ones_between(&self.data, lo, first_full * BLOCK_SIZE)
    + middle
    + ones_between(&self.data, last_full * BLOCK_SIZE, hi)
  }
  /// Number of ones in the whole BitVector.
  pub fn count_ones(&self) -> usize {
    self.block_counts.iter().map(|&c| c as usize).sum()
  }
  /// Inserts `count` zero-bits at position `pos`.
  pub fn insert(&mut self, pos: usize, count: usize) {
    for _ in 0..count { self.data.insert(pos, false); }
    if pos % BLOCK_SIZE == 0 && count % BLOCK_SIZE == 0 {
      /* Whole blocks of zeroes: shift the counts along */
      let at = pos / BLOCK_SIZE;
      for _ in 0..count / BLOCK_SIZE { self.block_counts.insert(at, 0); }
    }
    else {
      self.block_counts.resize(blocks_for(self.data.len()), 0);
      self.recompute(pos);
    }
  }
  /// Inserts the bits `[lo, hi)` of `from` at position `pos`.
  pub fn insert_from(&mut self, pos: usize, from: &BitVector, lo: usize, hi: usize) {
    for (i, bit) in from.data[lo..hi].iter().enumerate() {
      self.data.insert(pos + i, *bit);
    }
    self.block_counts.resize(blocks_for(self.data.len()), 0);
    self.recompute(pos);
  }
  /// Appends the bits `[lo, hi)` of `from` to the end.
  pub fn append(&mut self, from: &BitVector, lo: usize, hi: usize) {
    let start = self.data.len();
    self.data.extend(from.data[lo..hi].iter().copied());
    self.block_counts.resize(blocks_for(self.data.len()), 0);
    self.recompute(start);
  }
  /// Removes the bits `[lo, hi)`.
  pub fn erase(&mut self, lo: usize, hi: usize) {
    for _ in lo..hi { self.data.remove(lo); }
    let count = hi - lo;
    if lo % BLOCK_SIZE == 0 && count % BLOCK_SIZE == 0 {
      let at = lo / BLOCK_SIZE;
      for _ in 0..count / BLOCK_SIZE { self.block_counts.remove(at); }
    }
    else {
      self.block_counts.resize(blocks_for(self.data.len()), 0);
      self.recompute(lo);
    }
  }
  /// Approximate heap and inline footprint in bytes.
  pub fn memory_usage(&self) -> usize {
    std::mem::size_of::<Self>()
    + (self.data.len() + 7) / 8
    + self.block_counts.len()
  }
  /// Recounts every block from the one containing `start` onwards.
  fn recompute(&mut self, start: usize) {
    let len = self.data.len();
    for block in start / BLOCK_SIZE..self.block_counts.len() {
      let lo = block * BLOCK_SIZE;
      let hi = std::cmp::min(lo + BLOCK_SIZE, len);
      self.block_counts[block] = ones_between(&self.data, lo, hi) as u8;
    }
  }
}

fn blocks_for(bits: usize) -> usize {
  (bits + BLOCK_SIZE - 1) / BLOCK_SIZE
}
fn ones_between(bits: &BitVec, lo: usize, hi: usize) -> usize {
  if hi <= lo { return 0 }
  bits[lo..hi].iter().fold(0, |total, bit| total + *bit as usize)
}

#[cfg(test)]
impl BitVector {
  fn to_bools(&self) -> Vec<bool> {
    self.data.iter().copied().collect()
  }
  fn counts_consistent(&self) -> bool {
    self.block_counts.len() == blocks_for(self.data.len())
    && self.block_counts.iter().enumerate().all(|(block, &c)| {
      let lo = block * BLOCK_SIZE;
      let hi = std::cmp::min(lo + BLOCK_SIZE, self.data.len());
      c as usize == ones_between(&self.data, lo, hi)
    })
  }
}

use {
  std::ops::{AddAssign, SubAssign},
  crate::bit_vector::BitVector,
};

/// The per-subtree totals an internal node keeps for each of its children.
///
/// A TTree needs both the number of bits and the number of ones below each
/// child to answer rank queries; an LTree only ever needs the number of bits.
pub trait Counts:
  Copy + Default + PartialEq + std::fmt::Debug + std::fmt::Display + AddAssign + SubAssign
{
  /// Totals for the bits `[lo, hi)` of a BitVector.
  fn of(bv: &BitVector, lo: usize, hi: usize) -> Self;
  /// Totals for `bits` zero-bits.
  fn zeroes(bits: usize) -> Self;
  /// The change caused by a single bit flipping from 0 to 1.
  fn single_one() -> Self;
  /// The number of bits counted.
  fn bits(&self) -> usize;
}

/// Bit-count only, used by the LTree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitCount {
  /// Number of bits.
  pub bits: usize,
}

/// Bit-count and one-count, used by the TTree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RankCount {
  /// Number of bits.
  pub bits: usize,
  /// Number of those bits which are set.
  pub ones: usize,
}

impl Counts for BitCount {
  fn of(_bv: &BitVector, lo: usize, hi: usize) -> Self {
    BitCount { bits: hi - lo }
  }
  fn zeroes(bits: usize) -> Self {
    BitCount { bits }
  }
  fn single_one() -> Self {
    BitCount { bits: 0 }
  }
  fn bits(&self) -> usize {
    self.bits
  }
}
impl std::fmt::Display for BitCount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({})", self.bits)
  }
}
impl AddAssign for BitCount {
  fn add_assign(&mut self, other: Self) {
    self.bits += other.bits;
  }
}
impl SubAssign for BitCount {
  fn sub_assign(&mut self, other: Self) {
    self.bits -= other.bits;
  }
}

impl Counts for RankCount {
  fn of(bv: &BitVector, lo: usize, hi: usize) -> Self {
    RankCount {
      bits: hi - lo,
      ones: bv.range_rank1(lo, hi),
    }
  }
  fn zeroes(bits: usize) -> Self {
    RankCount { bits, ones: 0 }
  }
  fn single_one() -> Self {
    RankCount { bits: 0, ones: 1 }
  }
  fn bits(&self) -> usize {
    self.bits
  }
}
impl std::fmt::Display for RankCount {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "({}, {})", self.bits, self.ones)
  }
}
impl AddAssign for RankCount {
  fn add_assign(&mut self, other: Self) {
    self.bits += other.bits;
    self.ones += other.ones;
  }
}
impl SubAssign for RankCount {
  fn sub_assign(&mut self, other: Self) {
    self.bits -= other.bits;
    self.ones -= other.ones;
  }
}

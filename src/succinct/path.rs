use {
  crate::error::TreeError as Error,
  super::{Counts, LeafPosition, RankCount, SuccinctTree, node::NodeId},
};

type Result<T> = std::result::Result<T, Error>;

/// A cached root-to-leaf descent through one `SuccinctTree`.
///
/// Queries made through a `Path` resume from the lowest cached node whose
/// range still covers the requested bit, so runs of nearby queries avoid
/// re-descending from the root. Results are always identical to the uncached
/// operations. A path which has seen a structural change of its tree (or a
/// bit changed without it) is discarded on its next use.
#[derive(Debug, Clone)]
pub struct Path<C> {
  frames: Vec<Frame<C>>,
  epoch: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Frame<C> {
  /// Internal node that was descended through.
  node: NodeId,
  /// Which of its children was taken.
  index: usize,
  /// Totals of that child.
  size: C,
  /// Totals of every bit before that child.
  before: C,
}

impl<C> Frame<C> where C: Counts {
  fn covers(&self, n: usize) -> bool {
    self.before.bits() <= n && n < self.before.bits() + self.size.bits()
  }
}

impl<C> Path<C> {
  /// An empty path, its first query descends from the root.
  pub fn new() -> Self {
    Path {
      frames: Vec::new(),
      epoch: None,
    }
  }
  /// Number of internal nodes currently cached.
  pub fn depth(&self) -> usize {
    self.frames.len()
  }
}

impl<C> Default for Path<C> {
  fn default() -> Self {
    Path::new()
  }
}

impl<C: Counts> SuccinctTree<C> {
  /// `find_leaf` starting from the cached path instead of the root.
  /// `n` must be below `bits()`.
  pub fn find_leaf_with(&self, n: usize, path: &mut Path<C>) -> Result<LeafPosition<C>> {
    self.check_bit(n)?;
    if path.epoch != Some(self.epoch) {
      path.frames.clear();
      path.epoch = Some(self.epoch);
    }
    while let Some(frame) = path.frames.last() {
      if frame.covers(n) { break }
      path.frames.pop();
    }
    let (mut id, mut before) = match path.frames.last() {
      Some(frame) => (self.entries(frame.node)[frame.index].child, frame.before),
      None => (self.root, C::default()),
    };
    while !self.is_leaf(id) {
      let (index, child_before) = self.find_child(id, n - before.bits())?;
      before += child_before;
      let entry = self.entries(id)[index];
      path.frames.push(Frame { node: id, index, size: entry.counts, before });
      id = entry.child;
    }
    Ok(LeafPosition { leaf: id, before })
  }
  /// `access` through a cached path.
  pub fn access_with(&self, n: usize, path: &mut Path<C>) -> Result<bool> {
    let pos = self.find_leaf_with(n, path)?;
    Ok(self.leaf_bits(pos.leaf).get(n - pos.before.bits()))
  }
  /// `set_bit` through a cached path. The path is patched rather than
  /// discarded; any other path over this tree goes stale.
  pub fn set_bit_with(&mut self, n: usize, state: bool, path: &mut Path<C>) -> Result<bool> {
    let pos = self.find_leaf_with(n, path)?;
    let changed = self.flip_in_leaf(pos, n, state);
    if changed {
      /* Every frame is an ancestor of bit n, nothing before it moved */
      for frame in path.frames.iter_mut() {
        if state { frame.size += C::single_one(); }
        else     { frame.size -= C::single_one(); }
      }
      self.epoch += 1;
      path.epoch = Some(self.epoch);
    }
    Ok(changed)
  }
}

impl SuccinctTree<RankCount> {
  /// `rank1` through a cached path.
  pub fn rank1_with(&self, n: usize, path: &mut Path<RankCount>) -> Result<usize> {
    if n == self.bits() { return Ok(self.ones()) }
    let pos = self.find_leaf_with(n, path)?;
    Ok(pos.before.ones + self.leaf_bits(pos.leaf).rank1(n - pos.before.bits))
  }
}

#[cfg(test)]
mod api {
  use {
    rand::Rng,
    crate::config::Config,
    super::*,
    super::super::TTree,
  };
  type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
  fn filled(blocks: usize) -> Result<TTree> {
    let mut tree = TTree::new(Config { k: 2, leaf_bits_max: 16, node_size_max: 3 });
    for i in 0..blocks { tree.insert_block(i * 4)?; }
    for n in (0..blocks * 4).step_by(3) { tree.set_bit(n, true)?; }
    Ok(tree)
  }
  #[test]
  fn same_answers() -> Result<()> {
    let tree = filled(200)?;
    let mut path = Path::new();
    let mut rng = rand::thread_rng();
    for _ in 0..2000 {
      let n = rng.gen_range(0, tree.bits());
      assert_eq!(tree.access(n)?, tree.access_with(n, &mut path)?);
      assert_eq!(tree.rank1(n)?, tree.rank1_with(n, &mut path)?);
      assert!(path.depth() < tree.height());
    }
    assert_eq!(tree.ones(), tree.rank1_with(tree.bits(), &mut path)?);
    Ok(())
  }
  #[test]
  fn sequential_scan() -> Result<()> {
    let tree = filled(64)?;
    let mut path = Path::new();
    for n in 0..tree.bits() {
      assert_eq!(n % 3 == 0, tree.access_with(n, &mut path)?);
      assert_eq!((n + 2) / 3, tree.rank1_with(n, &mut path)?);
    }
    Ok(())
  }
  #[test]
  fn set_bit_patches_path() -> Result<()> {
    let mut tree = filled(100)?;
    let mut path = Path::new();
    let mut other = Path::new();
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
      let n = rng.gen_range(0, tree.bits());
      let state: bool = rng.gen();
      let expected = tree.access(n)? != state;
      assert_eq!(expected, tree.set_bit_with(n, state, &mut path)?);
      let m = rng.gen_range(0, tree.bits());
      assert_eq!(tree.rank1(m)?, tree.rank1_with(m, &mut path)?);
      assert_eq!(tree.rank1(m)?, tree.rank1_with(m, &mut other)?);
    }
    tree.check_invariants()?;
    Ok(())
  }
  #[test]
  fn patched_frames_match_tree() -> Result<()> {
    let mut tree = filled(100)?;
    let mut path = Path::new();
    for &(n, state) in [(5, true), (230, false), (231, true), (399, true), (5, false)].iter() {
      tree.set_bit_with(n, state, &mut path)?;
      assert!(path.depth() > 0);
      for frame in path.frames.iter() {
        assert!(frame.covers(n));
        assert_eq!(tree.entries(frame.node)[frame.index].counts, frame.size);
      }
    }
    Ok(())
  }
  #[test]
  fn stale_after_structural_edit() -> Result<()> {
    let mut tree = filled(50)?;
    let mut path = Path::new();
    assert!(tree.access_with(99, &mut path)?);
    tree.insert_block(0)?;
    assert!(!tree.access_with(99, &mut path)?);
    assert!(tree.access_with(103, &mut path)?);
    tree.delete_block(0)?;
    tree.set_bit(98, true)?;
    assert_eq!(tree.rank1(100)?, tree.rank1_with(100, &mut path)?);
    assert_eq!(Err(Error::IndexOutOfRange { index: 200, len: 200 }), tree.access_with(200, &mut path));
    Ok(())
  }
}

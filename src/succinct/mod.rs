/*!
B+trees whose leaves are BitVectors.

A `SuccinctTree` behaves as one long bit-vector which supports inserting and
removing whole blocks of k² zero-bits anywhere along its length. Each internal
node keeps, per child, the totals of that child's subtree (`Counts`), so any
bit can be found by a single root-to-leaf descent.

Two flavours are used by the `DKTree`:
- `TTree` counts ones as well as bits and so supports `rank1`.
- `LTree` only counts bits.

Nodes live in an arena and refer to each other by `NodeId`; parents are
optional back-references, never owners.
*/

mod counts;
mod node;
mod path;
mod rebalance;

pub use counts::{BitCount, Counts, RankCount};
pub use node::NodeId;
pub use path::Path;

use {
  crate::{bit_vector::BitVector, config::Config, error::TreeError as Error},
  node::{Node, NodeKind},
};

type Result<T> = std::result::Result<T, Error>;

/// The tree holding every quadtree level above the cells, with rank support.
pub type TTree = SuccinctTree<RankCount>;
/// The tree holding the cell level of the quadtree.
pub type LTree = SuccinctTree<BitCount>;

/// A B+tree over BitVectors. See the module documentation.
#[derive(Debug, Clone)]
pub struct SuccinctTree<C> {
  config: Config,
  nodes: Vec<Node<C>>,
  vacant: Vec<NodeId>,
  root: NodeId,
  /// Bumped by every change a cached `Path` cannot follow.
  epoch: u64,
}

/// The leaf holding a bit, and the totals of everything before that leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafPosition<C> {
  /// The leaf.
  pub leaf: NodeId,
  /// Totals of all the bits preceding the leaf.
  pub before: C,
}

/* Public */
impl<C: Counts> SuccinctTree<C> {
  /// Creates a tree holding no bits: a single empty leaf.
  ///
  /// The config is not validated here, `DKTree::with_config` does that.
  pub fn new(config: Config) -> Self {
    SuccinctTree {
      config,
      nodes: vec![Node::leaf(BitVector::new(0))],
      vacant: Vec::new(),
      root: NodeId(0),
      epoch: 0,
    }
  }
  /// Creates a tree holding one block of zero-bits.
  pub fn single_block(config: Config) -> Self {
    let mut tree = SuccinctTree::new(config);
    tree.nodes[0] = Node::leaf(BitVector::new(config.block()));
    tree
  }
  /// The parameters this tree was built with.
  pub fn config(&self) -> Config {
    self.config
  }
  /// The current root. Every mutating operation also returns it.
  pub fn root(&self) -> NodeId {
    self.root
  }
  /// Total number of bits held.
  pub fn bits(&self) -> usize {
    match &self.node(self.root).kind {
      NodeKind::Leaf(bv) => bv.len(),
      NodeKind::Internal(entries) => entries.iter().map(|e| e.counts.bits()).sum(),
    }
  }
  /// Returns true if the tree holds no bits.
  pub fn is_empty(&self) -> bool {
    self.bits() == 0
  }
  /// Number of levels, a lone leaf has height 1.
  pub fn height(&self) -> usize {
    let mut height = 1;
    let mut id = self.root;
    while !self.is_leaf(id) {
      id = self.entries(id)[0].child;
      height += 1;
    }
    height
  }
  /// Finds which child of the internal node `id` holds its `n`-th bit,
  /// returning the child's index and the totals of the children before it.
  ///
  /// `n` equal to the node's total resolves to the last child, so that a
  /// block can be inserted at the very end.
  pub fn find_child(&self, id: NodeId, n: usize) -> Result<(usize, C)> {
    let entries = self.entries(id);
    let mut before = C::default();
    for (i, entry) in entries.iter().enumerate() {
      if n < before.bits() + entry.counts.bits() {
        return Ok((i, before))
      }
      before += entry.counts;
    }
    match entries.last() {
      Some(last) if n == before.bits() => {
        before -= last.counts;
        Ok((entries.len() - 1, before))
      },
      _ => Err(Error::IndexOutOfRange {
        index: n,
        len: before.bits(),
      }),
    }
  }
  /// Descends from the root to the leaf holding the `n`-th bit.
  ///
  /// `n` may equal `bits()`, which resolves to the last leaf.
  pub fn find_leaf(&self, n: usize) -> Result<LeafPosition<C>> {
    let len = self.bits();
    if n > len {
      return Err(Error::IndexOutOfRange { index: n, len })
    }
    let mut id = self.root;
    let mut before = C::default();
    while !self.is_leaf(id) {
      let (index, child_before) = self.find_child(id, n - before.bits())?;
      before += child_before;
      id = self.entries(id)[index].child;
    }
    Ok(LeafPosition { leaf: id, before })
  }
  /// Returns the value of the `n`-th bit.
  pub fn access(&self, n: usize) -> Result<bool> {
    self.check_bit(n)?;
    let pos = self.find_leaf(n)?;
    Ok(self.leaf_bits(pos.leaf).get(n - pos.before.bits()))
  }
  /// Changes the `n`-th bit to `state`, returning true if its value changed.
  pub fn set_bit(&mut self, n: usize, state: bool) -> Result<bool> {
    self.check_bit(n)?;
    let pos = self.find_leaf(n)?;
    let changed = self.flip_in_leaf(pos, n, state);
    if changed { self.epoch += 1; }
    Ok(changed)
  }
  /// Inserts a block of k² zero-bits so that it starts at bit `pos`.
  pub fn insert_block(&mut self, pos: usize) -> Result<NodeId> {
    let block = self.config.block();
    if pos % block != 0 {
      return Err(Error::MisalignedBlock { index: pos, block })
    }
    let found = self.find_leaf(pos)?;
    let local = pos - found.before.bits();
    self.leaf_bits_mut(found.leaf).insert(local, block);
    self.update_counters(found.leaf, C::zeroes(block), true);
    self.epoch += 1;
    self.check_size_upper(found.leaf);
    self.compact();
    Ok(self.root)
  }
  /// Removes the block of k² bits starting at bit `pos`, whatever it holds.
  pub fn delete_block(&mut self, pos: usize) -> Result<NodeId> {
    let block = self.config.block();
    if pos % block != 0 {
      return Err(Error::MisalignedBlock { index: pos, block })
    }
    let len = self.bits();
    if pos + block > len {
      return Err(Error::IndexOutOfRange { index: pos, len })
    }
    let found = self.find_leaf(pos)?;
    let local = pos - found.before.bits();
    let bv = self.leaf_bits_mut(found.leaf);
    let removed = C::of(bv, local, local + block);
    bv.erase(local, local + block);
    self.update_counters(found.leaf, removed, false);
    self.epoch += 1;
    self.check_size_lower(found.leaf);
    self.compact();
    Ok(self.root)
  }
  /// Number of ones in the block of k² bits starting at bit `pos`.
  pub fn ones_in_block(&self, pos: usize) -> Result<usize> {
    let block = self.config.block();
    if pos % block != 0 {
      return Err(Error::MisalignedBlock { index: pos, block })
    }
    let len = self.bits();
    if pos + block > len {
      return Err(Error::IndexOutOfRange { index: pos, len })
    }
    let found = self.find_leaf(pos)?;
    let local = pos - found.before.bits();
    Ok(self.leaf_bits(found.leaf).range_rank1(local, local + block))
  }
  /// Approximate footprint in bytes of the nodes reachable from the root.
  pub fn memory_usage(&self) -> usize {
    let mut total = std::mem::size_of::<Self>()
      + self.vacant.capacity() * std::mem::size_of::<NodeId>();
    let mut stack = vec![self.root];
    while let Some(id) = stack.pop() {
      total += std::mem::size_of::<Node<C>>();
      match &self.node(id).kind {
        NodeKind::Leaf(bv) => total += bv.memory_usage(),
        NodeKind::Internal(entries) => {
          total += entries.capacity() * std::mem::size_of::<node::Entry<C>>();
          stack.extend(entries.iter().map(|entry| entry.child));
        },
      }
    }
    total
  }
  /// Number of node slots in the arena, live or vacant.
  pub fn arena_len(&self) -> usize {
    self.nodes.len()
  }
  /// Verifies the count accounting, the parent back-references and the
  /// B+tree size bounds of every node, describing the first violation found.
  pub fn check_invariants(&self) -> std::result::Result<(), String> {
    if self.node(self.root).parent.is_some() {
      return Err(format!("root {:?} has a parent", self.root))
    }
    self.check_node(self.root, true).map(|_| ())
  }
}

/* Rank support */
impl SuccinctTree<RankCount> {
  /// Number of ones in the bits `[0, n)`.
  pub fn rank1(&self, n: usize) -> Result<usize> {
    let pos = self.find_leaf(n)?;
    let bv = self.leaf_bits(pos.leaf);
    Ok(pos.before.ones + bv.rank1(n - pos.before.bits))
  }
  /// Number of ones in the whole tree.
  pub fn ones(&self) -> usize {
    self.counts_of(self.root).ones
  }
}

impl<C: Counts> Default for SuccinctTree<C> {
  fn default() -> Self {
    SuccinctTree::new(Config::default())
  }
}

/* Private */
impl<C: Counts> SuccinctTree<C> {
  fn check_bit(&self, n: usize) -> Result<()> {
    let len = self.bits();
    if n >= len { Err(Error::IndexOutOfRange { index: n, len }) }
    else { Ok(()) }
  }
  /// Sets the `n`-th bit inside an already located leaf and propagates the
  /// change in ones to the ancestors.
  fn flip_in_leaf(&mut self, pos: LeafPosition<C>, n: usize, state: bool) -> bool {
    let changed = self.leaf_bits_mut(pos.leaf).set(n - pos.before.bits(), state);
    if changed {
      self.update_counters(pos.leaf, C::single_one(), state);
    }
    changed
  }
  /// Adds `delta` to (or takes it from) the entries of every ancestor of `id`.
  fn update_counters(&mut self, id: NodeId, delta: C, increase: bool) {
    let mut id = id;
    while let Some(parent) = self.node(id).parent {
      let index = self.node(id).index_in_parent;
      let counts = &mut self.entries_mut(parent)[index].counts;
      if increase { *counts += delta; }
      else        { *counts -= delta; }
      id = parent;
    }
  }
  fn check_node(&self, id: NodeId, is_root: bool) -> std::result::Result<C, String> {
    let config = &self.config;
    match &self.node(id).kind {
      NodeKind::Leaf(bv) => {
        if bv.len() % config.block() != 0 {
          return Err(format!("leaf {:?} holds {} bits, not whole blocks", id, bv.len()))
        }
        let size = bv.len() / config.block();
        if size > config.leaf_size_max() || (!is_root && size < config.leaf_size_min()) {
          return Err(format!("leaf {:?} holds {} blocks", id, size))
        }
        Ok(C::of(bv, 0, bv.len()))
      },
      NodeKind::Internal(entries) => {
        let size = entries.len();
        let too_small = if is_root { size < 2 } else { size < config.node_size_min() };
        if too_small || size > config.node_size_max {
          return Err(format!("internal node {:?} has {} children", id, size))
        }
        let mut total = C::default();
        for (i, entry) in entries.iter().enumerate() {
          let child = self.node(entry.child);
          if child.parent != Some(id) || child.index_in_parent != i {
            return Err(format!("child {} of {:?} points back to {:?}[{}]", i, id, child.parent, child.index_in_parent))
          }
          let counts = self.check_node(entry.child, false)?;
          if counts != entry.counts {
            return Err(format!("entry {} of {:?} records {:?}, subtree holds {:?}", i, id, entry.counts, counts))
          }
          total += counts;
        }
        Ok(total)
      },
    }
  }
}

/* Traits */
/// One line per leaf with its bits in k²-blocks, and one `| -- (totals)`
/// line per child of an internal node, followed by that child's subtree
/// indented by one more `| `.
impl<C: Counts> std::fmt::Display for SuccinctTree<C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    self.fmt_node(f, self.root, 0)
  }
}
impl<C: Counts> SuccinctTree<C> {
  fn fmt_node(&self, f: &mut std::fmt::Formatter<'_>, id: NodeId, depth: usize) -> std::fmt::Result {
    let prefix = "| ".repeat(depth);
    match &self.node(id).kind {
      NodeKind::Leaf(bv) => {
        let block = self.config.block();
        let mut s = String::with_capacity(bv.len() + bv.len() / block);
        for n in 0..bv.len() {
          if n > 0 && n % block == 0 { s.push(','); }
          s.push(if bv.get(n) { '1' } else { '0' });
        }
        writeln!(f, "{}{}", prefix, s)
      },
      NodeKind::Internal(entries) => {
        for entry in entries {
          writeln!(f, "{}| -- {}", prefix, entry.counts)?;
          self.fmt_node(f, entry.child, depth + 1)?;
        }
        Ok(())
      },
    }
  }
}

#[cfg(test)]
impl<C: Counts> SuccinctTree<C> {
  fn live_nodes(&self) -> usize {
    self.nodes.len() - self.vacant.len()
  }
  fn to_bools(&self) -> Vec<bool> {
    (0..self.bits()).map(|n| self.access(n).unwrap()).collect()
  }
}

#[cfg(test)]
mod api {
  use super::*;
  type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
  fn small() -> Config {
    Config { k: 2, leaf_bits_max: 16, node_size_max: 3 }
  }
  #[test]
  fn new() {
    let tree = TTree::new(small());
    assert_eq!(0, tree.bits());
    assert!(tree.is_empty());
    assert_eq!(1, tree.height());
    assert_eq!(0, tree.ones());
    assert_eq!(0, tree.rank1(0).unwrap());
    assert!(tree.check_invariants().is_ok());
  }
  #[test]
  fn out_of_range() -> Result<()> {
    let mut tree = LTree::new(small());
    assert_eq!(Err(Error::IndexOutOfRange { index: 0, len: 0 }), tree.access(0));
    tree.insert_block(0)?;
    assert_eq!(Err(Error::IndexOutOfRange { index: 4, len: 4 }), tree.set_bit(4, true));
    assert_eq!(Err(Error::MisalignedBlock { index: 2, block: 4 }), tree.insert_block(2));
    assert_eq!(Err(Error::IndexOutOfRange { index: 8, len: 4 }), tree.insert_block(8));
    assert_eq!(Err(Error::IndexOutOfRange { index: 4, len: 4 }), tree.delete_block(4));
    assert_eq!(Err(Error::MisalignedBlock { index: 1, block: 4 }), tree.delete_block(1));
    Ok(())
  }
  #[test]
  fn insert_and_set() -> Result<()> {
    let mut tree = TTree::new(small());
    tree.insert_block(0)?;
    tree.insert_block(4)?;
    assert!(tree.set_bit(5, true)?);
    assert!(!tree.set_bit(5, true)?);
    tree.insert_block(4)?;
    assert!(tree.access(9)?);
    assert_eq!(1, tree.ones());
    assert_eq!(0, tree.rank1(9)?);
    assert_eq!(1, tree.rank1(10)?);
    assert_eq!(1, tree.ones_in_block(8)?);
    assert_eq!(0, tree.ones_in_block(4)?);
    Ok(())
  }
  #[test]
  fn grows_and_shrinks() -> Result<()> {
    /* 640 blocks of 4 bits */
    let mut tree = TTree::new(Config::default());
    for i in 0..640 {
      let root = tree.insert_block(i * 4)?;
      assert_eq!(tree.root(), root);
    }
    assert_eq!(2560, tree.bits());
    assert!(tree.height() > 1);
    for n in (0..2560).step_by(7) {
      tree.set_bit(n, true)?;
    }
    for n in 0..=2560 {
      assert_eq!((n + 6) / 7, tree.rank1(n)?);
    }
    assert!(tree.check_invariants().is_ok());
    for _ in 0..640 {
      tree.delete_block(0)?;
      assert!(tree.check_invariants().is_ok());
    }
    assert!(tree.is_empty());
    assert_eq!(1, tree.height());
    Ok(())
  }
  #[test]
  fn random_against_model() -> Result<()> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut tree = TTree::new(small());
    let mut model: Vec<bool> = Vec::new();
    for step in 0..1500 {
      let blocks = model.len() / 4;
      /* Bias towards growth early on, towards shrinking later */
      let grow = if step < 750 { 5 } else { 3 };
      match rng.gen_range(0, 10) {
        r if r < grow => {
          let pos = rng.gen_range(0, blocks + 1) * 4;
          tree.insert_block(pos)?;
          for _ in 0..4 { model.insert(pos, false); }
        },
        r if r < 7 && blocks > 0 => {
          let pos = rng.gen_range(0, blocks) * 4;
          tree.delete_block(pos)?;
          for _ in 0..4 { model.remove(pos); }
        },
        _ if !model.is_empty() => {
          let n = rng.gen_range(0, model.len());
          let state: bool = rng.gen();
          assert_eq!(model[n] != state, tree.set_bit(n, state)?);
          model[n] = state;
        },
        _ => {},
      }
      tree.check_invariants()?;
      assert_eq!(model, tree.to_bools());
      let n = rng.gen_range(0, model.len() + 1);
      assert_eq!(model[..n].iter().filter(|&&b| b).count(), tree.rank1(n)?);
    }
    Ok(())
  }
  #[test]
  fn display() -> Result<()> {
    let mut tree = TTree::new(small());
    assert_eq!("\n", tree.to_string());
    for i in 0..4 { tree.insert_block(i * 4)?; }
    tree.set_bit(0, true)?;
    assert_eq!("1000,0000,0000,0000\n", tree.to_string());
    /* A fifth block splits the root leaf two and three */
    tree.insert_block(16)?;
    tree.set_bit(9, true)?;
    tree.set_bit(10, true)?;
    assert_eq!(
      "| -- (8, 1)\n| 1000,0000\n| -- (12, 2)\n| 0110,0000,0000\n",
      tree.to_string()
    );
    let mut cells = LTree::new(small());
    cells.insert_block(0)?;
    cells.insert_block(4)?;
    cells.set_bit(7, true)?;
    assert_eq!("0000,0001\n", cells.to_string());
    Ok(())
  }
  #[test]
  fn ltree_counts_bits_only() -> Result<()> {
    let mut tree = LTree::new(small());
    for i in 0..20 { tree.insert_block(i * 4)?; }
    tree.set_bit(33, true)?;
    tree.check_invariants()?;
    assert!(tree.access(33)?);
    assert_eq!(1, tree.ones_in_block(32)?);
    tree.delete_block(32)?;
    assert_eq!(76, tree.bits());
    assert_eq!(vec![false; 76], tree.to_bools());
    Ok(())
  }
}

use {
  tracing::debug,
  crate::bit_vector::BitVector,
  super::{
    Counts, SuccinctTree,
    node::{Entry, Node, NodeId},
  },
};

/* Keeping every non-root node within its size bounds */
impl<C: Counts> SuccinctTree<C> {
  fn max_size(&self, id: NodeId) -> usize {
    if self.is_leaf(id) { self.config.leaf_size_max() }
    else { self.config.node_size_max }
  }
  fn min_size(&self, id: NodeId) -> usize {
    if self.is_leaf(id) { self.config.leaf_size_min() }
    else { self.config.node_size_min() }
  }
  /// Called after `id` grew by one unit: spills a unit to a sibling with
  /// room to spare, or splits `id` in two.
  pub(crate) fn check_size_upper(&mut self, id: NodeId) {
    let max = self.max_size(id);
    if self.size(id) <= max { return }
    let parent = match self.node(id).parent {
      Some(parent) => parent,
      None => return self.split(id),
    };
    let index = self.node(id).index_in_parent;
    let siblings = self.entries(parent).len();
    if index > 0 {
      let left = self.entries(parent)[index - 1].child;
      if self.size(left) < max {
        return self.shift_left(parent, index - 1)
      }
    }
    if index + 1 < siblings {
      let right = self.entries(parent)[index + 1].child;
      if self.size(right) < max {
        return self.shift_right(parent, index)
      }
    }
    self.split(id)
  }
  /// Called after `id` shrank by one unit: steals a unit from a sibling
  /// which can spare one, or merges `id` with a sibling.
  pub(crate) fn check_size_lower(&mut self, id: NodeId) {
    let parent = match self.node(id).parent {
      Some(parent) => parent,
      None => {
        if !self.is_leaf(id) && self.size(id) == 1 {
          self.collapse_root(id);
        }
        return
      },
    };
    let min = self.min_size(id);
    if self.size(id) >= min { return }
    let index = self.node(id).index_in_parent;
    let siblings = self.entries(parent).len();
    if index > 0 {
      let left = self.entries(parent)[index - 1].child;
      if self.size(left) > min {
        return self.shift_right(parent, index - 1)
      }
    }
    if index + 1 < siblings {
      let right = self.entries(parent)[index + 1].child;
      if self.size(right) > min {
        return self.shift_left(parent, index)
      }
    }
    self.merge(parent, index)
  }
  /// Moves the first unit of child `left + 1` of `parent` to the end of
  /// child `left`.
  fn shift_left(&mut self, parent: NodeId, left: usize) {
    let from = self.entries(parent)[left + 1].child;
    let to = self.entries(parent)[left].child;
    let moved = if self.is_leaf(from) {
      let block = self.config.block();
      let first = BitVector::from_range(self.leaf_bits(from), 0, block);
      self.leaf_bits_mut(from).erase(0, block);
      self.leaf_bits_mut(to).append(&first, 0, block);
      C::of(&first, 0, block)
    }
    else {
      let entry = self.entries_mut(from).remove(0);
      self.entries_mut(to).push(entry);
      let last = self.entries(to).len() - 1;
      self.reindex(from, 0);
      self.reindex(to, last);
      entry.counts
    };
    let entries = self.entries_mut(parent);
    entries[left].counts += moved;
    entries[left + 1].counts -= moved;
  }
  /// Moves the last unit of child `left` of `parent` to the start of child
  /// `left + 1`.
  fn shift_right(&mut self, parent: NodeId, left: usize) {
    let from = self.entries(parent)[left].child;
    let to = self.entries(parent)[left + 1].child;
    let moved = if self.is_leaf(from) {
      let block = self.config.block();
      let len = self.leaf_bits(from).len();
      let last = BitVector::from_range(self.leaf_bits(from), len - block, len);
      self.leaf_bits_mut(from).erase(len - block, len);
      self.leaf_bits_mut(to).insert_from(0, &last, 0, block);
      C::of(&last, 0, block)
    }
    else {
      let entry = match self.entries_mut(from).pop() {
        Some(entry) => entry,
        None => unreachable!("shifting out of an empty node {:?}", from),
      };
      self.entries_mut(to).insert(0, entry);
      self.reindex(to, 0);
      entry.counts
    };
    let entries = self.entries_mut(parent);
    entries[left].counts -= moved;
    entries[left + 1].counts += moved;
  }
  /// Moves the upper half of `id` into a new right sibling.
  fn split(&mut self, id: NodeId) {
    let (sibling, moved) = if self.is_leaf(id) {
      let block = self.config.block();
      let bv = self.leaf_bits_mut(id);
      let len = bv.len();
      let mid = (len / block / 2) * block;
      let upper = BitVector::from_range(bv, mid, len);
      bv.erase(mid, len);
      let moved = C::of(&upper, 0, upper.len());
      (self.alloc(Node::leaf(upper)), moved)
    }
    else {
      let half = self.size(id) / 2;
      let upper = self.entries_mut(id).split_off(half);
      let mut moved = C::default();
      for entry in upper.iter() { moved += entry.counts; }
      let sibling = self.alloc(Node::internal(upper));
      self.reindex(sibling, 0);
      (sibling, moved)
    };
    match self.node(id).parent {
      None => {
        let lower = self.counts_of(id);
        let root = self.alloc(Node::internal(vec![
          Entry { counts: lower, child: id },
          Entry { counts: moved, child: sibling },
        ]));
        self.reindex(root, 0);
        self.root = root;
        debug!(height = self.height(), bits = self.bits(), "succinct tree grew a level");
      },
      Some(parent) => {
        let index = self.node(id).index_in_parent;
        let entries = self.entries_mut(parent);
        entries[index].counts -= moved;
        entries.insert(index + 1, Entry { counts: moved, child: sibling });
        self.reindex(parent, index + 1);
        self.check_size_upper(parent);
      },
    }
  }
  /// Merges child `index` of `parent` with an adjacent sibling, the left one
  /// when there is one.
  fn merge(&mut self, parent: NodeId, index: usize) {
    let left = if index > 0 { index - 1 } else { index };
    let into = self.entries(parent)[left].child;
    let from = self.entries(parent)[left + 1].child;
    if self.is_leaf(into) {
      let bits = std::mem::replace(self.leaf_bits_mut(from), BitVector::new(0));
      self.leaf_bits_mut(into).append(&bits, 0, bits.len());
    }
    else {
      let absorbed = std::mem::take(self.entries_mut(from));
      let start = self.entries(into).len();
      self.entries_mut(into).extend(absorbed);
      self.reindex(into, start);
    }
    let entries = self.entries_mut(parent);
    let moved = entries[left + 1].counts;
    entries[left].counts += moved;
    entries.remove(left + 1);
    self.reindex(parent, left + 1);
    self.release(from);
    self.check_size_lower(parent);
  }
  /// Replaces an internal root holding a single child by that child.
  fn collapse_root(&mut self, root: NodeId) {
    let child = self.entries(root)[0].child;
    let node = self.node_mut(child);
    node.parent = None;
    node.index_in_parent = 0;
    self.root = child;
    self.release(root);
    debug!(height = self.height(), bits = self.bits(), "succinct tree lost a level");
    self.check_size_lower(child);
  }
}

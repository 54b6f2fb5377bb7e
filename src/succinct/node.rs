use {
  crate::bit_vector::BitVector,
  super::{Counts, SuccinctTree},
};

/// A handle to a node in a succinct tree's arena.
///
/// Handles stay valid until the next block insertion or deletion: merged
/// nodes free their slot, and a sparse arena is renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// `<counts, child>`: the totals of a child's subtree and the child itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Entry<C> {
  pub counts: C,
  pub child: NodeId,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind<C> {
  Leaf(BitVector),
  /// Holds up to node_size_max + 1 entries, so that an overfull node can be
  /// split after the insertion which overfilled it.
  Internal(Vec<Entry<C>>),
}

#[derive(Debug, Clone)]
pub(crate) struct Node<C> {
  pub parent: Option<NodeId>,
  pub index_in_parent: usize,
  pub kind: NodeKind<C>,
}

impl<C> Node<C> {
  pub fn leaf(bv: BitVector) -> Self {
    Node {
      parent: None,
      index_in_parent: 0,
      kind: NodeKind::Leaf(bv),
    }
  }
  pub fn internal(entries: Vec<Entry<C>>) -> Self {
    Node {
      parent: None,
      index_in_parent: 0,
      kind: NodeKind::Internal(entries),
    }
  }
}

/* Arena */
impl<C: Counts> SuccinctTree<C> {
  pub(crate) fn alloc(&mut self, node: Node<C>) -> NodeId {
    match self.vacant.pop() {
      Some(id) => {
        self.nodes[id.0] = node;
        id
      },
      None => {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
      },
    }
  }
  /// Drops the contents of a node which is no longer reachable and makes its
  /// slot available again.
  pub(crate) fn release(&mut self, id: NodeId) {
    if id.0 + 1 < self.nodes.len() {
      self.nodes[id.0] = Node::leaf(BitVector::new(0));
      self.vacant.push(id);
      return
    }
    self.nodes.pop();
    /* Vacant slots now at the end go too */
    while let Some(at) = self.vacant.iter().position(|v| v.0 + 1 == self.nodes.len()) {
      self.vacant.swap_remove(at);
      self.nodes.pop();
    }
  }
  /// Renumbers the live nodes into a dense arena once vacant slots
  /// outnumber half of them. Invalidates every `NodeId` and `Path`.
  pub(crate) fn compact(&mut self) {
    let live = self.nodes.len() - self.vacant.len();
    if self.vacant.len() <= live / 2 { return }
    let mut dead = vec![false; self.nodes.len()];
    for id in self.vacant.drain(..) { dead[id.0] = true; }
    let mut remap = vec![0; self.nodes.len()];
    let mut nodes = Vec::with_capacity(live);
    for (old, node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
      if dead[old] { continue }
      remap[old] = nodes.len();
      nodes.push(node);
    }
    for node in nodes.iter_mut() {
      node.parent = node.parent.map(|parent| NodeId(remap[parent.0]));
      if let NodeKind::Internal(entries) = &mut node.kind {
        for entry in entries.iter_mut() { entry.child = NodeId(remap[entry.child.0]); }
      }
    }
    self.nodes = nodes;
    self.vacant.shrink_to_fit();
    self.root = NodeId(remap[self.root.0]);
    self.epoch += 1;
  }
  pub(crate) fn node(&self, id: NodeId) -> &Node<C> {
    &self.nodes[id.0]
  }
  pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C> {
    &mut self.nodes[id.0]
  }
  pub(crate) fn is_leaf(&self, id: NodeId) -> bool {
    match self.node(id).kind {
      NodeKind::Leaf(_) => true,
      NodeKind::Internal(_) => false,
    }
  }
  pub(crate) fn entries(&self, id: NodeId) -> &Vec<Entry<C>> {
    match &self.node(id).kind {
      NodeKind::Internal(entries) => entries,
      NodeKind::Leaf(_) => unreachable!("leaf node {:?} has no entries", id),
    }
  }
  pub(crate) fn entries_mut(&mut self, id: NodeId) -> &mut Vec<Entry<C>> {
    match &mut self.node_mut(id).kind {
      NodeKind::Internal(entries) => entries,
      NodeKind::Leaf(_) => unreachable!("leaf node {:?} has no entries", id),
    }
  }
  pub(crate) fn leaf_bits(&self, id: NodeId) -> &BitVector {
    match &self.node(id).kind {
      NodeKind::Leaf(bv) => bv,
      NodeKind::Internal(_) => unreachable!("internal node {:?} has no bits", id),
    }
  }
  pub(crate) fn leaf_bits_mut(&mut self, id: NodeId) -> &mut BitVector {
    match &mut self.node_mut(id).kind {
      NodeKind::Leaf(bv) => bv,
      NodeKind::Internal(_) => unreachable!("internal node {:?} has no bits", id),
    }
  }
  /// Number of blocks in a leaf, or number of children of an internal node.
  pub(crate) fn size(&self, id: NodeId) -> usize {
    match &self.node(id).kind {
      NodeKind::Leaf(bv) => bv.len() / self.config.block(),
      NodeKind::Internal(entries) => entries.len(),
    }
  }
  /// The totals of the whole subtree rooted at `id`.
  pub(crate) fn counts_of(&self, id: NodeId) -> C {
    match &self.node(id).kind {
      NodeKind::Leaf(bv) => C::of(bv, 0, bv.len()),
      NodeKind::Internal(entries) => {
        let mut total = C::default();
        for entry in entries { total += entry.counts; }
        total
      },
    }
  }
  /// Points the back-references of the children at `entries[from..]` of `id`
  /// to their current position.
  pub(crate) fn reindex(&mut self, id: NodeId, from: usize) {
    let children: Vec<NodeId> = self.entries(id)[from..].iter()
      .map(|entry| entry.child)
      .collect();
    for (offset, child) in children.into_iter().enumerate() {
      let node = self.node_mut(child);
      node.parent = Some(id);
      node.index_in_parent = from + offset;
    }
  }
}

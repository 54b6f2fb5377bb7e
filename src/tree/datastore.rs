use {
  tracing::{debug, trace},
  crate::{
    config::Config,
    error::DKTreeError as Error,
    reference::Graph,
    succinct::{LTree, Path, TTree},
    tree::{Bands, canonical, iterators::Entries},
  },
};

type Result<T> = std::result::Result<T, Error>;

/// A dynamic k²-tree: a compressed, square adjacency matrix which supports
/// adding and removing both edges and rows/columns.
///
/// Row and column indices are handed out by `insert_entry` and returned with
/// `delete_entry`; the same index names both a row and a column. The matrix
/// grows by a factor of k whenever more indices are needed than it can hold.
///
/// ```
/// fn main() -> Result<(), dk2_tree::error::DKTreeError> {
///   use dk2_tree::DKTree;
///   let mut graph = DKTree::new();
///   let a = graph.insert_entry()?;
///   let b = graph.insert_entry()?;
///   graph.add_edge(a, b)?;
///   assert!(graph.report_edge(a, b)?);
///   assert!(!graph.report_edge(b, a)?);
///   graph.remove_edge(a, b)?;
///   assert!(graph.is_empty());
///   Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DKTree {
  config: Config,
  /// Every quadtree level above the cells, in level order.
  ttree: TTree,
  /// The cell level, one block per set bit of the deepest TTree level.
  ltree: LTree,
  /// Width and height of the represented matrix, always a power of k.
  matrix_size: usize,
  /// One past the highest index ever handed out and still live.
  first_free_column: usize,
  /// Freed indices below `first_free_column`, ascending.
  free_columns: Vec<usize>,
}

/* Public */
impl DKTree {
  /// Returns an empty DKTree with the default `Config`: k = 2 and room for
  /// 16 entries before the matrix grows.
  /// ```
  /// use dk2_tree::DKTree;
  /// let tree = DKTree::new();
  /// assert!(tree.is_empty());
  /// assert_eq!(16, tree.matrix_size());
  /// assert_eq!(0, tree.len());
  /// ```
  pub fn new() -> Self {
    DKTree::build(Config::default())
  }
  /// Returns an empty DKTree using `config`, whose matrix starts k⁴ wide.
  /// ```
  /// use dk2_tree::{Config, DKTree};
  /// let tree = DKTree::with_config(Config { k: 3, ..Config::default() }).unwrap();
  /// assert_eq!(81, tree.matrix_size());
  /// assert!(DKTree::with_config(Config { k: 1, ..Config::default() }).is_err());
  /// ```
  pub fn with_config(config: Config) -> Result<Self> {
    config.validate()?;
    Ok(DKTree::build(config))
  }
  /// The parameters this DKTree was built with.
  pub fn config(&self) -> Config {
    self.config
  }
  /// Width (and height) of the matrix currently represented.
  pub fn matrix_size(&self) -> usize {
    self.matrix_size
  }
  /// Number of live entries.
  pub fn len(&self) -> usize {
    self.first_free_column - self.free_columns.len()
  }
  /// Returns true if there are no edges at all.
  pub fn is_empty(&self) -> bool {
    self.ttree.ones() == 0
  }
  /// Iterates over the live entries in increasing order.
  pub fn entries(&self) -> Entries<'_> {
    Entries::new(self)
  }
  /// Allocates an index, reusing the lowest freed one when there is one.
  /// ```
  /// fn main() -> Result<(), dk2_tree::error::DKTreeError> {
  ///   let mut tree = dk2_tree::DKTree::new();
  ///   for _ in 0..4 { tree.insert_entry()?; }
  ///   tree.delete_entry(1)?;
  ///   assert_eq!(1, tree.insert_entry()?);
  ///   assert_eq!(4, tree.insert_entry()?);
  ///   Ok(())
  /// }
  /// ```
  pub fn insert_entry(&mut self) -> Result<usize> {
    if !self.free_columns.is_empty() {
      let index = self.free_columns.remove(0);
      trace!(index, "reusing freed entry");
      return Ok(index)
    }
    if self.first_free_column == self.matrix_size {
      self.increase_matrix_size()?;
    }
    let index = self.first_free_column;
    self.first_free_column += 1;
    trace!(index, "new entry");
    Ok(index)
  }
  /// Removes every edge into or out of `index`, then frees it.
  pub fn delete_entry(&mut self, index: usize) -> Result<()> {
    self.validate(index, "delete_entry")?;
    let live: Vec<usize> = self.entries().collect();
    self.delete_edges(&[index], &live, 1, 0)?;
    self.delete_edges(&live, &[index], 1, 0)?;
    if index + 1 == self.first_free_column {
      self.first_free_column = index;
      while let Some(&last) = self.free_columns.last() {
        if last + 1 != self.first_free_column { break }
        self.free_columns.pop();
        self.first_free_column = last;
      }
    }
    else if let Err(at) = self.free_columns.binary_search(&index) {
      self.free_columns.insert(at, index);
    }
    trace!(index, live = self.len(), "entry deleted");
    Ok(())
  }
  /// Sets the cell at (`row`, `col`).
  pub fn add_edge(&mut self, row: usize, col: usize) -> Result<()> {
    self.validate(row, "add_edge")?;
    self.validate(col, "add_edge")?;
    trace!(row, col, "add edge");
    let kk = self.config.block();
    let levels = self.levels();
    let tlen = self.ttree.bits();
    let mut iteration = 1;
    let mut start = 0;
    let mut pos = loop {
      let pos = start + self.calculate_offset(row, col, iteration);
      if pos >= tlen {
        /* The whole path exists, only the cell is missing */
        self.ltree.set_bit(pos - tlen, true)?;
        return Ok(())
      }
      if !self.ttree.access(pos)? { break pos }
      start = self.ttree.rank1(pos + 1)? * kk;
      iteration += 1;
    };
    /* Materialise the rest of the path, one block per level */
    self.ttree.set_bit(pos, true)?;
    while iteration < levels {
      let child = self.ttree.rank1(pos + 1)? * kk;
      self.ttree.insert_block(child)?;
      iteration += 1;
      pos = child + self.calculate_offset(row, col, iteration);
      self.ttree.set_bit(pos, true)?;
    }
    let leaf = self.ttree.rank1(pos + 1)? * kk - self.ttree.bits();
    self.ltree.insert_block(leaf)?;
    self.ltree.set_bit(leaf + self.calculate_offset(row, col, levels + 1), true)?;
    Ok(())
  }
  /// Clears the cell at (`row`, `col`), pruning every quadrant left empty.
  /// Clearing an empty cell does nothing.
  pub fn remove_edge(&mut self, row: usize, col: usize) -> Result<()> {
    self.validate(row, "remove_edge")?;
    self.validate(col, "remove_edge")?;
    trace!(row, col, "remove edge");
    self.delete_this_edge(row, col, 1, 0)?;
    Ok(())
  }
  /// Returns the value of the cell at (`row`, `col`).
  pub fn report_edge(&self, row: usize, col: usize) -> Result<bool> {
    self.validate(row, "report_edge")?;
    self.validate(col, "report_edge")?;
    let kk = self.config.block();
    let tlen = self.ttree.bits();
    let mut iteration = 1;
    let mut start = 0;
    loop {
      let pos = start + self.calculate_offset(row, col, iteration);
      if pos >= tlen {
        return Ok(self.ltree.access(pos - tlen)?)
      }
      if !self.ttree.access(pos)? { return Ok(false) }
      start = self.ttree.rank1(pos + 1)? * kk;
      iteration += 1;
    }
  }
  /// Returns every edge from a row in `rows` to a column in `cols`.
  ///
  /// Both sets may be given in any order and with repeats. The pairs come
  /// back in traversal order; sort them if a canonical order is needed.
  /// ```
  /// fn main() -> Result<(), dk2_tree::error::DKTreeError> {
  ///   let mut tree = dk2_tree::DKTree::new();
  ///   for _ in 0..8 { tree.insert_entry()?; }
  ///   tree.add_edge(1, 7)?;
  ///   tree.add_edge(6, 2)?;
  ///   tree.add_edge(6, 3)?;
  ///   let mut found = tree.report_all_edges(&[6, 1], &[2, 3, 7])?;
  ///   found.sort();
  ///   assert_eq!(vec![(1, 7), (6, 2), (6, 3)], found);
  ///   assert_eq!(vec![(6, 3)], tree.report_all_edges(&[6], &[3])?);
  ///   Ok(())
  /// }
  /// ```
  pub fn report_all_edges(&self, rows: &[usize], cols: &[usize]) -> Result<Vec<(usize, usize)>> {
    const OPERATION: &str = "report_all_edges";
    if rows.is_empty() || cols.is_empty() {
      return Err(Error::EmptyQuery { operation: OPERATION })
    }
    let rows = canonical(rows);
    let cols = canonical(cols);
    for &index in rows.iter().chain(cols.iter()) {
      self.validate(index, OPERATION)?;
    }
    let mut env = QueryEnv {
      tpath: Path::new(),
      lpath: Path::new(),
      found: Vec::new(),
    };
    self.find_all_edges(&mut env, &rows, &cols, 1, 0)?;
    Ok(env.found)
  }
  /// Every edge between live entries.
  pub fn edges(&self) -> Result<Vec<(usize, usize)>> {
    let live: Vec<usize> = self.entries().collect();
    if live.is_empty() { return Ok(Vec::new()) }
    self.report_all_edges(&live, &live)
  }
  /// Approximate footprint in bytes.
  pub fn memory_usage(&self) -> usize {
    std::mem::size_of::<Self>()
    + self.ttree.memory_usage()
    + self.ltree.memory_usage()
    + self.free_columns.capacity() * std::mem::size_of::<usize>()
  }
  /// The tree holding the quadtree levels above the cells.
  pub fn ttree(&self) -> &TTree {
    &self.ttree
  }
  /// The tree holding the cells.
  pub fn ltree(&self) -> &LTree {
    &self.ltree
  }
  /// Verifies both trees' own invariants, that no quadrant below the root
  /// is stored while empty, and that the LTree holds exactly one block per
  /// set bit of the deepest TTree level.
  pub fn check_invariants(&self) -> std::result::Result<(), String> {
    self.ttree.check_invariants()?;
    self.ltree.check_invariants()?;
    let kk = self.config.block();
    let tblocks = self.ttree.bits() / kk;
    for block in 1..tblocks {
      if self.ttree.ones_in_block(block * kk).map_err(|e| e.to_string())? == 0 {
        return Err(format!("TTree block {} is empty", block))
      }
    }
    for block in 0..self.ltree.bits() / kk {
      if self.ltree.ones_in_block(block * kk).map_err(|e| e.to_string())? == 0 {
        return Err(format!("LTree block {} is empty", block))
      }
    }
    /* Every one owns the block after its predecessor's */
    let children = self.ttree.ones();
    if children + 1 != tblocks + self.ltree.bits() / kk {
      return Err(format!(
        "{} set bits in the TTree but {} TTree and {} LTree blocks",
        children, tblocks, self.ltree.bits() / kk
      ))
    }
    Ok(())
  }
}

/* Traits */
/// The TTree's quadtree levels then the LTree, each as its k²-blocks:
/// blocks are separated by `,` and levels by `::`.
///
/// ```
/// fn main() -> Result<(), dk2_tree::error::DKTreeError> {
///   let mut graph = dk2_tree::DKTree::new();
///   for _ in 0..16 { graph.insert_entry()?; }
///   graph.add_edge(0, 0)?;
///   graph.add_edge(0, 15)?;
///   assert_eq!("[1100::1000,0100::1000,0100::1000,0100]", graph.to_string());
///   Ok(())
/// }
/// ```
impl core::fmt::Display for DKTree {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let kk = self.config.block();
    let mut layers = Vec::new();
    let (mut start, mut blocks) = (0, 1);
    while blocks > 0 && start < self.ttree.bits() {
      let end = start + blocks * kk;
      layers.push(blocks_string(kk, start, end, |n| self.ttree.access(n))?);
      let hi = self.ttree.rank1(end).map_err(|_| core::fmt::Error)?;
      let lo = self.ttree.rank1(start).map_err(|_| core::fmt::Error)?;
      blocks = hi - lo;
      start = end;
    }
    if !self.ltree.is_empty() {
      layers.push(blocks_string(kk, 0, self.ltree.bits(), |n| self.ltree.access(n))?);
    }
    write!(f, "[{}]", layers.join("::"))
  }
}

fn blocks_string(
  kk: usize,
  lo: usize,
  hi: usize,
  access: impl Fn(usize) -> std::result::Result<bool, crate::error::TreeError>,
) -> std::result::Result<String, core::fmt::Error> {
  let mut s = String::new();
  for n in lo..hi {
    if n > lo && (n - lo) % kk == 0 { s.push(','); }
    s.push(if access(n).map_err(|_| core::fmt::Error)? { '1' } else { '0' });
  }
  Ok(s)
}

impl Default for DKTree {
  fn default() -> Self {
    DKTree::new()
  }
}

impl Graph for DKTree {
  fn insert_entry(&mut self) -> Result<usize> {
    DKTree::insert_entry(self)
  }
  fn delete_entry(&mut self, index: usize) -> Result<()> {
    DKTree::delete_entry(self, index)
  }
  fn add_edge(&mut self, row: usize, col: usize) -> Result<()> {
    DKTree::add_edge(self, row, col)
  }
  fn remove_edge(&mut self, row: usize, col: usize) -> Result<()> {
    DKTree::remove_edge(self, row, col)
  }
  fn report_edge(&self, row: usize, col: usize) -> Result<bool> {
    DKTree::report_edge(self, row, col)
  }
  fn report_all_edges(&self, rows: &[usize], cols: &[usize]) -> Result<Vec<(usize, usize)>> {
    DKTree::report_all_edges(self, rows, cols)
  }
}

/* Private */
struct QueryEnv {
  /* Lets find_all_edges recurse without parameter hell */
  tpath: Path<crate::succinct::RankCount>,
  lpath: Path<crate::succinct::BitCount>,
  found: Vec<(usize, usize)>,
}
impl DKTree {
  fn build(config: Config) -> Self {
    DKTree {
      config,
      ttree: TTree::single_block(config),
      ltree: LTree::new(config),
      matrix_size: config.k.pow(4),
      first_free_column: 0,
      free_columns: Vec::new(),
    }
  }
  pub(crate) fn free_columns(&self) -> &[usize] {
    &self.free_columns
  }
  pub(crate) fn first_free_column(&self) -> usize {
    self.first_free_column
  }
  fn validate(&self, index: usize, operation: &'static str) -> Result<()> {
    if index >= self.first_free_column || self.free_columns.binary_search(&index).is_ok() {
      return Err(Error::InvalidIndex { index, operation })
    }
    Ok(())
  }
  /// Number of quadtree levels stored in the TTree.
  fn levels(&self) -> usize {
    let k = self.config.k;
    let mut width = self.matrix_size;
    let mut levels = 0;
    while width > k {
      width /= k;
      levels += 1;
    }
    levels
  }
  /// Which of the k² children of its quadrant at depth `iteration` (from 1)
  /// holds the cell (`row`, `col`).
  fn calculate_offset(&self, row: usize, col: usize, iteration: usize) -> usize {
    let k = self.config.k;
    let former = self.matrix_size / k.pow(iteration as u32 - 1);
    let part = self.matrix_size / k.pow(iteration as u32);
    assert!(part > 0, "quadtree depth {} is below the cell level", iteration);
    k * ((row % former) / part) + (col % former) / part
  }
  /// Multiplies the matrix width by k, making the old matrix the top-left
  /// quadrant of the new one.
  fn increase_matrix_size(&mut self) -> Result<()> {
    self.matrix_size *= self.config.k;
    if self.ttree.ones() > 0 {
      self.ttree.insert_block(0)?;
      self.ttree.set_bit(0, true)?;
    }
    debug!(matrix_size = self.matrix_size, levels = self.levels(), "matrix grew");
    Ok(())
  }
  /// Clears the cell (`row`, `col`) inside the block starting at `first`,
  /// which sits at depth `iteration`. Returns whether that block still holds
  /// any set bit, deleting it when it does not.
  fn delete_this_edge(&mut self, row: usize, col: usize, iteration: usize, first: usize) -> Result<bool> {
    let tlen = self.ttree.bits();
    let pos = first + self.calculate_offset(row, col, iteration);
    if pos >= tlen {
      self.ltree.set_bit(pos - tlen, false)?;
      return self.prune_ltree_block(first - tlen)
    }
    if !self.ttree.access(pos)? { return Ok(true) }
    let child = self.ttree.rank1(pos + 1)? * self.config.block();
    if self.delete_this_edge(row, col, iteration + 1, child)? {
      return Ok(true)
    }
    self.ttree.set_bit(pos, false)?;
    self.prune_ttree_block(first, iteration)
  }
  /// Deletes the LTree block at `start` if it is empty, returning whether it
  /// survived.
  fn prune_ltree_block(&mut self, start: usize) -> Result<bool> {
    if self.ltree.ones_in_block(start)? > 0 { return Ok(true) }
    self.ltree.delete_block(start)?;
    Ok(false)
  }
  /// Deletes the TTree block at `first` if it is empty, returning whether it
  /// survived. The root block always survives.
  fn prune_ttree_block(&mut self, first: usize, iteration: usize) -> Result<bool> {
    if iteration == 1 { return Ok(true) }
    if self.ttree.ones_in_block(first)? > 0 { return Ok(true) }
    self.ttree.delete_block(first)?;
    Ok(false)
  }
  fn find_all_edges(&self, env: &mut QueryEnv, rows: &[usize], cols: &[usize], iteration: usize, first: usize) -> Result<()> {
    let k = self.config.k;
    let former = self.matrix_size / k.pow(iteration as u32 - 1);
    let part = former / k;
    let row_bands = Bands::split(rows, former, part, k);
    let col_bands = Bands::split(cols, former, part, k);
    let tlen = self.ttree.bits();
    for i in 0..k {
      if row_bands[i].is_empty() { continue }
      for j in 0..k {
        if col_bands[j].is_empty() { continue }
        let pos = first + k * i + j;
        if pos >= tlen {
          if self.ltree.access_with(pos - tlen, &mut env.lpath)? {
            for &row in &row_bands[i] {
              for &col in &col_bands[j] { env.found.push((row, col)); }
            }
          }
        }
        else if self.ttree.access_with(pos, &mut env.tpath)? {
          let child = self.ttree.rank1_with(pos + 1, &mut env.tpath)? * k * k;
          self.find_all_edges(env, &row_bands[i], &col_bands[j], iteration + 1, child)?;
        }
      }
    }
    Ok(())
  }
  /// Clears every cell in `rows` × `cols` inside the block starting at
  /// `first`, pruning emptied quadrants. Returns whether the block survived.
  fn delete_edges(&mut self, rows: &[usize], cols: &[usize], iteration: usize, first: usize) -> Result<bool> {
    let k = self.config.k;
    let former = self.matrix_size / k.pow(iteration as u32 - 1);
    let part = former / k;
    let row_bands = Bands::split(rows, former, part, k);
    let col_bands = Bands::split(cols, former, part, k);
    let in_ltree = first >= self.ttree.bits();
    for i in 0..k {
      if row_bands[i].is_empty() { continue }
      for j in 0..k {
        if col_bands[j].is_empty() { continue }
        let pos = first + k * i + j;
        if in_ltree {
          let tlen = self.ttree.bits();
          self.ltree.set_bit(pos - tlen, false)?;
        }
        else if self.ttree.access(pos)? {
          let child = self.ttree.rank1(pos + 1)? * k * k;
          if !self.delete_edges(&row_bands[i], &col_bands[j], iteration + 1, child)? {
            self.ttree.set_bit(pos, false)?;
          }
        }
      }
    }
    if in_ltree {
      let tlen = self.ttree.bits();
      self.prune_ltree_block(first - tlen)
    }
    else {
      self.prune_ttree_block(first, iteration)
    }
  }
}

/* Public Interface Tests */

/* Private Interface Tests */

#[cfg(test)]
mod misc {
  use super::*;
  #[test]
  fn flood() -> Result<()> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut tree = DKTree::new();
    for _ in 0..300 { tree.insert_entry()?; }
    let mut added = Vec::new();
    for _ in 0..2000 {
      let row = rng.gen_range(0, 300);
      let col = rng.gen_range(0, 300);
      tree.add_edge(row, col)?;
      added.push((row, col));
    }
    for &(row, col) in added.iter() { assert!(tree.report_edge(row, col)?); }
    for &(row, col) in added.iter() { tree.remove_edge(row, col)?; }
    assert!(tree.is_empty());
    assert!(tree.check_invariants().is_ok());
    Ok(())
  }
  #[test]
  fn memory_after_clear() -> Result<()> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut tree = DKTree::new();
    let empty = tree.memory_usage();
    for _ in 0..300 { tree.insert_entry()?; }
    let mut added = Vec::new();
    for _ in 0..10_000 {
      let (row, col) = (rng.gen_range(0, 300), rng.gen_range(0, 300));
      tree.add_edge(row, col)?;
      added.push((row, col));
    }
    let full = tree.memory_usage();
    for &(row, col) in added.iter() { tree.remove_edge(row, col)?; }
    assert!(tree.is_empty());
    assert_eq!(4, tree.ttree().bits());
    assert_eq!(1, tree.ttree().arena_len());
    assert_eq!(1, tree.ltree().arena_len());
    let cleared = tree.memory_usage();
    assert!(cleared < empty * 2, "{} bytes after clearing, {} when new", cleared, empty);
    assert!(cleared * 10 < full);
    Ok(())
  }
  #[test]
  fn is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<DKTree>();
  }
  #[test]
  fn is_sync() {
    fn assert_sync<T: Sync>() {}
    assert_sync::<DKTree>();
  }
}

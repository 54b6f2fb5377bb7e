/*!
The graph interface shared by `DKTree` and a plain adjacency-list graph.

`AdjacencyLists` makes no attempt at compression. It is the yardstick the
DKTree's memory use is compared against, and an oracle for its answers.
*/

use crate::error::DKTreeError as Error;

type Result<T> = std::result::Result<T, Error>;

/// A directed graph over indices allocated by the graph itself.
pub trait Graph {
  /// Allocates an index, reusing the lowest freed one when there is one.
  fn insert_entry(&mut self) -> Result<usize>;
  /// Removes every edge into or out of `index`, then frees it.
  fn delete_entry(&mut self, index: usize) -> Result<()>;
  /// Adds the edge `row -> col`.
  fn add_edge(&mut self, row: usize, col: usize) -> Result<()>;
  /// Removes the edge `row -> col`, if present.
  fn remove_edge(&mut self, row: usize, col: usize) -> Result<()>;
  /// Returns true if the edge `row -> col` is present.
  fn report_edge(&self, row: usize, col: usize) -> Result<bool>;
  /// Returns every edge from a row in `rows` to a column in `cols`, in no
  /// particular order.
  fn report_all_edges(&self, rows: &[usize], cols: &[usize]) -> Result<Vec<(usize, usize)>>;
}

/// A graph stored as one sorted neighbour list per index.
///
/// ```
/// fn main() -> Result<(), dk2_tree::error::DKTreeError> {
///   use dk2_tree::{AdjacencyLists, Graph};
///   let mut graph = AdjacencyLists::new();
///   let a = graph.insert_entry()?;
///   let b = graph.insert_entry()?;
///   graph.add_edge(b, a)?;
///   assert_eq!(&[a], graph.neighbours(b)?);
///   Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyLists {
  lists: Vec<Vec<usize>>,
  free_columns: Vec<usize>,
}

impl AdjacencyLists {
  /// Returns a graph with no entries.
  pub fn new() -> Self {
    AdjacencyLists::default()
  }
  /// Number of live entries.
  pub fn len(&self) -> usize {
    self.lists.len() - self.free_columns.len()
  }
  /// Returns true if there are no edges at all.
  pub fn is_empty(&self) -> bool {
    self.lists.iter().all(|list| list.is_empty())
  }
  /// The targets of every edge out of `index`, ascending.
  pub fn neighbours(&self, index: usize) -> Result<&[usize]> {
    self.validate(index, "neighbours")?;
    Ok(&self.lists[index])
  }
  /// Approximate footprint in bytes.
  pub fn memory_usage(&self) -> usize {
    let word = std::mem::size_of::<usize>();
    std::mem::size_of::<Self>()
    + self.lists.capacity() * std::mem::size_of::<Vec<usize>>()
    + self.free_columns.capacity() * word
    + self.lists.iter().map(|list| list.capacity() * word).sum::<usize>()
  }
  fn validate(&self, index: usize, operation: &'static str) -> Result<()> {
    if index >= self.lists.len() || self.free_columns.binary_search(&index).is_ok() {
      return Err(Error::InvalidIndex { index, operation })
    }
    Ok(())
  }
}

impl Graph for AdjacencyLists {
  fn insert_entry(&mut self) -> Result<usize> {
    if self.free_columns.is_empty() {
      self.lists.push(Vec::new());
      Ok(self.lists.len() - 1)
    }
    else {
      Ok(self.free_columns.remove(0))
    }
  }
  fn delete_entry(&mut self, index: usize) -> Result<()> {
    self.validate(index, "delete_entry")?;
    self.lists[index].clear();
    for list in self.lists.iter_mut() {
      if let Ok(at) = list.binary_search(&index) { list.remove(at); }
    }
    if index + 1 == self.lists.len() {
      self.lists.pop();
      /* Freed indices at the top go with it */
      while let Some(&last) = self.free_columns.last() {
        if last + 1 != self.lists.len() { break }
        self.free_columns.pop();
        self.lists.pop();
      }
    }
    else if let Err(at) = self.free_columns.binary_search(&index) {
      self.free_columns.insert(at, index);
    }
    Ok(())
  }
  fn add_edge(&mut self, row: usize, col: usize) -> Result<()> {
    self.validate(row, "add_edge")?;
    self.validate(col, "add_edge")?;
    let list = &mut self.lists[row];
    if let Err(at) = list.binary_search(&col) { list.insert(at, col); }
    Ok(())
  }
  fn remove_edge(&mut self, row: usize, col: usize) -> Result<()> {
    self.validate(row, "remove_edge")?;
    self.validate(col, "remove_edge")?;
    let list = &mut self.lists[row];
    if let Ok(at) = list.binary_search(&col) { list.remove(at); }
    Ok(())
  }
  fn report_edge(&self, row: usize, col: usize) -> Result<bool> {
    self.validate(row, "report_edge")?;
    self.validate(col, "report_edge")?;
    Ok(self.lists[row].binary_search(&col).is_ok())
  }
  fn report_all_edges(&self, rows: &[usize], cols: &[usize]) -> Result<Vec<(usize, usize)>> {
    const OPERATION: &str = "report_all_edges";
    if rows.is_empty() || cols.is_empty() {
      return Err(Error::EmptyQuery { operation: OPERATION })
    }
    let mut rows = rows.to_vec();
    rows.sort_unstable();
    rows.dedup();
    let mut cols = cols.to_vec();
    cols.sort_unstable();
    cols.dedup();
    for &index in rows.iter().chain(cols.iter()) {
      self.validate(index, OPERATION)?;
    }
    let mut found = Vec::new();
    for &row in rows.iter() {
      for &col in self.lists[row].iter() {
        if cols.binary_search(&col).is_ok() { found.push((row, col)); }
      }
    }
    Ok(found)
  }
}

#[cfg(test)]
mod api {
  use super::*;
  #[test]
  fn entries() -> Result<()> {
    let mut graph = AdjacencyLists::new();
    for i in 0..5 { assert_eq!(i, graph.insert_entry()?); }
    graph.delete_entry(1)?;
    graph.delete_entry(3)?;
    assert_eq!(3, graph.len());
    assert_eq!(1, graph.insert_entry()?);
    graph.delete_entry(4)?;
    assert_eq!(3, graph.insert_entry()?);
    assert_eq!(4, graph.insert_entry()?);
    Ok(())
  }
  #[test]
  fn edges() -> Result<()> {
    let mut graph = AdjacencyLists::new();
    for _ in 0..4 { graph.insert_entry()?; }
    graph.add_edge(0, 3)?;
    graph.add_edge(0, 1)?;
    graph.add_edge(0, 1)?;
    graph.add_edge(2, 0)?;
    assert_eq!(&[1, 3], graph.neighbours(0)?);
    assert!(graph.report_edge(2, 0)?);
    assert!(!graph.report_edge(0, 2)?);
    assert_eq!(vec![(0, 1), (2, 0)], graph.report_all_edges(&[2, 0], &[1, 0])?);
    graph.delete_entry(0)?;
    assert!(graph.is_empty());
    assert_eq!(Err(Error::InvalidIndex { index: 0, operation: "report_edge" }), graph.report_edge(0, 1));
    Ok(())
  }
  #[test]
  fn errors() -> Result<()> {
    let mut graph = AdjacencyLists::new();
    assert_eq!(Err(Error::InvalidIndex { index: 0, operation: "delete_entry" }), graph.delete_entry(0));
    graph.insert_entry()?;
    assert_eq!(Err(Error::EmptyQuery { operation: "report_all_edges" }), graph.report_all_edges(&[0], &[]));
    assert_eq!(Err(Error::InvalidIndex { index: 2, operation: "add_edge" }), graph.add_edge(2, 0));
    Ok(())
  }
}

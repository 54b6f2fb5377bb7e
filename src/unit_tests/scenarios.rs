/* Fixed scenarios, run against both graph representations */

use crate::{
  AdjacencyLists, DKTree, Graph,
  error::DKTreeError,
};

type Result<T> = std::result::Result<T, DKTreeError>;

fn graph_with<G: Graph + Default>(entries: usize) -> Result<G> {
  let mut graph = G::default();
  for _ in 0..entries { graph.insert_entry()?; }
  Ok(graph)
}
fn sorted(mut edges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
  edges.sort();
  edges
}

fn first_entries<G: Graph + Default>() -> Result<()> {
  let mut graph = G::default();
  assert_eq!(0, graph.insert_entry()?);
  assert_eq!(1, graph.insert_entry()?);
  assert!(!graph.report_edge(0, 1)?);
  assert!(!graph.report_edge(1, 0)?);
  Ok(())
}
fn corners<G: Graph + Default>() -> Result<()> {
  let mut graph: G = graph_with(16)?;
  let corners = [(0, 0), (0, 15), (15, 0), (15, 15)];
  for &(row, col) in corners.iter() { graph.add_edge(row, col)?; }
  for &(row, col) in corners.iter() { assert!(graph.report_edge(row, col)?); }
  assert!(!graph.report_edge(1, 1)?);
  Ok(())
}
fn growth<G: Graph + Default>() -> Result<()> {
  let mut graph: G = graph_with(16)?;
  graph.add_edge(0, 0)?;
  for _ in 0..16 { graph.insert_entry()?; }
  graph.add_edge(0, 31)?;
  graph.add_edge(31, 0)?;
  graph.add_edge(31, 31)?;
  for &(row, col) in [(0, 0), (0, 31), (31, 0), (31, 31)].iter() {
    assert!(graph.report_edge(row, col)?);
  }
  assert_eq!(4, graph.report_all_edges(&[0, 31], &[0, 31])?.len());
  Ok(())
}
fn delete_entry<G: Graph + Default>() -> Result<()> {
  let mut graph: G = graph_with(16)?;
  let edges = [
    (1, 2), (1, 3), (1, 4), (2, 9), (3, 0), (3, 1), (3, 6), (5, 7), (5, 8), (6, 2),
    (6, 5), (6, 8), (6, 13), (7, 6), (8, 6), (9, 6), (11, 4), (13, 6), (15, 6),
  ];
  for &(row, col) in edges.iter() { graph.add_edge(row, col)?; }
  graph.delete_entry(6)?;
  let live: Vec<usize> = (0..16).filter(|&i| i != 6).collect();
  let expected = sorted(vec![(1, 2), (1, 3), (3, 0), (3, 1), (1, 4), (5, 7), (2, 9), (5, 8), (11, 4)]);
  assert_eq!(expected, sorted(graph.report_all_edges(&live, &live)?));
  Ok(())
}
fn reuse<G: Graph + Default>() -> Result<()> {
  let mut graph: G = graph_with(16)?;
  graph.delete_entry(6)?;
  graph.delete_entry(4)?;
  assert_eq!(4, graph.insert_entry()?);
  Ok(())
}
fn error_message<G: Graph + Default>() -> Result<()> {
  let graph: G = graph_with(2)?;
  match graph.report_edge(0, 2) {
    Err(error) => assert_eq!("report_edge: invalid argument 2, position not occupied in matrix", error.to_string()),
    Ok(_) => panic!("index 2 was never allocated"),
  }
  Ok(())
}

macro_rules! both {
  ($($name:ident),*) => {
    mod dk_tree {
      use super::*;
      $( #[test] fn $name() -> Result<()> { super::$name::<DKTree>() } )*
    }
    mod adjacency_lists {
      use super::*;
      $( #[test] fn $name() -> Result<()> { super::$name::<AdjacencyLists>() } )*
    }
  };
}
both!(first_entries, corners, growth, delete_entry, reuse, error_message);

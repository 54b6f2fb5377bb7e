/* Randomized comparison of DKTree against AdjacencyLists */

use {
  rand::{Rng, seq::SliceRandom},
  crate::{AdjacencyLists, Config, DKTree, Graph},
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn sorted(mut edges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
  edges.sort();
  edges
}

/// Applies the same random operations to both graphs, comparing answers as
/// it goes and the full edge sets every `check_every` steps.
fn run(config: Config, steps: usize, check_every: usize) -> Result<()> {
  let mut rng = rand::thread_rng();
  let mut tree = DKTree::with_config(config)?;
  let mut lists = AdjacencyLists::new();
  for _ in 0..8 {
    assert_eq!(lists.insert_entry()?, tree.insert_entry()?);
  }
  for step in 0..steps {
    let live: Vec<usize> = tree.entries().collect();
    match rng.gen_range(0, 100) {
      0..=2 => {
        assert_eq!(lists.insert_entry()?, tree.insert_entry()?);
      },
      3 if live.len() > 2 => {
        let index = *live.choose(&mut rng).ok_or("no live entries")?;
        tree.delete_entry(index)?;
        lists.delete_entry(index)?;
      },
      4..=59 => {
        let row = *live.choose(&mut rng).ok_or("no live entries")?;
        let col = *live.choose(&mut rng).ok_or("no live entries")?;
        tree.add_edge(row, col)?;
        lists.add_edge(row, col)?;
      },
      60..=84 => {
        /* Prefer existing edges, so removals actually prune */
        let row = *live.choose(&mut rng).ok_or("no live entries")?;
        let col = match lists.neighbours(row)?.choose(&mut rng) {
          Some(&col) => col,
          None => *live.choose(&mut rng).ok_or("no live entries")?,
        };
        tree.remove_edge(row, col)?;
        lists.remove_edge(row, col)?;
      },
      _ => {
        let row = *live.choose(&mut rng).ok_or("no live entries")?;
        let col = *live.choose(&mut rng).ok_or("no live entries")?;
        assert_eq!(lists.report_edge(row, col)?, tree.report_edge(row, col)?);
      },
    }
    if step % check_every == 0 {
      tree.check_invariants()?;
      let live: Vec<usize> = tree.entries().collect();
      assert_eq!(lists.len(), live.len());
      assert_eq!(sorted(lists.report_all_edges(&live, &live)?), sorted(tree.edges()?));
      let rows: Vec<usize> = live.iter().copied().filter(|_| rng.gen_bool(0.3)).collect();
      let cols: Vec<usize> = live.iter().copied().filter(|_| rng.gen_bool(0.3)).collect();
      if !rows.is_empty() && !cols.is_empty() {
        assert_eq!(
          sorted(lists.report_all_edges(&rows, &cols)?),
          sorted(tree.report_all_edges(&rows, &cols)?),
        );
      }
    }
  }
  tree.check_invariants()?;
  assert_eq!(sorted(lists.report_all_edges(&tree.entries().collect::<Vec<_>>(), &tree.entries().collect::<Vec<_>>())?), sorted(tree.edges()?));
  Ok(())
}

#[test]
fn default_config() -> Result<()> {
  run(Config::default(), 4000, 200)
}
#[test]
fn tiny_nodes() -> Result<()> {
  /* Forces frequent splits, merges, spills and steals in both trees */
  run(Config { k: 2, leaf_bits_max: 16, node_size_max: 3 }, 3000, 50)
}
#[test]
fn k_of_three() -> Result<()> {
  run(Config { k: 3, leaf_bits_max: 45, node_size_max: 4 }, 2000, 100)
}
#[test]
fn delete_everything() -> Result<()> {
  let mut rng = rand::thread_rng();
  let mut tree = DKTree::with_config(Config { k: 2, leaf_bits_max: 16, node_size_max: 3 })?;
  for _ in 0..40 { tree.insert_entry()?; }
  for _ in 0..600 {
    tree.add_edge(rng.gen_range(0, 40), rng.gen_range(0, 40))?;
  }
  let mut order: Vec<usize> = (0..40).collect();
  order.shuffle(&mut rng);
  for index in order {
    tree.delete_entry(index)?;
    tree.check_invariants()?;
  }
  assert!(tree.is_empty());
  assert_eq!(0, tree.len());
  assert_eq!(4, tree.ttree().bits());
  assert_eq!(0, tree.ltree().bits());
  assert_eq!(0, tree.insert_entry()?);
  Ok(())
}

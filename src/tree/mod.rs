mod datastore;
mod iterators;

pub use datastore::DKTree;
pub use iterators::Entries;

/* Common */

/// The rows (or columns) of a query, split by which of the k horizontal (or
/// vertical) bands of the current quadrant they fall in.
///
/// A quadrant at a given depth has side `former`, each of its k bands has
/// side `part = former / k`.
#[derive(Debug, Clone, PartialEq)]
struct Bands {
  bands: Vec<Vec<usize>>,
}
impl Bands {
  fn split(indices: &[usize], former: usize, part: usize, k: usize) -> Self {
    let mut bands = vec![Vec::new(); k];
    for &index in indices {
      bands[(index % former) / part].push(index);
    }
    Bands { bands }
  }
  #[cfg(test)]
  fn len(&self) -> usize {
    self.bands.len()
  }
}
impl std::ops::Index<usize> for Bands {
  type Output = [usize];
  fn index(&self, i: usize) -> &Self::Output {
    &self.bands[i]
  }
}

/// Sorts and deduplicates a query's indices.
fn canonical(indices: &[usize]) -> Vec<usize> {
  let mut indices = indices.to_vec();
  indices.sort_unstable();
  indices.dedup();
  indices
}

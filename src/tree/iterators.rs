use crate::tree::datastore::DKTree;

/// An iterator over the live row/column indices of a DKTree, in increasing
/// order.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
  free: &'a [usize],
  next: usize,
  end: usize,
}
impl<'a> Entries<'a> {
  pub(crate) fn new(tree: &'a DKTree) -> Self {
    Entries {
      free: tree.free_columns(),
      next: 0,
      end: tree.first_free_column(),
    }
  }
}
impl<'a> Iterator for Entries<'a> {
  type Item = usize;
  fn next(&mut self) -> Option<Self::Item> {
    while self.next < self.end {
      let index = self.next;
      self.next += 1;
      /* Both sequences ascend, so the freed indices are consumed in step */
      match self.free.first() {
        Some(&freed) if freed == index => self.free = &self.free[1..],
        _ => return Some(index),
      }
    }
    None
  }
  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.end - self.next - self.free.len();
    (len, Some(len))
  }
}
impl ExactSizeIterator for Entries<'_> {}

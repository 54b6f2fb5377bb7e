#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

/*!
A dynamic k²-tree: a compressed representation of sparse, square bit-matrices
(most usefully, the adjacency matrices of large directed graphs) which can be
changed in place.

See the original proposal of the static structure [here](https://users.dcc.uchile.cl/~gnavarro/ps/spire09.1.pdf),
and of the dynamic one in "Compressed dynamic binary relations" (Brisaboa et al.).

**Note:** This library relies upon [bitvec](https://docs.rs/bitvec/0.17.4/bitvec/) to store its bits.
Always try to compile with optimisations, the bit-level operations are slow without them!
*/

/*!
# When `DKTree`s are Useful:

A static k²-tree compresses a bit-matrix very well, but changing a single bit
means rebuilding it. A `DKTree` gives up a little space so that edges can be
added and removed, and rows/columns created and destroyed, one at a time.

A real world example would be a Web-Graph which is crawled incrementally: each
page is an entry (both a row and a column) and each hyperlink an edge.
*/

/*!
# How it Works:

## The k²-tree

Take an 8x8 bit-matrix, k = 2:

```ignore
00|00||10|10
00|00||00|11
------------
00|00||00|00
00|00||00|10
============
10|10||00|11
10|00||00|00
------------
00|00||00|00
00|00||00|00
```

The matrix is divided into k² quadrants, and each quadrant recursively into k²
more, until single cells are reached. A quadrant holding only zeroes is stored
as a single 0 and never divided further:

```ignore
               0111
          ______|||________
          |     |         |
          1101  1100      0100
|----|----|     |----|    |
1000 1011 0010  1010 1000 1100
```

Read level by level, each k²-bit block describes the children of one set bit
in the level above it.
The child block of the set bit at position `p` starts at position `rank1(p + 1) * k²`,
where `rank1(n)` counts the ones before `n`.

## The two trees

Every level above the cells goes into the TTree, the cells go into the LTree:

```ignore
TTree: [0111 1101 1100 0100]
LTree: [1000 1011 0010 1010 1000 1100]
```

A child position at or beyond the TTree's length is a position in the LTree,
offset by that length.

## Making it dynamic

Adding an edge inside an empty quadrant means inserting new blocks into the
middle of both bit sequences, removing the last edge of a quadrant means
deleting blocks. So neither sequence is a flat bit-vector: each is a B+tree
whose leaves hold bounded BitVectors, and whose internal nodes record how many
bits (and, in the TTree, how many ones) each child holds.

The TTree above, with leaves of at most 8 bits:

```ignore
      [8 bits, 6 ones | 8 bits, 3 ones]
         _____|                |_____
         |                          |
   [0111 1101]                [1100 0100]
```

Locating a bit, ranking it, or inserting a block walks one root-to-leaf path,
and nodes that grow too large or too small are rebalanced the way any B+tree
is: by moving a unit to a sibling, splitting, or merging.

## Entries

Row/column indices are allocated by `DKTree::insert_entry`. Deleted indices
are reused lowest first; when the matrix is full its width is multiplied by k
and the old matrix becomes the top-left quadrant of the new one.

```
fn main() -> Result<(), dk2_tree::error::DKTreeError> {
  use dk2_tree::DKTree;
  let mut tree = DKTree::new();
  for _ in 0..20 { tree.insert_entry()?; }
  assert_eq!(32, tree.matrix_size());
  tree.add_edge(3, 19)?;
  tree.add_edge(19, 19)?;
  tree.delete_entry(3)?;
  assert_eq!(vec![(19, 19)], tree.edges()?);
  Ok(())
}
```
*/

pub use {
  config::Config,
  load::{load_edge_list, load_edge_list_file},
  reference::{AdjacencyLists, Graph},
  tree::DKTree,
};

/// `DKTree` structure and assosciated types.
pub mod tree;

/// `TTree` and `LTree`, the B+trees of BitVectors a `DKTree` is built on.
pub mod succinct;

/// Rank-supporting bit-vectors held in the leaves of the succinct trees.
pub mod bit_vector;

/// Tree parameters.
pub mod config;

/// Library error types.
pub mod error;

/// The `Graph` interface and an uncompressed implementation of it.
pub mod reference;

/// Building graphs from edge-list files.
pub mod load;

#[cfg(test)]
mod unit_tests;

/*!
These are all the custom errors that this library could return.

This library uses a nesting system to convey the most useful information
while minimising the number of unique enumerations required:
- DKTreeError:
  - Misuse of the graph API (an index that was never handed out, or was freed,
    or an empty query). These are checked before anything is changed, so the
    DKTree is untouched.
  - CorruptedDKTree wraps a TreeError: a succinct tree was asked for a bit it
    does not hold, which means the DKTree's internal state is inconsistent.
- TreeError:
  - Contract violations against a single TTree or LTree.
- ConfigError:
  - Tree parameters that cannot describe a working tree.
*/

/// Errors produced as a result of interactions with the DKTree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DKTreeError {
  /// Produced when a row or column index is not live: either it was never
  /// returned by `insert_entry`, or it has since been passed to `delete_entry`.
  InvalidIndex {
    /// The offending index.
    index: usize,
    /// The operation that was attempted.
    operation: &'static str,
  },
  /// Produced when a batched query is given an empty set of rows or columns.
  EmptyQuery {
    /// The operation that was attempted.
    operation: &'static str,
  },
  /// Indicates that the source error left, or found, the DKTree in an
  /// inconsistent state.
  CorruptedDKTree {
    ///
    source: Box<TreeError>,
  },
  /// Propogation of a ConfigError.
  InvalidConfig {
    ///
    source: Box<ConfigError>,
  },
}
impl std::error::Error for DKTreeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    use DKTreeError::*;
    match self {
      CorruptedDKTree{source} => Some(source),
      InvalidConfig{source} => Some(source),
      _ => None,
    }
  }
}
impl std::fmt::Display for DKTreeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use DKTreeError::*;
    match self {
      InvalidIndex{index, operation} => write!(f, "{}: invalid argument {}, position not occupied in matrix", operation, index),
      EmptyQuery{operation} => write!(f, "{}: the set of rows or columns to query is empty", operation),
      CorruptedDKTree{source} => write!(f, "The DKTree's contents are corrupted as a result of the following error: {}", source),
      InvalidConfig{source} => write!(f, "{}", source),
    }
  }
}
impl From<TreeError> for DKTreeError {
  fn from(error: TreeError) -> Self {
    DKTreeError::CorruptedDKTree {
      source: Box::new(error),
    }
  }
}
impl From<ConfigError> for DKTreeError {
  fn from(error: ConfigError) -> Self {
    DKTreeError::InvalidConfig {
      source: Box::new(error),
    }
  }
}

/// Errors produced as a result of interactions with a TTree or LTree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
  /// Produced when a bit beyond the end of the tree is requested.
  IndexOutOfRange {
    /// The requested bit.
    index: usize,
    /// The number of bits in the tree.
    len: usize,
  },
  /// Produced when a block is inserted or removed at a position which is not
  /// a multiple of the block length.
  MisalignedBlock {
    /// The position the block operation was attempted at.
    index: usize,
    /// The length of a block.
    block: usize,
  },
}
impl std::error::Error for TreeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    None
  }
}
impl std::fmt::Display for TreeError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use TreeError::*;
    match self {
      IndexOutOfRange{index, len} => write!(f, "Attempt to access bit {} of a tree holding {} bits", index, len),
      MisalignedBlock{index, block} => write!(f, "Could not insert or remove a block of length {} at index {}", block, index),
    }
  }
}

/// Errors produced when validating a Config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
  /// Produced when a user attempts to create a tree with a k value below 2.
  SmallKValue {
    ///
    k: usize,
  },
  /// Produced when k is so large that the initial k⁴ matrix size does not
  /// fit in a usize.
  LargeKValue {
    ///
    k: usize,
  },
  /// Produced when internal nodes could hold fewer than 3 children, which
  /// leaves no room to split or merge them.
  SmallNodeSize {
    ///
    node_size_max: usize,
  },
  /// Produced when a leaf could hold fewer than 2 blocks.
  SmallLeafCapacity {
    ///
    leaf_bits_max: usize,
    /// The length of a block.
    block: usize,
  },
}
impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    None
  }
}
impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use ConfigError::*;
    match self {
      SmallKValue{k} => write!(f, "Attempt to create a DKTree with a k value of {}, which less than the minimum of 2.", k),
      LargeKValue{k} => write!(f, "Attempt to create a DKTree with a k value of {}, whose fourth power overflows a usize.", k),
      SmallNodeSize{node_size_max} => write!(f, "Internal nodes must be allowed at least 3 children, not {}", node_size_max),
      SmallLeafCapacity{leaf_bits_max, block} => write!(f, "Leaves of {} bits cannot hold two blocks of {} bits", leaf_bits_max, block),
    }
  }
}

/// Errors produced while loading a graph from an edge-list.
#[derive(Debug)]
pub enum LoadError {
  /// The reader failed.
  Io {
    ///
    source: std::io::Error,
  },
  /// A line did not consist of two whitespace-separated indices.
  Parse {
    /// The 1-based line number.
    line: usize,
    /// The contents of the offending line.
    content: String,
  },
  /// The graph rejected an operation.
  Graph {
    ///
    source: Box<DKTreeError>,
  },
}
impl std::error::Error for LoadError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    use LoadError::*;
    match self {
      Io{source} => Some(source),
      Graph{source} => Some(source),
      Parse{..} => None,
    }
  }
}
impl std::fmt::Display for LoadError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    use LoadError::*;
    match self {
      Io{source} => write!(f, "Could not read edge-list: {}", source),
      Parse{line, content} => write!(f, "Line {} is not a pair of indices: {:?}", line, content),
      Graph{source} => write!(f, "{}", source),
    }
  }
}
impl From<std::io::Error> for LoadError {
  fn from(error: std::io::Error) -> Self {
    LoadError::Io {
      source: error,
    }
  }
}
impl From<DKTreeError> for LoadError {
  fn from(error: DKTreeError) -> Self {
    LoadError::Graph {
      source: Box::new(error),
    }
  }
}

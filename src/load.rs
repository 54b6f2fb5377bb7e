use {
  std::io::BufRead,
  tracing::debug,
  crate::{error::LoadError as Error, reference::Graph},
};

type Result<T> = std::result::Result<T, Error>;

/// Builds a graph from an edge-list: one `a b` pair of indices per line.
///
/// Entries are allocated until both endpoints of each edge exist, so the
/// graph holds `max(a, b) + 1` entries in the end. Blank lines and lines
/// starting with `#` are skipped.
///
/// ```
/// fn main() -> Result<(), dk2_tree::error::LoadError> {
///   use dk2_tree::{DKTree, load_edge_list};
///   let text = "# a comment\n0 1\n3 0\n";
///   let tree: DKTree = load_edge_list(text.as_bytes())?;
///   assert_eq!(4, tree.len());
///   assert!(tree.report_edge(3, 0)?);
///   Ok(())
/// }
/// ```
pub fn load_edge_list<G: Graph + Default, R: BufRead>(reader: R) -> Result<G> {
  let mut graph = G::default();
  let mut size = 0;
  let mut edges = 0usize;
  for (number, line) in reader.lines().enumerate() {
    let line = line?;
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') { continue }
    let (a, b) = match parse_pair(trimmed) {
      Some(pair) => pair,
      None => return Err(Error::Parse {
        line: number + 1,
        content: line,
      }),
    };
    while a >= size || b >= size {
      graph.insert_entry()?;
      size += 1;
    }
    graph.add_edge(a, b)?;
    edges += 1;
    if edges % 10_000 == 0 {
      debug!(edges, entries = size, "loading edge-list");
    }
  }
  debug!(edges, entries = size, "edge-list loaded");
  Ok(graph)
}

/// `load_edge_list` over the file at `path`.
pub fn load_edge_list_file<G: Graph + Default>(path: impl AsRef<std::path::Path>) -> Result<G> {
  let file = std::fs::File::open(path)?;
  load_edge_list(std::io::BufReader::new(file))
}

fn parse_pair(line: &str) -> Option<(usize, usize)> {
  let mut fields = line.split_whitespace();
  let a = fields.next()?.parse().ok()?;
  let b = fields.next()?.parse().ok()?;
  match fields.next() {
    None => Some((a, b)),
    Some(_) => None,
  }
}

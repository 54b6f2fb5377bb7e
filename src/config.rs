use {
  serde::{Deserialize, Serialize},
  crate::error::ConfigError,
};

/// Tuning parameters shared by a `DKTree` and the two succinct trees it owns.
///
/// Only the three independent values are stored; every bound derived from
/// them is computed on demand.
///
/// ```
/// use dk2_tree::Config;
/// let config = Config::default();
/// assert_eq!(2, config.k);
/// assert_eq!(4, config.block());
/// assert_eq!(128, config.leaf_size_max());
/// assert_eq!(16, config.node_size_min());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// The branching factor of the quadtree, each block is k*k bits.
  pub k: usize,
  /// The maximum number of bits held by a leaf of a succinct tree.
  pub leaf_bits_max: usize,
  /// The maximum number of children of an internal node of a succinct tree.
  pub node_size_max: usize,
}

impl Config {
  /// The number of bits in one block.
  pub fn block(&self) -> usize {
    self.k * self.k
  }
  /// The maximum number of blocks a non-root leaf may hold.
  pub fn leaf_size_max(&self) -> usize {
    self.leaf_bits_max / self.block()
  }
  /// The minimum number of blocks a non-root leaf may hold.
  pub fn leaf_size_min(&self) -> usize {
    (self.leaf_size_max() + 1) / 2
  }
  /// The minimum number of children a non-root internal node may hold.
  pub fn node_size_min(&self) -> usize {
    (self.node_size_max + 1) / 2
  }
  /// Checks that the parameters describe a usable tree.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.k < 2 {
      return Err(ConfigError::SmallKValue { k: self.k })
    }
    if self.k.checked_pow(4).is_none() {
      return Err(ConfigError::LargeKValue { k: self.k })
    }
    if self.node_size_max < 3 {
      return Err(ConfigError::SmallNodeSize { node_size_max: self.node_size_max })
    }
    if self.leaf_size_max() < 2 {
      return Err(ConfigError::SmallLeafCapacity {
        leaf_bits_max: self.leaf_bits_max,
        block: self.block(),
      })
    }
    Ok(())
  }
}

impl Default for Config {
  fn default() -> Self {
    Config {
      k: 2,
      leaf_bits_max: 512,
      node_size_max: 31,
    }
  }
}

#[cfg(test)]
mod api {
  use super::*;
  #[test]
  fn derived_bounds() {
    let config = Config { k: 2, leaf_bits_max: 16, node_size_max: 3 };
    assert_eq!(4, config.block());
    assert_eq!(4, config.leaf_size_max());
    assert_eq!(2, config.leaf_size_min());
    assert_eq!(2, config.node_size_min());
    let config = Config { k: 3, leaf_bits_max: 100, node_size_max: 8 };
    assert_eq!(9, config.block());
    assert_eq!(11, config.leaf_size_max());
    assert_eq!(6, config.leaf_size_min());
    assert_eq!(4, config.node_size_min());
  }
  #[test]
  fn validate() {
    assert!(Config::default().validate().is_ok());
    for k in 0..2 {
      let config = Config { k, ..Config::default() };
      assert!(matches!(config.validate(), Err(ConfigError::SmallKValue { .. })));
    }
    for &k in [usize::MAX, usize::MAX / 2, 1 << (usize::BITS / 4)].iter() {
      let config = Config { k, ..Config::default() };
      assert_eq!(Err(ConfigError::LargeKValue { k }), config.validate());
    }
    let largest = (1usize << (usize::BITS / 4)) - 1;
    assert!(Config { k: largest, leaf_bits_max: usize::MAX, ..Config::default() }.validate().is_ok());
    let config = Config { node_size_max: 2, ..Config::default() };
    assert!(matches!(config.validate(), Err(ConfigError::SmallNodeSize { node_size_max: 2 })));
    let config = Config { leaf_bits_max: 7, ..Config::default() };
    assert!(matches!(config.validate(), Err(ConfigError::SmallLeafCapacity { block: 4, .. })));
  }
  #[test]
  fn from_json() {
    let config: Config = serde_json::from_str(r#"{"k": 2, "leaf_bits_max": 64, "node_size_max": 5}"#).unwrap();
    assert_eq!(Config { k: 2, leaf_bits_max: 64, node_size_max: 5 }, config);
    let partial: Config = serde_json::from_str(r#"{"node_size_max": 7}"#).unwrap();
    assert_eq!(Config { node_size_max: 7, ..Config::default() }, partial);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(config, serde_json::from_str(&json).unwrap());
  }
  #[test]
  fn from_yaml() {
    let config: Config = serde_yaml::from_str("k: 3\nleaf_bits_max: 90\n").unwrap();
    assert_eq!(Config { k: 3, leaf_bits_max: 90, node_size_max: 31 }, config);
    assert!(config.validate().is_ok());
  }
}

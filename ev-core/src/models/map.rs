use std::hash::Hash;

/// A wrapper around an implementation of a HashMap.
///
/// Tallies and vote maps are rendered in responses and logs, so their
/// iteration order should be stable between runs. We replace the
/// std::collections::HashMap with indexmap::IndexMap, wrapped in a newtype so
/// the choice stays an implementation detail.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Map<K: Eq + Hash, V = i64>(indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>);

impl<K: Eq + Hash, V> Default for Map<K, V> {
    fn default() -> Self {
        Self(indexmap::IndexMap::default())
    }
}

impl<K: Eq + Hash, V> std::ops::Deref for Map<K, V> {
    type Target = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K: Eq + Hash, V> std::ops::DerefMut for Map<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K: Eq + Hash, V> IntoIterator for Map<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(indexmap::IndexMap::from_iter(iter))
    }
}

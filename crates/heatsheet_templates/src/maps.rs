//! Placeholder value maps handed to the substitution engine.

use std::collections::{BTreeMap, BTreeSet};

use crate::placeholders::SlotKey;

/// Value rendered for any placeholder whose data is absent.
pub const EMPTY_VALUE: &str = "-";

/// Key → single value, rebuilt for every rendered item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPlaceholderMap {
    values: BTreeMap<SlotKey, String>,
}

impl TextPlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. A later `add` for the same key overwrites the earlier one.
    pub fn add(&mut self, key: impl Into<SlotKey>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Insert an optional value, falling back to [`EMPTY_VALUE`].
    pub fn add_or_empty(&mut self, key: impl Into<SlotKey>, value: Option<String>) {
        self.add(key, value.unwrap_or_else(|| EMPTY_VALUE.to_string()));
    }

    pub fn with(mut self, key: impl Into<SlotKey>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    pub fn get(&self, key: &SlotKey) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.values.contains_key(key)
    }

    /// Copy every entry of `other` into this map, overwriting shared keys.
    pub fn extend(&mut self, other: &TextPlaceholderMap) {
        for (key, value) in &other.values {
            self.values.insert(*key, value.clone());
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotKey, &str)> {
        self.values.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Key → ordered values, where index `i` belongs to the `i`-th source item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePlaceholderMap {
    values: BTreeMap<SlotKey, Vec<String>>,
}

impl TablePlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transpose per-item text maps into aligned value lists.
    ///
    /// A key missing from some item gets [`EMPTY_VALUE`] at that position so
    /// every list stays aligned with the item order.
    pub fn from_text_maps(maps: &[TextPlaceholderMap]) -> Self {
        let keys: BTreeSet<SlotKey> = maps.iter().flat_map(|m| m.keys().copied()).collect();

        let values = keys
            .into_iter()
            .map(|key| {
                let column = maps
                    .iter()
                    .map(|m| m.get(&key).unwrap_or(EMPTY_VALUE).to_string())
                    .collect();
                (key, column)
            })
            .collect();

        Self { values }
    }

    /// Replace the value list for a key.
    pub fn insert(&mut self, key: impl Into<SlotKey>, values: Vec<String>) {
        self.values.insert(key.into(), values);
    }

    pub fn get(&self, key: &SlotKey) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.values.contains_key(key)
    }

    /// Value for row `index`, or [`EMPTY_VALUE`] when the list is shorter.
    pub fn value_at(&self, key: &SlotKey, index: usize) -> Option<&str> {
        self.values
            .get(key)
            .map(|list| list.get(index).map(String::as_str).unwrap_or(EMPTY_VALUE))
    }

    /// Number of rows a table render emits.
    pub fn row_count(&self) -> usize {
        self.values.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SlotKey> {
        self.values.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholders::PlaceholderKey;

    #[test]
    fn test_last_write_wins() {
        let mut map = TextPlaceholderMap::new();
        map.add(PlaceholderKey::Name, "first");
        map.add(PlaceholderKey::Name, "second");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&PlaceholderKey::Name.into()), Some("second"));
    }

    #[test]
    fn test_add_or_empty() {
        let mut map = TextPlaceholderMap::new();
        map.add_or_empty(PlaceholderKey::Club, None);
        assert_eq!(map.get(&PlaceholderKey::Club.into()), Some(EMPTY_VALUE));
    }

    #[test]
    fn test_transpose_preserves_order_and_pads() {
        let a = TextPlaceholderMap::new()
            .with(PlaceholderKey::Name, "Anna")
            .with(PlaceholderKey::Club, "SC Nord");
        let b = TextPlaceholderMap::new().with(PlaceholderKey::Name, "Ben");

        let table = TablePlaceholderMap::from_text_maps(&[a, b]);
        let name = SlotKey::new(PlaceholderKey::Name);
        let club = SlotKey::new(PlaceholderKey::Club);

        assert_eq!(table.get(&name).unwrap(), ["Anna", "Ben"]);
        assert_eq!(table.get(&club).unwrap(), ["SC Nord", EMPTY_VALUE]);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_value_at_past_end() {
        let mut table = TablePlaceholderMap::new();
        table.insert(PlaceholderKey::Name, vec!["a".into(), "b".into(), "c".into()]);
        table.insert(PlaceholderKey::Time, vec!["1:00,00".into()]);

        let time = SlotKey::new(PlaceholderKey::Time);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value_at(&time, 0), Some("1:00,00"));
        assert_eq!(table.value_at(&time, 2), Some(EMPTY_VALUE));
        assert_eq!(table.value_at(&SlotKey::new(PlaceholderKey::Lane), 0), None);
    }
}

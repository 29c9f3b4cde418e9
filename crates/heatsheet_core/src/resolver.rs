//! Item resolvers turn domain items into placeholder values.
//!
//! A resolver declares which keys it can fill and maps one item to a
//! [`TextPlaceholderMap`]. Table rendering is derived from the text form by
//! transposing the per-item maps, so most resolvers only implement
//! [`ItemResolver::resolve_text`].

use heatsheet_templates::{PlaceholderKey, TablePlaceholderMap, TextPlaceholderMap};

use crate::config::FormattingConfig;

/// Maps items of shape `T` to placeholder values.
///
/// The trait is generic over the item so one resolver type may serve several
/// shapes (see [`PersonResolver`](crate::resolvers::PersonResolver)).
pub trait ItemResolver<T>: Send + Sync {
    /// Keys this resolver fills for every item, without a slot number.
    fn supported_keys(&self) -> &'static [PlaceholderKey];

    /// Keys filled once per numbered slot (`Name1`, `Name2`, ...).
    fn slotted_keys(&self) -> &'static [PlaceholderKey] {
        &[]
    }

    /// Values for a single item. Absent fields map to the empty sentinel.
    fn resolve_text(&self, item: &T, config: &FormattingConfig) -> TextPlaceholderMap;

    /// Aligned value lists, index `i` belonging to `items[i]`.
    fn resolve_table(&self, items: &[T], config: &FormattingConfig) -> TablePlaceholderMap {
        let maps: Vec<TextPlaceholderMap> = items
            .iter()
            .map(|item| self.resolve_text(item, config))
            .collect();
        let mut table = TablePlaceholderMap::from_text_maps(&maps);

        // Keep the keys visible so the pattern row is still found and removed.
        if items.is_empty() {
            for key in self.supported_keys() {
                table.insert(*key, Vec::new());
            }
        }
        table
    }
}

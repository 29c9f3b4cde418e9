//! Canonical placeholder keys and the alias registry.
//!
//! Template authors write placeholders with familiar (often localized)
//! abbreviations. The registry maps every accepted alias back to one stable
//! [`PlaceholderKey`], so the rest of the system only deals with canonical keys.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};

/// Built-in table token that yields the 1-based row index.
pub const ROW_INDEX_TOKEN: &str = "ID";

/// Longest token the engine recognizes between two markers.
pub const MAX_TOKEN_LEN: usize = 64;

/// Canonical placeholder identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlaceholderKey {
    Name,
    FirstName,
    LastName,
    BirthYear,
    Gender,
    Club,
    Score,
    ResultPlace,
    CompetitionId,
    Style,
    Distance,
    Time,
    RaceNumber,
    Lane,
    CompetitionYear,
    CompetitionName,
    CompetitionDate,
    CompetitionLocation,
}

impl PlaceholderKey {
    /// Get all keys in declaration order.
    pub fn all() -> &'static [PlaceholderKey] {
        &[
            PlaceholderKey::Name,
            PlaceholderKey::FirstName,
            PlaceholderKey::LastName,
            PlaceholderKey::BirthYear,
            PlaceholderKey::Gender,
            PlaceholderKey::Club,
            PlaceholderKey::Score,
            PlaceholderKey::ResultPlace,
            PlaceholderKey::CompetitionId,
            PlaceholderKey::Style,
            PlaceholderKey::Distance,
            PlaceholderKey::Time,
            PlaceholderKey::RaceNumber,
            PlaceholderKey::Lane,
            PlaceholderKey::CompetitionYear,
            PlaceholderKey::CompetitionName,
            PlaceholderKey::CompetitionDate,
            PlaceholderKey::CompetitionLocation,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::FirstName => "FirstName",
            Self::LastName => "LastName",
            Self::BirthYear => "BirthYear",
            Self::Gender => "Gender",
            Self::Club => "Club",
            Self::Score => "Score",
            Self::ResultPlace => "ResultPlace",
            Self::CompetitionId => "CompetitionId",
            Self::Style => "Style",
            Self::Distance => "Distance",
            Self::Time => "Time",
            Self::RaceNumber => "RaceNumber",
            Self::Lane => "Lane",
            Self::CompetitionYear => "CompetitionYear",
            Self::CompetitionName => "CompetitionName",
            Self::CompetitionDate => "CompetitionDate",
            Self::CompetitionLocation => "CompetitionLocation",
        }
    }

    /// Parse a canonical key name, ignoring case.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
    }

    /// Aliases shipped with the default registry, in addition to the canonical name.
    pub fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Name => &["N", "FullName"],
            Self::FirstName => &["Vorname", "FN"],
            Self::LastName => &["Nachname", "LN"],
            Self::BirthYear => &["Jahrgang", "JG", "BY"],
            Self::Gender => &["Geschlecht", "G"],
            Self::Club => &["Verein", "Team"],
            Self::Score => &["Punkte", "Points", "P"],
            Self::ResultPlace => &["Platz", "Place", "Rank"],
            Self::CompetitionId => &["WK", "CID"],
            Self::Style => &["Lage", "SwimmingStyle", "S"],
            Self::Distance => &["Strecke", "D"],
            Self::Time => &["Zeit", "T"],
            Self::RaceNumber => &["Race", "Lauf", "R"],
            Self::Lane => &["Bahn", "L"],
            Self::CompetitionYear => &["Year", "Jahr"],
            Self::CompetitionName => &["Veranstaltung", "Event"],
            Self::CompetitionDate => &["Datum", "Date"],
            Self::CompetitionLocation => &["Ort", "Location"],
        }
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A canonical key with an optional 1-based postfix slot (`Name` or `Name2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub key: PlaceholderKey,
    pub slot: Option<u32>,
}

impl SlotKey {
    pub fn new(key: PlaceholderKey) -> Self {
        Self { key, slot: None }
    }

    pub fn slotted(key: PlaceholderKey, slot: u32) -> Self {
        Self {
            key,
            slot: Some(slot),
        }
    }
}

impl From<PlaceholderKey> for SlotKey {
    fn from(key: PlaceholderKey) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot {
            Some(slot) => write!(f, "{}{}", self.key, slot),
            None => write!(f, "{}", self.key),
        }
    }
}

/// The slot keys a document fills.
///
/// Plain keys answer `%Name%`; slotted keys answer `%Name1%`, `%Name2%`, ...
/// A key listed only as slotted has no plain value and the other way round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedKeys {
    plain: Vec<PlaceholderKey>,
    slotted: Vec<PlaceholderKey>,
}

impl SupportedKeys {
    pub fn new(plain: impl IntoIterator<Item = PlaceholderKey>) -> Self {
        Self {
            plain: plain.into_iter().collect(),
            slotted: Vec::new(),
        }
    }

    pub fn with_slotted(mut self, keys: impl IntoIterator<Item = PlaceholderKey>) -> Self {
        self.slotted.extend(keys);
        self
    }

    pub fn plain(&self) -> &[PlaceholderKey] {
        &self.plain
    }

    pub fn slotted(&self) -> &[PlaceholderKey] {
        &self.slotted
    }

    pub fn supports(&self, slot: &SlotKey) -> bool {
        match slot.slot {
            None => self.plain.contains(&slot.key),
            Some(_) => self.slotted.contains(&slot.key),
        }
    }
}

/// Check the token grammar shared by aliases and template tokens.
pub(crate) fn is_token_like(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => {}
        _ => return false,
    }
    s.chars().count() <= MAX_TOKEN_LEN
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Builder collecting key → alias entries before the reverse index is built.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<(PlaceholderKey, Vec<String>)>,
}

impl RegistryBuilder {
    /// Register a key together with aliases. The canonical name is always added.
    pub fn key<I, S>(mut self, key: PlaceholderKey, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((key, aliases.into_iter().map(Into::into).collect()));
        self
    }

    /// Add a single alias for a key.
    pub fn alias(self, key: PlaceholderKey, alias: impl Into<String>) -> Self {
        self.key(key, [alias.into()])
    }

    /// Build the registry, enforcing that no alias is shared between keys.
    pub fn build(self) -> TemplateResult<PlaceholderRegistry> {
        let mut aliases: BTreeMap<PlaceholderKey, Vec<String>> = BTreeMap::new();
        let mut index: HashMap<String, PlaceholderKey> = HashMap::new();

        for (key, extra) in self.entries {
            let names = std::iter::once(key.as_str().to_string()).chain(extra);
            for alias in names {
                if !is_token_like(&alias) {
                    return Err(TemplateError::InvalidAlias {
                        alias,
                        key: key.to_string(),
                    });
                }
                if alias.eq_ignore_ascii_case(ROW_INDEX_TOKEN) {
                    return Err(TemplateError::ReservedAlias {
                        alias,
                        key: key.to_string(),
                    });
                }

                let lowered = alias.to_lowercase();
                match index.get(&lowered) {
                    Some(existing) if *existing == key => continue,
                    Some(existing) => {
                        return Err(TemplateError::DuplicateAlias {
                            alias,
                            first: existing.to_string(),
                            second: key.to_string(),
                        });
                    }
                    None => {
                        index.insert(lowered, key);
                        aliases.entry(key).or_default().push(alias);
                    }
                }
            }
        }

        debug!("Built placeholder registry with {} aliases", index.len());
        Ok(PlaceholderRegistry { aliases, index })
    }
}

/// Token → canonical key index, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct PlaceholderRegistry {
    aliases: BTreeMap<PlaceholderKey, Vec<String>>,
    index: HashMap<String, PlaceholderKey>,
}

impl PlaceholderRegistry {
    /// Start an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Start a registry prefilled with every key and its default aliases.
    pub fn default_builder() -> RegistryBuilder {
        PlaceholderKey::all()
            .iter()
            .fold(RegistryBuilder::default(), |builder, key| {
                builder.key(*key, key.default_aliases().iter().copied())
            })
    }

    /// Build the default alias table.
    pub fn with_defaults() -> TemplateResult<Self> {
        Self::default_builder().build()
    }

    /// Build the default alias table extended with configured aliases.
    pub fn with_extra_aliases(extra: &BTreeMap<PlaceholderKey, Vec<String>>) -> TemplateResult<Self> {
        extra
            .iter()
            .fold(Self::default_builder(), |builder, (key, aliases)| {
                builder.key(*key, aliases.iter().cloned())
            })
            .build()
    }

    /// Resolve a token to its canonical key, ignoring case.
    pub fn resolve_token(&self, token: &str) -> Option<PlaceholderKey> {
        self.index.get(&token.to_lowercase()).copied()
    }

    /// Resolve a token that may carry a numeric postfix (`Name2`).
    ///
    /// An exact alias match wins over the postfix interpretation. Slot `0`
    /// is not addressable and resolves to nothing.
    pub fn resolve_slot_token(&self, token: &str) -> Option<SlotKey> {
        if let Some(key) = self.resolve_token(token) {
            return Some(SlotKey::new(key));
        }

        let base = token.trim_end_matches(|c: char| c.is_ascii_digit());
        if base.is_empty() || base.len() == token.len() {
            return None;
        }
        let slot: u32 = token[base.len()..].parse().ok()?;
        if slot == 0 {
            return None;
        }
        self.resolve_token(base)
            .map(|key| SlotKey::slotted(key, slot))
    }

    /// Aliases registered for a key; the canonical name comes first.
    pub fn aliases(&self, key: PlaceholderKey) -> &[String] {
        self.aliases.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Registered keys in canonical order.
    pub fn keys(&self) -> Vec<PlaceholderKey> {
        self.aliases.keys().copied().collect()
    }

    /// Total number of registered aliases.
    pub fn alias_count(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_builds() {
        let registry = PlaceholderRegistry::with_defaults().unwrap();
        assert_eq!(registry.keys().len(), PlaceholderKey::all().len());
        assert_eq!(registry.aliases(PlaceholderKey::BirthYear)[0], "BirthYear");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = PlaceholderRegistry::with_defaults().unwrap();
        assert_eq!(registry.resolve_token("jahrgang"), Some(PlaceholderKey::BirthYear));
        assert_eq!(registry.resolve_token("JG"), Some(PlaceholderKey::BirthYear));
        assert_eq!(registry.resolve_token("NAME"), Some(PlaceholderKey::Name));
        assert_eq!(registry.resolve_token("Unknown"), None);
    }

    #[test]
    fn test_resolve_slot_token() {
        let registry = PlaceholderRegistry::with_defaults().unwrap();
        assert_eq!(
            registry.resolve_slot_token("Name2"),
            Some(SlotKey::slotted(PlaceholderKey::Name, 2))
        );
        assert_eq!(
            registry.resolve_slot_token("bahn12"),
            Some(SlotKey::slotted(PlaceholderKey::Lane, 12))
        );
        assert_eq!(
            registry.resolve_slot_token("Time"),
            Some(SlotKey::new(PlaceholderKey::Time))
        );
        assert_eq!(registry.resolve_slot_token("Name0"), None);
        assert_eq!(registry.resolve_slot_token("42"), None);
        assert_eq!(registry.resolve_slot_token("Nobody3"), None);
    }

    #[test]
    fn test_exact_alias_beats_postfix() {
        let registry = PlaceholderRegistry::builder()
            .key(PlaceholderKey::Lane, ["Lane1st"])
            .key(PlaceholderKey::Name, ["Lane1"])
            .build()
            .unwrap();
        assert_eq!(
            registry.resolve_slot_token("lane1"),
            Some(SlotKey::new(PlaceholderKey::Name))
        );
        assert_eq!(
            registry.resolve_slot_token("lane2"),
            Some(SlotKey::slotted(PlaceholderKey::Lane, 2))
        );
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let result = PlaceholderRegistry::builder()
            .key(PlaceholderKey::Name, ["N"])
            .key(PlaceholderKey::LastName, ["n"])
            .build();
        assert!(matches!(result, Err(TemplateError::DuplicateAlias { .. })));
    }

    #[test]
    fn test_repeated_alias_for_same_key_is_ignored() {
        let registry = PlaceholderRegistry::builder()
            .key(PlaceholderKey::Name, ["N", "n", "Name"])
            .build()
            .unwrap();
        assert_eq!(registry.aliases(PlaceholderKey::Name), ["Name", "N"]);
    }

    #[test]
    fn test_row_index_token_is_reserved() {
        let result = PlaceholderRegistry::default_builder()
            .alias(PlaceholderKey::Lane, "id")
            .build();
        assert!(matches!(result, Err(TemplateError::ReservedAlias { .. })));
    }

    #[test]
    fn test_invalid_alias_rejected() {
        let result = PlaceholderRegistry::builder()
            .alias(PlaceholderKey::Club, "two words")
            .build();
        assert!(matches!(result, Err(TemplateError::InvalidAlias { .. })));
    }

    #[test]
    fn test_extra_aliases() {
        let mut extra = BTreeMap::new();
        extra.insert(PlaceholderKey::Name, vec!["Nom".to_string()]);
        let registry = PlaceholderRegistry::with_extra_aliases(&extra).unwrap();
        assert_eq!(registry.resolve_token("nom"), Some(PlaceholderKey::Name));
        assert_eq!(registry.resolve_token("FullName"), Some(PlaceholderKey::Name));
    }

    #[test]
    fn test_slot_key_display() {
        assert_eq!(SlotKey::slotted(PlaceholderKey::Name, 3).to_string(), "Name3");
        assert_eq!(SlotKey::new(PlaceholderKey::Club).to_string(), "Club");
        assert_eq!(PlaceholderKey::from_str("birthyear"), Some(PlaceholderKey::BirthYear));
    }

    #[test]
    fn test_supported_keys_separate_plain_and_slotted() {
        let keys = SupportedKeys::new([PlaceholderKey::RaceNumber])
            .with_slotted([PlaceholderKey::Name, PlaceholderKey::RaceNumber]);

        assert!(keys.supports(&SlotKey::new(PlaceholderKey::RaceNumber)));
        assert!(keys.supports(&SlotKey::slotted(PlaceholderKey::Name, 2)));
        assert!(!keys.supports(&SlotKey::new(PlaceholderKey::Name)));
        assert!(!keys.supports(&SlotKey::slotted(PlaceholderKey::Club, 1)));
    }
}

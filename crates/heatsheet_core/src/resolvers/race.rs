use heatsheet_templates::{PlaceholderKey, SlotKey, TextPlaceholderMap, EMPTY_VALUE};

use super::{add_person_fields, add_start_fields, PersonFields};
use crate::config::FormattingConfig;
use crate::model::Race;
use crate::resolver::ItemResolver;

/// Keys describing the race itself; start fields only exist per slot.
const RACE_KEYS: &[PlaceholderKey] = &[
    PlaceholderKey::RaceNumber,
    PlaceholderKey::Style,
    PlaceholderKey::Distance,
];

/// Keys repeated once per start slot (`Name1`, `Lane1`, `Name2`, ...).
const SLOT_KEYS: &[PlaceholderKey] = &[
    PlaceholderKey::Name,
    PlaceholderKey::FirstName,
    PlaceholderKey::LastName,
    PlaceholderKey::BirthYear,
    PlaceholderKey::Gender,
    PlaceholderKey::Club,
    PlaceholderKey::Style,
    PlaceholderKey::Distance,
    PlaceholderKey::CompetitionId,
    PlaceholderKey::Time,
    PlaceholderKey::RaceNumber,
    PlaceholderKey::Lane,
    PlaceholderKey::Score,
];

/// Resolves a race card: the race itself plus one numbered slot per start.
///
/// The slot count is `max(race_slots, starts)`; slots without a start hold
/// the empty sentinel so a fixed card layout never shows raw tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RaceResolver;

impl RaceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Number of slots a race card needs.
    pub fn slot_count(race: &Race, config: &FormattingConfig) -> u32 {
        config.race_slots.max(race.starts.len() as u32)
    }
}

impl ItemResolver<Race> for RaceResolver {
    fn supported_keys(&self) -> &'static [PlaceholderKey] {
        RACE_KEYS
    }

    fn slotted_keys(&self) -> &'static [PlaceholderKey] {
        SLOT_KEYS
    }

    fn resolve_text(&self, race: &Race, config: &FormattingConfig) -> TextPlaceholderMap {
        let mut map = TextPlaceholderMap::new();
        map.add(PlaceholderKey::RaceNumber, race.number.to_string());

        let first = race.starts.first();
        map.add_or_empty(
            PlaceholderKey::Style,
            first.map(|s| s.style.display_name().to_string()),
        );
        map.add_or_empty(PlaceholderKey::Distance, first.map(|s| format!("{}m", s.distance)));

        for slot in 1..=Self::slot_count(race, config) {
            match race.starts.get(slot as usize - 1) {
                Some(start) => {
                    add_person_fields(&mut map, &PersonFields::from(start), Some(slot));
                    add_start_fields(&mut map, start, config, Some(slot));
                }
                None => {
                    for key in SLOT_KEYS {
                        map.add(SlotKey::slotted(*key, slot), EMPTY_VALUE);
                    }
                }
            }
        }
        map
    }
}

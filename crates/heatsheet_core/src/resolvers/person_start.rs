use heatsheet_templates::{PlaceholderKey, TextPlaceholderMap};

use super::{add_person_fields, add_start_fields, PersonFields};
use crate::config::FormattingConfig;
use crate::model::PersonStart;
use crate::resolver::ItemResolver;

const START_KEYS: &[PlaceholderKey] = &[
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

/// Resolves one start of one person.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonStartResolver;

impl PersonStartResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ItemResolver<PersonStart> for PersonStartResolver {
    fn supported_keys(&self) -> &'static [PlaceholderKey] {
        START_KEYS
    }

    fn resolve_text(&self, start: &PersonStart, config: &FormattingConfig) -> TextPlaceholderMap {
        let mut map = TextPlaceholderMap::new();
        add_person_fields(&mut map, &PersonFields::from(start), None);
        add_start_fields(&mut map, start, config, None);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompetitionData;
    use heatsheet_templates::{SlotKey, EMPTY_VALUE};

    #[test]
    fn test_resolve_start() {
        let start = CompetitionData::sample().races[0].starts[1].clone();
        let map = PersonStartResolver.resolve_text(&start, &FormattingConfig::default());
        let value = |key| map.get(&SlotKey::new(key)).unwrap();

        assert_eq!(value(PlaceholderKey::Name), "Ben Cole");
        assert_eq!(value(PlaceholderKey::Style), "Freestyle");
        assert_eq!(value(PlaceholderKey::Distance), "50m");
        assert_eq!(value(PlaceholderKey::Time), "0:41,05");
        assert_eq!(value(PlaceholderKey::RaceNumber), "1");
        assert_eq!(value(PlaceholderKey::Lane), "2");
        assert_eq!(value(PlaceholderKey::CompetitionId), "1");
    }

    #[test]
    fn test_unswum_start() {
        let mut start = CompetitionData::sample().races[1].starts[0].clone();
        start.time_ms = None;
        start.score = None;
        start.lane = None;
        let map = PersonStartResolver.resolve_text(&start, &FormattingConfig::default());

        for key in [PlaceholderKey::Time, PlaceholderKey::Score, PlaceholderKey::Lane] {
            assert_eq!(map.get(&SlotKey::new(key)), Some(EMPTY_VALUE));
        }
        assert_eq!(map.len(), START_KEYS.len());
    }
}

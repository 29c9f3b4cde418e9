use heatsheet_templates::{PlaceholderKey, TextPlaceholderMap};

use super::{add_person_fields, PersonFields};
use crate::config::FormattingConfig;
use crate::model::{Person, PersonStart};
use crate::resolver::ItemResolver;

const PERSON_KEYS: &[PlaceholderKey] = &[
    PlaceholderKey::Name,
    PlaceholderKey::FirstName,
    PlaceholderKey::LastName,
    PlaceholderKey::BirthYear,
    PlaceholderKey::Gender,
    PlaceholderKey::Club,
    PlaceholderKey::Score,
    PlaceholderKey::ResultPlace,
];

/// Resolves the personal data and overall result of a participant.
///
/// Also accepts a [`PersonStart`], filling the start's score and leaving the
/// result place empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonResolver;

impl PersonResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ItemResolver<Person> for PersonResolver {
    fn supported_keys(&self) -> &'static [PlaceholderKey] {
        PERSON_KEYS
    }

    fn resolve_text(&self, person: &Person, config: &FormattingConfig) -> TextPlaceholderMap {
        let mut map = TextPlaceholderMap::new();
        add_person_fields(
            &mut map,
            &PersonFields {
                first_name: &person.first_name,
                last_name: &person.last_name,
                full_name: person.full_name(),
                gender: person.gender,
                birth_year: person.birth_year,
                club: person.club.as_deref(),
            },
            None,
        );
        map.add_or_empty(PlaceholderKey::Score, person.score.map(|s| config.format_score(s)));
        map.add_or_empty(PlaceholderKey::ResultPlace, person.result_place.map(|p| p.to_string()));
        map
    }
}

impl ItemResolver<PersonStart> for PersonResolver {
    fn supported_keys(&self) -> &'static [PlaceholderKey] {
        PERSON_KEYS
    }

    fn resolve_text(&self, start: &PersonStart, config: &FormattingConfig) -> TextPlaceholderMap {
        let mut map = TextPlaceholderMap::new();
        add_person_fields(&mut map, &PersonFields::from(start), None);
        map.add_or_empty(PlaceholderKey::Score, start.score.map(|s| config.format_score(s)));
        map.add_or_empty(PlaceholderKey::ResultPlace, None);
        map
    }
}

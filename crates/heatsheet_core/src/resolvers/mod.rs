//! Built-in resolvers for persons, starts and races.

mod person;
mod person_start;
mod race;

pub use person::PersonResolver;
pub use person_start::PersonStartResolver;
pub use race::RaceResolver;

use heatsheet_templates::{PlaceholderKey, SlotKey, TextPlaceholderMap};

use crate::config::FormattingConfig;
use crate::model::{CompetitionInfo, Gender, PersonStart};

/// Date format used for `CompetitionDate`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Keys injected into every document from the competition header.
pub const COMPETITION_KEYS: &[PlaceholderKey] = &[
    PlaceholderKey::CompetitionYear,
    PlaceholderKey::CompetitionName,
    PlaceholderKey::CompetitionDate,
    PlaceholderKey::CompetitionLocation,
];

/// Document-wide values describing the competition itself.
pub fn competition_values(info: &CompetitionInfo) -> TextPlaceholderMap {
    let mut map = TextPlaceholderMap::new();
    map.add_or_empty(PlaceholderKey::CompetitionYear, info.year().map(|y| y.to_string()));
    map.add_or_empty(
        PlaceholderKey::CompetitionName,
        Some(info.name.clone()).filter(|n| !n.trim().is_empty()),
    );
    map.add_or_empty(
        PlaceholderKey::CompetitionDate,
        info.date.map(|d| d.format(DATE_FORMAT).to_string()),
    );
    map.add_or_empty(PlaceholderKey::CompetitionLocation, info.location.clone());
    map
}

/// Person fields shared by persons and starts.
struct PersonFields<'a> {
    first_name: &'a str,
    last_name: &'a str,
    full_name: String,
    gender: Gender,
    birth_year: Option<u16>,
    club: Option<&'a str>,
}

impl<'a> From<&'a PersonStart> for PersonFields<'a> {
    fn from(start: &'a PersonStart) -> Self {
        Self {
            first_name: &start.first_name,
            last_name: &start.last_name,
            full_name: start.full_name(),
            gender: start.gender,
            birth_year: start.birth_year,
            club: start.club.as_deref(),
        }
    }
}

fn add_person_fields(map: &mut TextPlaceholderMap, fields: &PersonFields<'_>, slot: Option<u32>) {
    let key = |key: PlaceholderKey| SlotKey { key, slot };
    map.add_or_empty(key(PlaceholderKey::Name), non_blank(&fields.full_name));
    map.add_or_empty(key(PlaceholderKey::FirstName), non_blank(fields.first_name));
    map.add_or_empty(key(PlaceholderKey::LastName), non_blank(fields.last_name));
    map.add_or_empty(key(PlaceholderKey::BirthYear), fields.birth_year.map(|y| y.to_string()));
    map.add(key(PlaceholderKey::Gender), fields.gender.to_string());
    map.add_or_empty(key(PlaceholderKey::Club), fields.club.and_then(non_blank));
}

/// Start fields (everything a start adds on top of the person).
fn add_start_fields(
    map: &mut TextPlaceholderMap,
    start: &PersonStart,
    config: &FormattingConfig,
    slot: Option<u32>,
) {
    let key = |key: PlaceholderKey| SlotKey { key, slot };
    map.add(key(PlaceholderKey::Style), start.style.display_name());
    map.add(key(PlaceholderKey::Distance), format!("{}m", start.distance));
    map.add_or_empty(key(PlaceholderKey::CompetitionId), start.competition_id.map(|id| id.to_string()));
    map.add_or_empty(key(PlaceholderKey::Time), start.time_ms.map(|ms| config.format_time(ms)));
    map.add_or_empty(key(PlaceholderKey::RaceNumber), start.race_number.map(|n| n.to_string()));
    map.add_or_empty(key(PlaceholderKey::Lane), start.lane.map(|l| l.to_string()));
    map.add_or_empty(key(PlaceholderKey::Score), start.score.map(|s| config.format_score(s)));
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use heatsheet_templates::EMPTY_VALUE;

    #[test]
    fn test_competition_values() {
        let info = CompetitionInfo {
            name: "Spring Cup".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 20),
            location: None,
        };
        let map = competition_values(&info);

        assert_eq!(map.get(&PlaceholderKey::CompetitionYear.into()), Some("2024"));
        assert_eq!(map.get(&PlaceholderKey::CompetitionDate.into()), Some("20.04.2024"));
        assert_eq!(map.get(&PlaceholderKey::CompetitionLocation.into()), Some(EMPTY_VALUE));
    }

    #[test]
    fn test_empty_competition_is_all_sentinels() {
        let map = competition_values(&CompetitionInfo::default());
        for key in COMPETITION_KEYS {
            assert_eq!(map.get(&(*key).into()), Some(EMPTY_VALUE));
        }
    }
}

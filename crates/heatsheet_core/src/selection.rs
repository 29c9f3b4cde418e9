//! Sort and filter modes of the built-in item shapes.

use std::cmp::Ordering;

use crate::error::CoreResult;
use crate::model::{Gender, Person, PersonStart, Race, SwimmingStyle};
use crate::strategy::{FilterParameter, StrategyItem, StrategyMode};

/// Compare optional values, placing `None` last.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Higher scores first, missing scores last.
fn score_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (a, b) => missing_last(a.map(|_| ()), b.map(|_| ())),
    }
}

fn by_name(first_a: &str, last_a: &str, first_b: &str, last_b: &str) -> Ordering {
    last_a
        .to_lowercase()
        .cmp(&last_b.to_lowercase())
        .then_with(|| first_a.to_lowercase().cmp(&first_b.to_lowercase()))
}

fn same_club(club: Option<&str>, parameter: &FilterParameter) -> bool {
    club.is_some_and(|c| c.trim().eq_ignore_ascii_case(parameter.as_str().trim()))
}

fn club_order(a: Option<&str>, b: Option<&str>) -> Ordering {
    missing_last(a.map(str::to_lowercase), b.map(str::to_lowercase))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonSort {
    Name,
    BirthYear,
    Score,
    ResultPlace,
    Club,
}

impl StrategyMode for PersonSort {
    fn all() -> &'static [Self] {
        &[
            PersonSort::Name,
            PersonSort::BirthYear,
            PersonSort::Score,
            PersonSort::ResultPlace,
            PersonSort::Club,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::BirthYear => "birth-year",
            Self::Score => "score",
            Self::ResultPlace => "result-place",
            Self::Club => "club",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonFilter {
    Gender,
    Club,
    BirthYear,
    /// Only persons with a result place; the parameter is ignored.
    HasResult,
}

impl StrategyMode for PersonFilter {
    fn all() -> &'static [Self] {
        &[
            PersonFilter::Gender,
            PersonFilter::Club,
            PersonFilter::BirthYear,
            PersonFilter::HasResult,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Club => "club",
            Self::BirthYear => "birth-year",
            Self::HasResult => "has-result",
        }
    }
}

impl StrategyItem for Person {
    type Sort = PersonSort;
    type Filter = PersonFilter;

    const NAME: &'static str = "person";

    fn compare(a: &Self, b: &Self, sort: PersonSort) -> Ordering {
        match sort {
            PersonSort::Name => by_name(&a.first_name, &a.last_name, &b.first_name, &b.last_name),
            PersonSort::BirthYear => missing_last(a.birth_year, b.birth_year),
            PersonSort::Score => score_descending(a.score, b.score),
            PersonSort::ResultPlace => missing_last(a.result_place, b.result_place),
            PersonSort::Club => club_order(a.club.as_deref(), b.club.as_deref()),
        }
    }

    fn matches(&self, filter: PersonFilter, parameter: &FilterParameter) -> bool {
        match filter {
            PersonFilter::Gender => Gender::from_str(parameter.as_str()) == Some(self.gender),
            PersonFilter::Club => same_club(self.club.as_deref(), parameter),
            PersonFilter::BirthYear => {
                self.birth_year.is_some() && parameter.as_str().trim().parse().ok() == self.birth_year
            }
            PersonFilter::HasResult => self.result_place.is_some(),
        }
    }

    fn validate_filter(filter: PersonFilter, parameter: &FilterParameter) -> CoreResult<()> {
        match filter {
            PersonFilter::Gender => parameter.parse_with(filter.as_str(), Gender::from_str).map(drop),
            PersonFilter::BirthYear => parameter
                .parse_with(filter.as_str(), |s| s.parse::<u16>().ok())
                .map(drop),
            PersonFilter::Club | PersonFilter::HasResult => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonStartSort {
    Name,
    CompetitionId,
    /// Race number, then lane.
    Race,
    Time,
}

impl StrategyMode for PersonStartSort {
    fn all() -> &'static [Self] {
        &[
            PersonStartSort::Name,
            PersonStartSort::CompetitionId,
            PersonStartSort::Race,
            PersonStartSort::Time,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CompetitionId => "competition-id",
            Self::Race => "race",
            Self::Time => "time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonStartFilter {
    Gender,
    Style,
    CompetitionId,
    Club,
}

impl StrategyMode for PersonStartFilter {
    fn all() -> &'static [Self] {
        &[
            PersonStartFilter::Gender,
            PersonStartFilter::Style,
            PersonStartFilter::CompetitionId,
            PersonStartFilter::Club,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Style => "style",
            Self::CompetitionId => "competition-id",
            Self::Club => "club",
        }
    }
}

impl StrategyItem for PersonStart {
    type Sort = PersonStartSort;
    type Filter = PersonStartFilter;

    const NAME: &'static str = "start";

    fn compare(a: &Self, b: &Self, sort: PersonStartSort) -> Ordering {
        match sort {
            PersonStartSort::Name => by_name(&a.first_name, &a.last_name, &b.first_name, &b.last_name),
            PersonStartSort::CompetitionId => missing_last(a.competition_id, b.competition_id),
            PersonStartSort::Race => missing_last(a.race_number, b.race_number)
                .then_with(|| missing_last(a.lane, b.lane)),
            PersonStartSort::Time => missing_last(a.time_ms, b.time_ms),
        }
    }

    fn matches(&self, filter: PersonStartFilter, parameter: &FilterParameter) -> bool {
        match filter {
            PersonStartFilter::Gender => Gender::from_str(parameter.as_str()) == Some(self.gender),
            PersonStartFilter::Style => SwimmingStyle::from_str(parameter.as_str()) == Some(self.style),
            PersonStartFilter::CompetitionId => {
                self.competition_id.is_some()
                    && parameter.as_str().trim().parse().ok() == self.competition_id
            }
            PersonStartFilter::Club => same_club(self.club.as_deref(), parameter),
        }
    }

    fn validate_filter(filter: PersonStartFilter, parameter: &FilterParameter) -> CoreResult<()> {
        match filter {
            PersonStartFilter::Gender => {
                parameter.parse_with(filter.as_str(), Gender::from_str).map(drop)
            }
            PersonStartFilter::Style => parameter
                .parse_with(filter.as_str(), SwimmingStyle::from_str)
                .map(drop),
            PersonStartFilter::CompetitionId => parameter
                .parse_with(filter.as_str(), |s| s.parse::<u32>().ok())
                .map(drop),
            PersonStartFilter::Club => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceSort {
    Number,
}

impl StrategyMode for RaceSort {
    fn all() -> &'static [Self] {
        &[RaceSort::Number]
    }

    fn as_str(&self) -> &'static str {
        "number"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceFilter {
    /// Races with at least one start of the given style.
    Style,
}

impl StrategyMode for RaceFilter {
    fn all() -> &'static [Self] {
        &[RaceFilter::Style]
    }

    fn as_str(&self) -> &'static str {
        "style"
    }
}

impl StrategyItem for Race {
    type Sort = RaceSort;
    type Filter = RaceFilter;

    const NAME: &'static str = "race";

    fn compare(a: &Self, b: &Self, sort: RaceSort) -> Ordering {
        match sort {
            RaceSort::Number => a.number.cmp(&b.number),
        }
    }

    fn matches(&self, filter: RaceFilter, parameter: &FilterParameter) -> bool {
        match filter {
            RaceFilter::Style => match SwimmingStyle::from_str(parameter.as_str()) {
                Some(style) => self.starts.iter().any(|s| s.style == style),
                None => false,
            },
        }
    }

    fn validate_filter(filter: RaceFilter, parameter: &FilterParameter) -> CoreResult<()> {
        parameter
            .parse_with(filter.as_str(), SwimmingStyle::from_str)
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::CompetitionData;

    fn sorted<T: StrategyItem>(mut items: Vec<T>, sort: T::Sort) -> Vec<T> {
        items.sort_by(|a, b| T::compare(a, b, sort));
        items
    }

    #[test]
    fn test_person_sorts() {
        let persons = CompetitionData::sample().persons;
        let last = |items: Vec<Person>| items.iter().map(|p| p.last_name.clone()).collect::<Vec<_>>();

        assert_eq!(last(sorted(persons.clone(), PersonSort::ResultPlace)), ["Dorn", "Berg", "Cole"]);
        assert_eq!(last(sorted(persons.clone(), PersonSort::Name)), ["Berg", "Cole", "Dorn"]);
        assert_eq!(last(sorted(persons.clone(), PersonSort::Score)), ["Dorn", "Cole", "Berg"]);
        assert_eq!(last(sorted(persons, PersonSort::BirthYear)), ["Cole", "Berg", "Dorn"]);
    }

    #[test]
    fn test_missing_values_sort_last() {
        let mut persons = CompetitionData::sample().persons;
        persons[2].result_place = None;
        persons[0].score = None;

        let by_place = sorted(persons.clone(), PersonSort::ResultPlace);
        assert_eq!(by_place[2].last_name, "Dorn");
        let by_score = sorted(persons, PersonSort::Score);
        assert_eq!(by_score[2].last_name, "Berg");
    }

    #[test]
    fn test_start_filters() {
        let starts = CompetitionData::sample().all_starts();
        let count = |filter, parameter: &str| {
            starts
                .iter()
                .filter(|s| s.matches(filter, &FilterParameter::new(parameter)))
                .count()
        };

        assert_eq!(count(PersonStartFilter::Style, "freestyle"), 2);
        assert_eq!(count(PersonStartFilter::Gender, "m"), 1);
        assert_eq!(count(PersonStartFilter::CompetitionId, "2"), 1);
        assert_eq!(count(PersonStartFilter::Club, "SC NORD"), 2);
    }

    #[test]
    fn test_race_sort_by_lane_within_race() {
        let starts = CompetitionData::sample().all_starts();
        let ordered = sorted(starts, PersonStartSort::Race);
        let slots: Vec<(Option<u32>, Option<u32>)> =
            ordered.iter().map(|s| (s.race_number, s.lane)).collect();
        assert_eq!(slots, vec![(Some(1), Some(1)), (Some(1), Some(2)), (Some(2), Some(1))]);
    }

    #[test]
    fn test_race_style_filter() {
        let races = CompetitionData::sample().races;
        let parameter = FilterParameter::new("breaststroke");
        let matching: Vec<u32> = races
            .iter()
            .filter(|r| r.matches(RaceFilter::Style, &parameter))
            .map(|r| r.number)
            .collect();
        assert_eq!(matching, vec![2]);
    }

    #[test]
    fn test_filter_parameter_validation() {
        assert!(Person::validate_filter(PersonFilter::HasResult, &FilterParameter::default()).is_ok());
        assert!(matches!(
            Race::validate_filter(RaceFilter::Style, &"crawl".into()),
            Err(CoreError::InvalidFilterParameter { .. })
        ));
        assert!(PersonStart::validate_filter(PersonStartFilter::Style, &"Water Flea".into()).is_ok());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(PersonSort::parse("Result_Place"), Some(PersonSort::ResultPlace));
        assert_eq!(PersonSort::parse("lane"), None);
        assert_eq!(RaceSort::expected(), "number");
        assert_eq!(
            PersonStartFilter::expected(),
            "gender, style, competition-id, club"
        );
    }
}

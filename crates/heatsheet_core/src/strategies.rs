//! The predefined strategies, one per document kind.
//!
//! Each constructor reads its items from the shared [`CompetitionData`] and
//! its template path from the workspace configuration.

use std::sync::Arc;

use crate::config::WorkspaceConfig;
use crate::error::CoreResult;
use crate::model::{CompetitionData, Person, PersonStart, Race};
use crate::resolvers::{PersonResolver, PersonStartResolver, RaceResolver};
use crate::selection::{PersonSort, PersonStartSort, RaceSort};
use crate::strategy::{DocumentKind, ItemStrategy, StrategyBuilder};

fn persons(
    kind: DocumentKind,
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> StrategyBuilder<Person, PersonResolver> {
    let data = Arc::clone(data);
    StrategyBuilder::new(kind)
        .template(config.template_path(kind))
        .competition(&data.competition)
        .resolver(PersonResolver)
        .source(move || data.persons.clone())
}

fn starts(
    kind: DocumentKind,
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> StrategyBuilder<PersonStart, PersonStartResolver> {
    let data = Arc::clone(data);
    StrategyBuilder::new(kind)
        .template(config.template_path(kind))
        .competition(&data.competition)
        .resolver(PersonStartResolver)
        .source(move || data.all_starts())
}

/// One certificate page per person, best place first.
pub fn certificates(
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> CoreResult<ItemStrategy<Person, PersonResolver>> {
    persons(DocumentKind::Certificates, data, config)
        .sort(PersonSort::ResultPlace)
        .build()
}

/// All persons in one table, ordered by result place.
pub fn result_list(
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> CoreResult<ItemStrategy<Person, PersonResolver>> {
    persons(DocumentKind::ResultList, data, config)
        .sort(PersonSort::ResultPlace)
        .build()
}

/// All persons in one table, ordered by name.
pub fn participant_list(
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> CoreResult<ItemStrategy<Person, PersonResolver>> {
    persons(DocumentKind::ParticipantList, data, config)
        .sort(PersonSort::Name)
        .build()
}

/// One time form page per start, in race and lane order.
pub fn time_forms(
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> CoreResult<ItemStrategy<PersonStart, PersonStartResolver>> {
    starts(DocumentKind::TimeForms, data, config)
        .sort(PersonStartSort::Race)
        .build()
}

/// All starts in one table, in race and lane order.
pub fn start_list(
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> CoreResult<ItemStrategy<PersonStart, PersonStartResolver>> {
    starts(DocumentKind::StartList, data, config)
        .sort(PersonStartSort::Race)
        .build()
}

/// One race card page per race.
pub fn race_cards(
    data: &Arc<CompetitionData>,
    config: &WorkspaceConfig,
) -> CoreResult<ItemStrategy<Race, RaceResolver>> {
    let source = Arc::clone(data);
    StrategyBuilder::new(DocumentKind::RaceCards)
        .template(config.template_path(DocumentKind::RaceCards))
        .competition(&data.competition)
        .resolver(RaceResolver)
        .source(move || source.races.clone())
        .sort(RaceSort::Number)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormattingConfig;
    use crate::strategy::{DocumentStrategy, PageShape};
    use heatsheet_templates::{PlaceholderKey, SlotKey};

    #[test]
    fn test_shapes_and_templates() {
        let data = Arc::new(CompetitionData::sample());
        let config = WorkspaceConfig::default();

        let certificates = certificates(&data, &config).unwrap();
        assert_eq!(certificates.page_shape(), PageShape::OneItemPerPage);
        assert_eq!(
            certificates.template_path(),
            config.templates_path().join("certificates.docx")
        );

        let start_list = start_list(&data, &config).unwrap();
        assert_eq!(start_list.page_shape(), PageShape::AllItemsInOneTable);
        assert_eq!(start_list.item_count(), 3);
    }

    #[test]
    fn test_certificates_follow_result_place() {
        let data = Arc::new(CompetitionData::sample());
        let pages = certificates(&data, &WorkspaceConfig::default())
            .unwrap()
            .resolve_pages(&FormattingConfig::default());

        let places: Vec<&str> = pages
            .iter()
            .map(|p| p.get(&SlotKey::new(PlaceholderKey::ResultPlace)).unwrap())
            .collect();
        assert_eq!(places, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_race_cards() {
        let data = Arc::new(CompetitionData::sample());
        let strategy = race_cards(&data, &WorkspaceConfig::default()).unwrap();
        let pages = strategy.resolve_pages(&FormattingConfig::default());

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].get(&SlotKey::slotted(PlaceholderKey::Name, 1)), Some("Cleo Dorn"));
        assert_eq!(
            strategy.document_placeholders().get(&PlaceholderKey::CompetitionYear.into()),
            Some("2024")
        );
    }
}

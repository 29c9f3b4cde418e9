//! Document strategies bind a document kind to its template, items and resolver.
//!
//! # Overview
//!
//! A strategy answers every question the generator asks about a document:
//! which template to open, whether items go one per page or into one table,
//! which items to render (filtered and sorted on every call) and how to turn
//! them into placeholder values.
//!
//! [`DocumentStrategy`] is the object-safe view used by the generator and the
//! CLI. [`ItemStrategy`] is the typed implementation, binding an item shape
//! `T` to a resolver `R` at compile time.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use heatsheet_templates::{
    PlaceholderKey, SupportedKeys, TablePlaceholderMap, TextPlaceholderMap,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FormattingConfig;
use crate::error::{CoreError, CoreResult};
use crate::model::CompetitionInfo;
use crate::resolver::ItemResolver;
use crate::resolvers::{competition_values, COMPETITION_KEYS};

/// The documents heatsheet can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Certificates,
    ResultList,
    ParticipantList,
    TimeForms,
    StartList,
    RaceCards,
}

impl DocumentKind {
    pub fn all() -> &'static [DocumentKind] {
        &[
            DocumentKind::Certificates,
            DocumentKind::ResultList,
            DocumentKind::ParticipantList,
            DocumentKind::TimeForms,
            DocumentKind::StartList,
            DocumentKind::RaceCards,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certificates => "certificates",
            Self::ResultList => "result-list",
            Self::ParticipantList => "participant-list",
            Self::TimeForms => "time-forms",
            Self::StartList => "start-list",
            Self::RaceCards => "race-cards",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.to_lowercase().replace('_', "-");
        Self::all().iter().copied().find(|k| k.as_str() == normalized)
    }

    /// Template file name used when the configuration names none.
    pub fn default_template_file(&self) -> String {
        format!("{}.docx", self.as_str())
    }

    pub fn default_page_shape(&self) -> PageShape {
        match self {
            Self::Certificates | Self::TimeForms | Self::RaceCards => PageShape::OneItemPerPage,
            Self::ResultList | Self::ParticipantList | Self::StartList => {
                PageShape::AllItemsInOneTable
            }
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How items are laid out in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageShape {
    /// The template body is repeated once per item.
    OneItemPerPage,
    /// Every item becomes one row of the template's tables.
    AllItemsInOneTable,
}

impl PageShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneItemPerPage => "one-item-per-page",
            Self::AllItemsInOneTable => "all-items-in-one-table",
        }
    }
}

/// Opaque argument of a filter mode, interpreted by the item type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterParameter(String);

impl FilterParameter {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the parameter, reporting which filter rejected it.
    pub fn parse_with<T>(&self, filter: &str, parse: impl FnOnce(&str) -> Option<T>) -> CoreResult<T> {
        parse(self.0.trim()).ok_or_else(|| CoreError::InvalidFilterParameter {
            filter: filter.to_string(),
            value: self.0.clone(),
        })
    }
}

impl From<&str> for FilterParameter {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FilterParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named sort or filter mode.
pub trait StrategyMode: Copy + fmt::Debug + Send + Sync + 'static {
    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Case-insensitive lookup, accepting `_` for `-`.
    fn parse(s: &str) -> Option<Self> {
        let normalized = s.to_lowercase().replace('_', "-");
        Self::all().iter().copied().find(|m| m.as_str() == normalized)
    }

    /// Comma separated list of every mode name.
    fn expected() -> String {
        Self::all()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An item shape that can be ordered and filtered by a strategy.
pub trait StrategyItem: Clone + Send + Sync + 'static {
    type Sort: StrategyMode;
    type Filter: StrategyMode;

    /// Item name used in messages.
    const NAME: &'static str;

    fn compare(a: &Self, b: &Self, sort: Self::Sort) -> Ordering;

    fn matches(&self, filter: Self::Filter, parameter: &FilterParameter) -> bool;

    /// Reject parameters the filter can never match.
    fn validate_filter(_filter: Self::Filter, _parameter: &FilterParameter) -> CoreResult<()> {
        Ok(())
    }
}

/// Supplies the items of one shape. This is the seam to the data layer.
pub trait ItemSource<T>: Send + Sync {
    fn items(&self) -> Vec<T>;
}

impl<T, F> ItemSource<T> for F
where
    F: Fn() -> Vec<T> + Send + Sync,
{
    fn items(&self) -> Vec<T> {
        self()
    }
}

/// Sort and filter selection given by name, as typed on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub sort: Option<String>,
    pub filter: Option<(String, FilterParameter)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, mode: impl Into<String>) -> Self {
        self.sort = Some(mode.into());
        self
    }

    pub fn filter(mut self, mode: impl Into<String>, parameter: impl Into<FilterParameter>) -> Self {
        self.filter = Some((mode.into(), parameter.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sort.is_none() && self.filter.is_none()
    }
}

/// Object-safe view of a strategy.
pub trait DocumentStrategy: Send + Sync {
    fn kind(&self) -> DocumentKind;

    fn template_path(&self) -> &Path;

    fn page_shape(&self) -> PageShape;

    fn supports_text_placeholders(&self) -> bool {
        self.page_shape() == PageShape::OneItemPerPage
    }

    fn supports_table_placeholders(&self) -> bool {
        self.page_shape() == PageShape::AllItemsInOneTable
    }

    /// Resolver keys plus the injected document keys.
    fn supported_keys(&self) -> Vec<PlaceholderKey>;

    /// Keys filled per numbered slot.
    fn slotted_keys(&self) -> Vec<PlaceholderKey>;

    /// Plain and slotted keys together, as template validation checks them.
    fn placeholder_keys(&self) -> SupportedKeys {
        SupportedKeys::new(self.supported_keys()).with_slotted(self.slotted_keys())
    }

    /// Number of items after filtering.
    fn item_count(&self) -> usize;

    /// One map per page, in item order.
    fn resolve_pages(&self, config: &FormattingConfig) -> Vec<TextPlaceholderMap>;

    fn resolve_table(&self, config: &FormattingConfig) -> TablePlaceholderMap;

    /// Values shared by every page and the non-table text.
    fn document_placeholders(&self) -> TextPlaceholderMap;

    fn sort_modes(&self) -> Vec<&'static str>;

    fn filter_modes(&self) -> Vec<&'static str>;

    /// A copy of this strategy with the named sort and filter applied.
    fn with_selection(&self, selection: &Selection) -> CoreResult<Arc<dyn DocumentStrategy>>;
}

/// Typed strategy: items of shape `T` resolved by `R`.
pub struct ItemStrategy<T: StrategyItem, R> {
    kind: DocumentKind,
    template: PathBuf,
    shape: PageShape,
    source: Arc<dyn ItemSource<T>>,
    resolver: Arc<R>,
    sort: Option<T::Sort>,
    filter: Option<(T::Filter, FilterParameter)>,
    document_values: TextPlaceholderMap,
}

impl<T: StrategyItem, R> Clone for ItemStrategy<T, R> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            template: self.template.clone(),
            shape: self.shape,
            source: Arc::clone(&self.source),
            resolver: Arc::clone(&self.resolver),
            sort: self.sort,
            filter: self.filter.clone(),
            document_values: self.document_values.clone(),
        }
    }
}

impl<T, R> ItemStrategy<T, R>
where
    T: StrategyItem,
    R: ItemResolver<T> + 'static,
{
    pub fn builder(kind: DocumentKind) -> StrategyBuilder<T, R> {
        StrategyBuilder::new(kind)
    }

    /// Fetch, filter and sort the items. The source is never mutated.
    pub fn items(&self) -> Vec<T> {
        let mut items = self.source.items();
        if let Some((filter, parameter)) = &self.filter {
            items.retain(|item| item.matches(*filter, parameter));
        }
        if let Some(sort) = self.sort {
            items.sort_by(|a, b| T::compare(a, b, sort));
        }
        items
    }

    pub fn sort(&self) -> Option<T::Sort> {
        self.sort
    }

    pub fn filter(&self) -> Option<&(T::Filter, FilterParameter)> {
        self.filter.as_ref()
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn select(&self, selection: &Selection) -> CoreResult<Self> {
        let mut strategy = self.clone();

        if let Some(mode) = &selection.sort {
            let sort = T::Sort::parse(mode).ok_or_else(|| CoreError::InvalidSortMode {
                kind: self.kind.to_string(),
                mode: mode.clone(),
                expected: T::Sort::expected(),
            })?;
            strategy.sort = Some(sort);
        }

        if let Some((mode, parameter)) = &selection.filter {
            let filter = T::Filter::parse(mode).ok_or_else(|| CoreError::InvalidFilterMode {
                kind: self.kind.to_string(),
                mode: mode.clone(),
                expected: T::Filter::expected(),
            })?;
            T::validate_filter(filter, parameter)?;
            strategy.filter = Some((filter, parameter.clone()));
        }

        Ok(strategy)
    }
}

impl<T, R> DocumentStrategy for ItemStrategy<T, R>
where
    T: StrategyItem,
    R: ItemResolver<T> + 'static,
{
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn template_path(&self) -> &Path {
        &self.template
    }

    fn page_shape(&self) -> PageShape {
        self.shape
    }

    fn supported_keys(&self) -> Vec<PlaceholderKey> {
        let keys: BTreeSet<PlaceholderKey> = self
            .resolver
            .supported_keys()
            .iter()
            .chain(COMPETITION_KEYS)
            .copied()
            .collect();
        keys.into_iter().collect()
    }

    fn slotted_keys(&self) -> Vec<PlaceholderKey> {
        self.resolver.slotted_keys().to_vec()
    }

    fn item_count(&self) -> usize {
        self.items().len()
    }

    fn resolve_pages(&self, config: &FormattingConfig) -> Vec<TextPlaceholderMap> {
        let pages: Vec<TextPlaceholderMap> = self
            .items()
            .iter()
            .map(|item| self.resolver.resolve_text(item, config))
            .collect();
        debug!("Resolved {} page(s) for {}", pages.len(), self.kind);
        pages
    }

    fn resolve_table(&self, config: &FormattingConfig) -> TablePlaceholderMap {
        let items = self.items();
        debug!("Resolving {} row(s) for {}", items.len(), self.kind);
        self.resolver.resolve_table(&items, config)
    }

    fn document_placeholders(&self) -> TextPlaceholderMap {
        self.document_values.clone()
    }

    fn sort_modes(&self) -> Vec<&'static str> {
        T::Sort::all().iter().map(|m| m.as_str()).collect()
    }

    fn filter_modes(&self) -> Vec<&'static str> {
        T::Filter::all().iter().map(|m| m.as_str()).collect()
    }

    fn with_selection(&self, selection: &Selection) -> CoreResult<Arc<dyn DocumentStrategy>> {
        Ok(Arc::new(self.select(selection)?))
    }
}

impl<T: StrategyItem, R> fmt::Debug for ItemStrategy<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemStrategy")
            .field("kind", &self.kind)
            .field("item", &T::NAME)
            .field("template", &self.template)
            .field("shape", &self.shape)
            .field("sort", &self.sort)
            .field("filter", &self.filter)
            .finish()
    }
}

/// Builder for [`ItemStrategy`].
pub struct StrategyBuilder<T: StrategyItem, R> {
    kind: DocumentKind,
    template: Option<PathBuf>,
    shape: PageShape,
    source: Option<Arc<dyn ItemSource<T>>>,
    resolver: Option<Arc<R>>,
    sort: Option<T::Sort>,
    filter: Option<(T::Filter, FilterParameter)>,
    document_values: TextPlaceholderMap,
}

impl<T, R> StrategyBuilder<T, R>
where
    T: StrategyItem,
    R: ItemResolver<T> + 'static,
{
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            template: None,
            shape: kind.default_page_shape(),
            source: None,
            resolver: None,
            sort: None,
            filter: None,
            document_values: competition_values(&CompetitionInfo::default()),
        }
    }

    pub fn template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    pub fn page_shape(mut self, shape: PageShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn source(mut self, source: impl ItemSource<T> + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn resolver(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn sort(mut self, sort: T::Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn filter(mut self, filter: T::Filter, parameter: impl Into<FilterParameter>) -> Self {
        self.filter = Some((filter, parameter.into()));
        self
    }

    /// Inject the competition header into every page.
    pub fn competition(mut self, info: &CompetitionInfo) -> Self {
        self.document_values = competition_values(info);
        self
    }

    pub fn build(self) -> CoreResult<ItemStrategy<T, R>> {
        let resolver = self
            .resolver
            .ok_or_else(|| CoreError::MissingResolver(self.kind.to_string()))?;
        let source = self
            .source
            .ok_or_else(|| CoreError::MissingItemSource(self.kind.to_string()))?;
        if let Some((filter, parameter)) = &self.filter {
            T::validate_filter(*filter, parameter)?;
        }

        Ok(ItemStrategy {
            kind: self.kind,
            template: self
                .template
                .unwrap_or_else(|| PathBuf::from(self.kind.default_template_file())),
            shape: self.shape,
            source,
            resolver,
            sort: self.sort,
            filter: self.filter,
            document_values: self.document_values,
        })
    }
}

//! Placeholder substitution over `.docx` packages.
//!
//! The engine knows nothing about the items being rendered: it receives
//! ready-made [`TextPlaceholderMap`]s and [`TablePlaceholderMap`]s and a
//! shared [`PlaceholderRegistry`] for token lookup.

use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::{DocxPackage, DOCUMENT_PART};
use crate::error::{TemplateError, TemplateResult};
use crate::maps::{TablePlaceholderMap, TextPlaceholderMap};
use crate::placeholders::{PlaceholderRegistry, SlotKey, ROW_INDEX_TOKEN};
use crate::wordml::{self, PAGE_BREAK_PARAGRAPH};

/// Default placeholder marker.
pub const DEFAULT_MARKER: &str = "%";

/// What to do with a token that cannot be filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPlaceholderPolicy {
    /// Leave the literal token in the output.
    #[default]
    Keep,
    /// Remove the token.
    Blank,
}

impl UnknownPlaceholderPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Blank => "blank",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keep" => Some(Self::Keep),
            "blank" => Some(Self::Blank),
            _ => None,
        }
    }
}

/// Options controlling token syntax and fallback behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOptions {
    pub marker: String,
    pub unknown_policy: UnknownPlaceholderPolicy,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstitutionOptions {
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            unknown_policy: UnknownPlaceholderPolicy::default(),
        }
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn unknown_policy(mut self, policy: UnknownPlaceholderPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    /// Reject markers that could be confused with token text.
    ///
    /// A marker may not contain whitespace or any character allowed inside a
    /// token (letters, digits, `_`, `.`, `-`).
    pub fn validate(&self) -> TemplateResult<()> {
        if self.marker.is_empty()
            || self.marker.chars().any(|c| {
                c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '.' | '-')
            })
        {
            return Err(TemplateError::InvalidMarker(self.marker.clone()));
        }
        Ok(())
    }
}

/// One token occurrence found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateToken {
    /// Package part the token was found in.
    pub part: String,
    /// Token text between the markers.
    pub literal: String,
    /// Canonical slot key, if the token is a known alias.
    pub resolved: Option<SlotKey>,
    /// Whether the token is the built-in row index.
    pub row_index: bool,
    /// Whether the token sits inside a table.
    pub in_table: bool,
}

/// Summary of a table render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableFill {
    pub tables_modified: usize,
    pub rows_inserted: usize,
    pub substitutions: usize,
}

/// Template substitution engine.
pub struct SubstitutionEngine {
    registry: Arc<PlaceholderRegistry>,
    options: SubstitutionOptions,
    token_pattern: Regex,
}

impl SubstitutionEngine {
    /// Create an engine, validating the marker.
    pub fn new(registry: Arc<PlaceholderRegistry>, options: SubstitutionOptions) -> TemplateResult<Self> {
        options.validate()?;
        let pattern = format!(
            r"{m}(\p{{L}}[\p{{L}}\p{{N}}_.\-]{{0,63}}){m}",
            m = regex::escape(&options.marker)
        );
        let token_pattern =
            Regex::new(&pattern).map_err(|_| TemplateError::InvalidMarker(options.marker.clone()))?;

        Ok(Self {
            registry,
            options,
            token_pattern,
        })
    }

    pub fn registry(&self) -> &PlaceholderRegistry {
        &self.registry
    }

    pub fn options(&self) -> &SubstitutionOptions {
        &self.options
    }

    /// Render a token the way a template author writes it.
    pub fn placeholder(&self, token: &str) -> String {
        format!("{m}{}{m}", token, m = self.options.marker)
    }

    /// Text mode: substitute `values` in the document, headers and footers.
    ///
    /// Returns `true` when at least one token was replaced.
    pub fn render_text(
        &self,
        template: &Path,
        output: &Path,
        values: &TextPlaceholderMap,
    ) -> TemplateResult<bool> {
        let mut package = DocxPackage::open(template)?;
        let count = self.apply_text(&mut package, values)?;
        package.save(output)?;

        info!(
            "Rendered {:?} to {:?} ({} substitutions)",
            template, output, count
        );
        Ok(count > 0)
    }

    /// Render one copy of the template body per page map, separated by page breaks.
    pub fn render_pages(
        &self,
        template: &Path,
        output: &Path,
        pages: &[TextPlaceholderMap],
        document_values: &TextPlaceholderMap,
    ) -> TemplateResult<bool> {
        let mut package = DocxPackage::open(template)?;
        let count = self.apply_pages(&mut package, pages, document_values)?;
        package.save(output)?;

        info!(
            "Rendered {} page(s) from {:?} to {:?}",
            pages.len(),
            template,
            output
        );
        Ok(count > 0)
    }

    /// Table mode: duplicate the pattern row of each table once per item.
    ///
    /// Returns `true` when at least one table was modified.
    pub fn render_table(
        &self,
        template: &Path,
        output: &Path,
        table: &TablePlaceholderMap,
        document_values: &TextPlaceholderMap,
    ) -> TemplateResult<bool> {
        let mut package = DocxPackage::open(template)?;
        let fill = self.apply_table(&mut package, table, document_values)?;
        package.save(output)?;

        info!(
            "Rendered {} row(s) into {} table(s) from {:?} to {:?}",
            fill.rows_inserted, fill.tables_modified, template, output
        );
        Ok(fill.tables_modified > 0)
    }

    /// Text mode on an open package. Returns the number of replacements.
    pub fn apply_text(
        &self,
        package: &mut DocxPackage,
        values: &TextPlaceholderMap,
    ) -> TemplateResult<usize> {
        let mut total = 0;
        for part in package.text_parts() {
            let xml = package.part_text(&part)?.to_string();
            let (rendered, count) = self.substitute_text(&xml, values);
            debug!("{}: {} substitutions", part, count);
            if count > 0 {
                package.set_part_text(&part, rendered);
            }
            total += count;
        }
        Ok(total)
    }

    /// Pages mode on an open package. Returns the number of replacements.
    pub fn apply_pages(
        &self,
        package: &mut DocxPackage,
        pages: &[TextPlaceholderMap],
        document_values: &TextPlaceholderMap,
    ) -> TemplateResult<usize> {
        let xml = package.part_text(DOCUMENT_PART)?.to_string();
        let split = wordml::split_body(&xml, DOCUMENT_PART)?;

        let mut body = String::new();
        let mut total = 0;
        for (index, page) in pages.iter().enumerate() {
            if index > 0 {
                body.push_str(PAGE_BREAK_PARAGRAPH);
            }
            let mut values = document_values.clone();
            values.extend(page);
            let (content, count) = self.substitute_text(split.content, &values);
            debug!("Page {}: {} substitutions", index + 1, count);
            body.push_str(&content);
            total += count;
        }

        let document = format!("{}{}{}{}", split.head, body, split.section, split.tail);
        package.set_part_text(DOCUMENT_PART, document);

        for part in package.header_footer_parts() {
            let xml = package.part_text(&part)?.to_string();
            let (rendered, count) = self.substitute_text(&xml, document_values);
            if count > 0 {
                package.set_part_text(&part, rendered);
            }
            total += count;
        }

        Ok(total)
    }

    /// Table mode on an open package.
    pub fn apply_table(
        &self,
        package: &mut DocxPackage,
        table: &TablePlaceholderMap,
        document_values: &TextPlaceholderMap,
    ) -> TemplateResult<TableFill> {
        let mut fill = TableFill::default();

        for part in package.text_parts() {
            let xml = package.part_text(&part)?.to_string();
            let mut filled = xml.clone();

            for range in wordml::top_level_tables(&xml, &part)?.into_iter().rev() {
                let table_xml = &xml[range.clone()];
                match self.fill_table(table_xml, &part, table, document_values, &mut fill)? {
                    Some(rendered) => filled.replace_range(range, &rendered),
                    None => warn!("Skipping table in {} without table placeholders", part),
                }
            }

            let (rendered, count) = self.substitute_text(&filled, document_values);
            fill.substitutions += count;
            if rendered != xml {
                package.set_part_text(&part, rendered);
            }
        }

        Ok(fill)
    }

    /// Fill one table, innermost tables first.
    ///
    /// A row qualifies as the pattern only through its own tokens; tokens of a
    /// nested table belong to that table. Returns `None` when neither the table
    /// nor anything nested in it had a pattern row.
    fn fill_table(
        &self,
        table_xml: &str,
        part: &str,
        table: &TablePlaceholderMap,
        document_values: &TextPlaceholderMap,
        fill: &mut TableFill,
    ) -> TemplateResult<Option<String>> {
        let mut xml = table_xml.to_string();
        let mut nested_modified = false;
        for range in wordml::child_tables(table_xml, part)?.into_iter().rev() {
            let child = &table_xml[range.clone()];
            if let Some(rendered) = self.fill_table(child, part, table, document_values, fill)? {
                xml.replace_range(range, &rendered);
                nested_modified = true;
            }
        }

        let mut pattern = None;
        for row in wordml::table_rows(&xml, part)? {
            let own_xml = wordml::strip_tables(&xml[row.clone()], part)?;
            if self.row_slots(&own_xml).iter().any(|s| table.contains(s)) {
                pattern = Some(row);
                break;
            }
        }
        let Some(pattern) = pattern else {
            return Ok(nested_modified.then_some(xml));
        };

        let pattern_xml = &xml[pattern.clone()];
        let row_count = table.row_count();
        let mut generated = String::new();

        for index in 0..row_count {
            let (row, _) = wordml::substitute_tokens(pattern_xml, &self.token_pattern, |token| {
                if token.eq_ignore_ascii_case(ROW_INDEX_TOKEN) {
                    return Some((index + 1).to_string());
                }
                let value = self.registry.resolve_slot_token(token).and_then(|slot| {
                    table
                        .value_at(&slot, index)
                        .or_else(|| document_values.get(&slot))
                });
                self.apply_policy(token, value)
            });
            generated.push_str(&row);
        }

        debug!("Generated {} row(s) in {}", row_count, part);
        fill.tables_modified += 1;
        fill.rows_inserted += row_count;
        let rendered = format!("{}{}{}", &xml[..pattern.start], generated, &xml[pattern.end..]);
        Ok(Some(rendered))
    }

    /// List every token occurrence in the package.
    pub fn scan_tokens(&self, package: &DocxPackage) -> TemplateResult<Vec<TemplateToken>> {
        let mut tokens = Vec::new();

        for part in package.text_parts() {
            let xml = package.part_text(&part)?;
            let tables = wordml::top_level_tables(xml, &part)?;

            for paragraph in wordml::paragraph_texts(xml) {
                let offset = paragraph.xml_offset();
                let in_table = tables.iter().any(|t| t.contains(&offset));
                for caps in self.token_pattern.captures_iter(&paragraph.text) {
                    let Some(literal) = caps.get(1).map(|m| m.as_str().to_string()) else {
                        continue;
                    };
                    tokens.push(TemplateToken {
                        part: part.clone(),
                        resolved: self.registry.resolve_slot_token(&literal),
                        row_index: literal.eq_ignore_ascii_case(ROW_INDEX_TOKEN),
                        literal,
                        in_table,
                    });
                }
            }
        }

        Ok(tokens)
    }

    /// Open a template and list its tokens.
    pub fn scan_template(&self, template: &Path) -> TemplateResult<Vec<TemplateToken>> {
        let package = DocxPackage::open(template)?;
        self.scan_tokens(&package)
    }

    /// Substitute text placeholders in one XML part.
    pub fn substitute_text(&self, xml: &str, values: &TextPlaceholderMap) -> (String, usize) {
        wordml::substitute_tokens(xml, &self.token_pattern, |token| {
            let value = self
                .registry
                .resolve_slot_token(token)
                .and_then(|slot| values.get(&slot));
            self.apply_policy(token, value)
        })
    }

    fn row_slots(&self, row_xml: &str) -> Vec<SlotKey> {
        wordml::paragraph_texts(row_xml)
            .iter()
            .flat_map(|p| {
                self.token_pattern
                    .captures_iter(&p.text)
                    .filter_map(|caps| caps.get(1))
                    .filter_map(|m| self.registry.resolve_slot_token(m.as_str()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn apply_policy(&self, token: &str, value: Option<&str>) -> Option<String> {
        match value {
            Some(value) => Some(value.to_string()),
            None => {
                debug!("No value for placeholder {}", self.placeholder(token));
                match self.options.unknown_policy {
                    UnknownPlaceholderPolicy::Keep => None,
                    UnknownPlaceholderPolicy::Blank => Some(String::new()),
                }
            }
        }
    }
}

impl std::fmt::Debug for SubstitutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionEngine")
            .field("marker", &self.options.marker)
            .field("unknown_policy", &self.options.unknown_policy)
            .field("aliases", &self.registry.alias_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::document_xml_from_body;
    use crate::maps::EMPTY_VALUE;
    use crate::placeholders::PlaceholderKey;
    use tempfile::tempdir;

    fn engine(policy: UnknownPlaceholderPolicy) -> SubstitutionEngine {
        let registry = Arc::new(PlaceholderRegistry::with_defaults().unwrap());
        SubstitutionEngine::new(registry, SubstitutionOptions::new().unknown_policy(policy)).unwrap()
    }

    fn para(text: &str) -> String {
        format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
    }

    fn row(cells: &[&str]) -> String {
        let cells: String = cells
            .iter()
            .map(|c| format!("<w:tc>{}</w:tc>", para(c)))
            .collect();
        format!("<w:tr>{}</w:tr>", cells)
    }

    fn table(rows: &[String]) -> String {
        format!("<w:tbl><w:tblPr/>{}</w:tbl>", rows.concat())
    }

    fn package(body: &str) -> DocxPackage {
        DocxPackage::from_document_xml(&document_xml_from_body(body))
    }

    fn texts(package: &DocxPackage) -> Vec<String> {
        wordml::paragraph_texts(package.part_text(DOCUMENT_PART).unwrap())
            .into_iter()
            .map(|p| p.text)
            .collect()
    }

    fn person(name: &str, year: &str) -> TextPlaceholderMap {
        TextPlaceholderMap::new()
            .with(PlaceholderKey::Name, name)
            .with(PlaceholderKey::BirthYear, year)
    }

    #[test]
    fn test_marker_validation() {
        assert!(SubstitutionOptions::new().validate().is_ok());
        assert!(SubstitutionOptions::new().marker("$$").validate().is_ok());
        for bad in ["", "a", "%1", " % ", "-", "_", ".", "%-", "#."] {
            assert!(matches!(
                SubstitutionOptions::new().marker(bad).validate(),
                Err(TemplateError::InvalidMarker(_))
            ));
        }
    }

    #[test]
    fn test_text_mode_aliases_resolve_to_same_value() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut doc = package(&para("%BirthYear% %Jahrgang% %jg%"));
        let count = engine.apply_text(&mut doc, &person("Anna", "2010")).unwrap();

        assert_eq!(count, 3);
        assert_eq!(texts(&doc), vec!["2010 2010 2010"]);
    }

    #[test]
    fn test_pages_scenario() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut doc = package(&para("%Name%, %BirthYear%"));
        let pages = vec![person("Anna", "2010"), person("Ben", "2011")];

        engine
            .apply_pages(&mut doc, &pages, &TextPlaceholderMap::new())
            .unwrap();

        let xml = doc.part_text(DOCUMENT_PART).unwrap();
        assert_eq!(xml.matches(PAGE_BREAK_PARAGRAPH).count(), 1);
        assert_eq!(xml.matches("<w:sectPr>").count(), 1);
        assert_eq!(texts(&doc), vec!["Anna, 2010", "Ben, 2011"]);
    }

    #[test]
    fn test_pages_use_document_values_as_fallback() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut doc = package(&para("%Name% @ %Event%"));
        let document = TextPlaceholderMap::new().with(PlaceholderKey::CompetitionName, "Spring Cup");

        engine
            .apply_pages(&mut doc, &[person("Anna", "2010")], &document)
            .unwrap();
        assert_eq!(texts(&doc), vec!["Anna @ Spring Cup"]);
    }

    #[test]
    fn test_table_scenario() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let body = table(&[
            row(&["Nr", "Name"]),
            row(&["%ID%", "%Name%"]),
            row(&["Total", "%Event%"]),
        ]);
        let mut doc = package(&body);
        let items = [person("Anna", "2010"), person("Ben", "2011"), person("Cleo", "2012")];
        let table_map = TablePlaceholderMap::from_text_maps(&items);
        let document = TextPlaceholderMap::new().with(PlaceholderKey::CompetitionName, "Cup");

        let fill = engine.apply_table(&mut doc, &table_map, &document).unwrap();

        assert_eq!(fill.tables_modified, 1);
        assert_eq!(fill.rows_inserted, 3);
        assert_eq!(doc.part_text(DOCUMENT_PART).unwrap().matches("<w:tr>").count(), 5);
        assert_eq!(
            texts(&doc),
            vec!["Nr", "Name", "1", "Anna", "2", "Ben", "3", "Cleo", "Total", "Cup"]
        );
    }

    #[test]
    fn test_table_position_independent() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let items = [person("Anna", "2010"), person("Ben", "2011")];
        let table_map = TablePlaceholderMap::from_text_maps(&items);
        let grid = table(&[row(&["%Name%", "%JG%"])]);

        for body in [
            grid.clone(),
            format!("{}{}", para("Heading"), grid),
            format!("{}{}{}", para("a"), grid, para("b")),
        ] {
            let mut doc = package(&body);
            let fill = engine
                .apply_table(&mut doc, &table_map, &TextPlaceholderMap::new())
                .unwrap();
            assert_eq!(fill.rows_inserted, 2);
            let xml = doc.part_text(DOCUMENT_PART).unwrap();
            assert_eq!(xml.matches("<w:tr>").count(), 2);
            assert!(!xml.contains("%Name%"));
        }
    }

    #[test]
    fn test_nested_data_table_keeps_layout() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let data = table(&[row(&["Name"]), row(&["%ID% %Name%"])]);
        let layout = table(&[
            row(&["%CompetitionName%"]),
            format!("<w:tr><w:tc>{}<w:p/></w:tc></w:tr>", data),
        ]);
        let mut doc = package(&layout);
        let items = [person("Anna", "2010"), person("Ben", "2011"), person("Cleo", "2012")];
        let table_map = TablePlaceholderMap::from_text_maps(&items);
        let document = TextPlaceholderMap::new().with(PlaceholderKey::CompetitionName, "Cup");

        let fill = engine.apply_table(&mut doc, &table_map, &document).unwrap();

        assert_eq!(fill.tables_modified, 1);
        assert_eq!(fill.rows_inserted, 3);
        assert_eq!(texts(&doc), vec!["Cup", "Name", "1 Anna", "2 Ben", "3 Cleo"]);
        assert_eq!(doc.part_text(DOCUMENT_PART).unwrap().matches("<w:tr>").count(), 6);
    }

    #[test]
    fn test_table_without_items_drops_pattern_row() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut table_map = TablePlaceholderMap::new();
        table_map.insert(PlaceholderKey::Name, Vec::new());
        let mut doc = package(&table(&[row(&["Name"]), row(&["%Name%"])]));

        let fill = engine
            .apply_table(&mut doc, &table_map, &TextPlaceholderMap::new())
            .unwrap();
        assert_eq!(fill.rows_inserted, 0);
        assert_eq!(texts(&doc), vec!["Name"]);
    }

    #[test]
    fn test_table_without_pattern_is_untouched() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let layout = table(&[row(&["%Event%"])]);
        let mut doc = package(&layout);
        let table_map = TablePlaceholderMap::from_text_maps(&[person("Anna", "2010")]);

        let fill = engine
            .apply_table(&mut doc, &table_map, &TextPlaceholderMap::new())
            .unwrap();
        assert_eq!(fill.tables_modified, 0);
        assert_eq!(texts(&doc), vec!["%Event%"]);
    }

    #[test]
    fn test_short_column_renders_empty_sentinel() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut table_map = TablePlaceholderMap::new();
        table_map.insert(PlaceholderKey::Name, vec!["Anna".into(), "Ben".into()]);
        table_map.insert(PlaceholderKey::Time, vec!["1:02,50".into()]);
        let mut doc = package(&table(&[row(&["%Name%", "%Time%"])]));

        engine
            .apply_table(&mut doc, &table_map, &TextPlaceholderMap::new())
            .unwrap();
        assert_eq!(texts(&doc), vec!["Anna", "1:02,50", "Ben", EMPTY_VALUE]);
    }

    #[test]
    fn test_unknown_token_kept() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut doc = package(&para("Hello %Unknown% %Club%"));
        let count = engine.apply_text(&mut doc, &person("Anna", "2010")).unwrap();

        assert_eq!(count, 0);
        assert_eq!(texts(&doc), vec!["Hello %Unknown% %Club%"]);
    }

    #[test]
    fn test_blank_policy_removes_every_token() {
        let engine = engine(UnknownPlaceholderPolicy::Blank);
        let mut doc = package(&para("[%Unknown%][%Club%][%Name%]"));
        engine.apply_text(&mut doc, &person("Anna", "2010")).unwrap();

        assert_eq!(texts(&doc), vec!["[][][Anna]"]);
        let tokens = engine.scan_tokens(&doc).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_split_run_token() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let body = concat!(
            "<w:p><w:r><w:t>Dear %Na</w:t></w:r>",
            "<w:r><w:rPr><w:i/></w:rPr><w:t>me</w:t></w:r>",
            "<w:r><w:t>%,</w:t></w:r></w:p>"
        );
        let mut doc = package(body);
        engine.apply_text(&mut doc, &person("Anna", "2010")).unwrap();

        let xml = doc.part_text(DOCUMENT_PART).unwrap();
        assert_eq!(texts(&doc), vec!["Dear Anna,"]);
        assert!(xml.contains("<w:i/>"));
    }

    #[test]
    fn test_slot_tokens() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let mut doc = package(&para("%Name1% / %Name2% / %Bahn2%"));
        let values = TextPlaceholderMap::new()
            .with(SlotKey::slotted(PlaceholderKey::Name, 1), "Anna")
            .with(SlotKey::slotted(PlaceholderKey::Name, 2), "Ben")
            .with(SlotKey::slotted(PlaceholderKey::Lane, 2), "4");

        engine.apply_text(&mut doc, &values).unwrap();
        assert_eq!(texts(&doc), vec!["Anna / Ben / 4"]);
    }

    #[test]
    fn test_scan_tokens() {
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let body = format!("{}{}", para("%Event% %Nope%"), table(&[row(&["%ID%", "%Name3%"])]));
        let tokens = engine.scan_tokens(&package(&body)).unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].resolved, Some(SlotKey::new(PlaceholderKey::CompetitionName)));
        assert!(!tokens[0].in_table);
        assert_eq!(tokens[1].resolved, None);
        assert!(tokens[2].row_index && tokens[2].in_table);
        assert_eq!(tokens[3].resolved, Some(SlotKey::slotted(PlaceholderKey::Name, 3)));
    }

    #[test]
    fn test_custom_marker() {
        let registry = Arc::new(PlaceholderRegistry::with_defaults().unwrap());
        let engine =
            SubstitutionEngine::new(registry, SubstitutionOptions::new().marker("{{")).unwrap();
        let mut doc = package(&para("{{Name{{ and %Name%"));

        engine.apply_text(&mut doc, &person("Anna", "2010")).unwrap();
        assert_eq!(texts(&doc), vec!["Anna and %Name%"]);
    }

    #[test]
    fn test_render_files_and_determinism() {
        let temp = tempdir().unwrap();
        let template = temp.path().join("template.docx");
        package(&para("%Name%")).save(&template).unwrap();
        let before = std::fs::read(&template).unwrap();

        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let first = temp.path().join("first.docx");
        let second = temp.path().join("second.docx");
        assert!(engine.render_text(&template, &first, &person("Anna", "2010")).unwrap());
        assert!(engine.render_text(&template, &second, &person("Anna", "2010")).unwrap());

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
        assert_eq!(std::fs::read(&template).unwrap(), before);
    }

    #[test]
    fn test_render_missing_template() {
        let temp = tempdir().unwrap();
        let engine = engine(UnknownPlaceholderPolicy::Keep);
        let result = engine.render_text(
            &temp.path().join("missing.docx"),
            &temp.path().join("out.docx"),
            &TextPlaceholderMap::new(),
        );
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}

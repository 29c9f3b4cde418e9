//! Starter templates written by `heatsheet init`.

use std::fs;
use std::path::{Path, PathBuf};

use heatsheet_templates::document::document_xml_from_body;
use heatsheet_templates::wordml::escape_text;
use heatsheet_templates::{DocxPackage, ROW_INDEX_TOKEN};
use tracing::{debug, info};

use crate::config::FormattingConfig;
use crate::error::CoreResult;
use crate::strategy::DocumentKind;

struct SampleWriter<'a> {
    marker: &'a str,
    body: String,
}

impl<'a> SampleWriter<'a> {
    fn new(marker: &'a str) -> Self {
        Self {
            marker,
            body: String::new(),
        }
    }

    /// Expand `{Token}` into the marker syntax.
    fn tokens(&self, text: &str) -> String {
        let mut expanded = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '{' | '}' => expanded.push_str(self.marker),
                _ => expanded.push(c),
            }
        }
        expanded
    }

    fn heading(mut self, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="36"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_text(&self.tokens(text))
        ));
        self
    }

    fn paragraph(mut self, text: &str) -> Self {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            escape_text(&self.tokens(text))
        ));
        self
    }

    fn table(mut self, header: &[&str], rows: &[Vec<String>]) -> Self {
        let cell = |text: &str| {
            format!(
                r#"<w:tc><w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:tc>"#,
                escape_text(text)
            )
        };
        self.body.push_str(
            r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#,
        );
        self.body.push_str("<w:tr>");
        for title in header {
            self.body.push_str(&cell(title));
        }
        self.body.push_str("</w:tr>");
        for row in rows {
            self.body.push_str("<w:tr>");
            for text in row {
                self.body.push_str(&cell(&self.tokens(text)));
            }
            self.body.push_str("</w:tr>");
        }
        self.body.push_str("</w:tbl>");
        self
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn finish(self) -> DocxPackage {
        DocxPackage::from_document_xml(&document_xml_from_body(&self.body))
    }
}

/// Build the starter template for a document kind.
pub fn sample_package(kind: DocumentKind, marker: &str, formatting: &FormattingConfig) -> DocxPackage {
    let writer = SampleWriter::new(marker);
    let id = format!("{{{}}}", ROW_INDEX_TOKEN);

    let writer = match kind {
        DocumentKind::Certificates => writer
            .heading("Certificate")
            .paragraph("{CompetitionName} {CompetitionYear}")
            .paragraph("{Name}")
            .paragraph("{Club}")
            .paragraph("reached place {ResultPlace} with {Score} points.")
            .paragraph("{CompetitionLocation}, {CompetitionDate}"),
        DocumentKind::ResultList => writer
            .heading("Results {CompetitionName}")
            .paragraph("{CompetitionLocation}, {CompetitionDate}")
            .table(
                &["Place", "Name", "Birth year", "Club", "Score"],
                &[SampleWriter::row(&["{ResultPlace}", "{Name}", "{BirthYear}", "{Club}", "{Score}"])],
            ),
        DocumentKind::ParticipantList => writer
            .heading("Participants {CompetitionName}")
            .table(
                &["No.", "Name", "Birth year", "Gender", "Club"],
                &[SampleWriter::row(&[id.as_str(), "{Name}", "{BirthYear}", "{Gender}", "{Club}"])],
            ),
        DocumentKind::TimeForms => writer
            .heading("Time form")
            .paragraph("Race {RaceNumber}, lane {Lane}")
            .paragraph("{Name} ({BirthYear}), {Club}")
            .paragraph("{Distance} {Style}")
            .paragraph("Time: ____________________"),
        DocumentKind::StartList => writer
            .heading("Start list {CompetitionName}")
            .table(
                &["Race", "Lane", "Name", "Club", "Style", "Distance"],
                &[SampleWriter::row(&[
                    "{RaceNumber}",
                    "{Lane}",
                    "{Name}",
                    "{Club}",
                    "{Style}",
                    "{Distance}",
                ])],
            ),
        DocumentKind::RaceCards => {
            let rows: Vec<Vec<String>> = (1..=formatting.race_slots)
                .map(|slot| {
                    ["Lane", "Name", "Club", "Time"]
                        .iter()
                        .map(|key| format!("{{{}{}}}", key, slot))
                        .collect()
                })
                .collect();
            writer
                .heading("Race {RaceNumber}")
                .paragraph("{Distance} {Style}")
                .table(&["Lane", "Name", "Club", "Time"], &rows)
        }
    };
    writer.finish()
}

/// Write one starter template per kind into `dir`.
///
/// Existing files are kept unless `overwrite` is set. Returns the files written.
pub fn write_samples(
    dir: &Path,
    marker: &str,
    formatting: &FormattingConfig,
    overwrite: bool,
) -> CoreResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for kind in DocumentKind::all() {
        let path = dir.join(kind.default_template_file());
        if path.exists() && !overwrite {
            debug!("Keeping existing template {:?}", path);
            continue;
        }
        sample_package(*kind, marker, formatting).save(&path)?;
        written.push(path);
    }

    info!("Wrote {} sample template(s) to {:?}", written.len(), dir);
    Ok(written)
}

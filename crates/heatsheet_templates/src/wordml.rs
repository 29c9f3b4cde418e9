//! Low-level WordprocessingML text helpers.
//!
//! Word splits paragraph text into runs whenever formatting, spell-check
//! state or revision marks change, so a placeholder like `%Name%` can end up
//! spread over several `<w:t>` elements. These helpers work on the
//! concatenated text of each paragraph and map edits back onto the runs.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{TemplateError, TemplateResult};

/// Paragraph holding a single page break.
pub const PAGE_BREAK_PARAGRAPH: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

const PARAGRAPH_CLOSE: &str = "</w:p>";

fn text_element_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(.*?)</w:t>")
            .expect("text element pattern is valid")
    })
}

fn table_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<w:tbl(?:\s[^>]*)?>|</w:tbl>").expect("table tag pattern is valid")
    })
}

fn row_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<w:tr(?:\s[^>]*)?>|</w:tr>|<w:tbl(?:\s[^>]*)?>|</w:tbl>")
            .expect("row tag pattern is valid")
    })
}

fn body_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<w:body(?:\s[^>]*)?>").expect("body pattern is valid"))
}

fn section_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<w:sectPr(?:\s[^>]*)?>").expect("section pattern is valid")
    })
}

/// Decode the predefined XML entities and numeric character references.
pub fn unescape_text(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .map(|hex| u32::from_str_radix(hex, 16).ok())
                .unwrap_or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for use as element content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<w:t>` element.
#[derive(Debug, Clone)]
struct TextElement {
    span: Range<usize>,
    text: String,
}

/// The `<w:t>` elements of one paragraph and their concatenated text.
#[derive(Debug, Clone)]
pub struct ParagraphText {
    elements: Vec<TextElement>,
    pub text: String,
}

impl ParagraphText {
    /// Byte offset in the XML where this paragraph's first text element starts.
    pub fn xml_offset(&self) -> usize {
        self.elements.first().map_or(0, |e| e.span.start)
    }
}

/// Group every `<w:t>` element of `xml` by the paragraph that contains it.
pub fn paragraph_texts(xml: &str) -> Vec<ParagraphText> {
    let closes: Vec<usize> = xml
        .match_indices(PARAGRAPH_CLOSE)
        .map(|(idx, _)| idx)
        .collect();

    let mut paragraphs: Vec<(usize, ParagraphText)> = Vec::new();
    for caps in text_element_pattern().captures_iter(xml) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let text = caps
            .get(1)
            .map(|m| unescape_text(m.as_str()))
            .unwrap_or_default();
        let group = closes.partition_point(|&close| close < whole.start());
        let element = TextElement {
            span: whole.range(),
            text,
        };

        match paragraphs.last_mut() {
            Some((last_group, paragraph)) if *last_group == group => {
                paragraph.text.push_str(&element.text);
                paragraph.elements.push(element);
            }
            _ => paragraphs.push((
                group,
                ParagraphText {
                    text: element.text.clone(),
                    elements: vec![element],
                },
            )),
        }
    }

    paragraphs.into_iter().map(|(_, p)| p).collect()
}

/// Replace every token match in `xml` for which `resolve` yields a value.
///
/// `pattern` must capture the token name in group 1. Returns the rewritten
/// XML and the number of replacements made. Text elements whose content is
/// unchanged are copied byte for byte.
pub fn substitute_tokens<F>(xml: &str, pattern: &Regex, mut resolve: F) -> (String, usize)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut count = 0;

    for paragraph in paragraph_texts(xml) {
        let concat = &paragraph.text;
        let mut records: Vec<(usize, usize, String)> = Vec::new();
        for caps in pattern.captures_iter(concat) {
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(replacement) = resolve(token.as_str()) {
                records.push((whole.start(), whole.end(), replacement));
            }
        }
        if records.is_empty() {
            continue;
        }
        count += records.len();

        let mut offset = 0;
        for element in &paragraph.elements {
            let start = offset;
            let end = offset + element.text.len();
            offset = end;

            let rewritten = rewrite_range(concat, start, end, &records);
            if rewritten != element.text {
                edits.push((
                    element.span.clone(),
                    format!(
                        r#"<w:t xml:space="preserve">{}</w:t>"#,
                        escape_text(&rewritten)
                    ),
                ));
            }
        }
    }

    if edits.is_empty() {
        return (xml.to_string(), count);
    }

    let mut out = xml.to_string();
    for (span, replacement) in edits.into_iter().rev() {
        out.replace_range(span, &replacement);
    }
    (out, count)
}

/// Rebuild the `[start, end)` slice of `concat` with the replacements applied.
/// A replacement lands in the element where its match starts; characters of
/// the match that fall into later elements are dropped.
fn rewrite_range(concat: &str, start: usize, end: usize, records: &[(usize, usize, String)]) -> String {
    let mut out = String::new();
    let mut pos = start;

    for (match_start, match_end, replacement) in records {
        if *match_start >= end {
            break;
        }
        if *match_end <= start {
            continue;
        }
        if *match_start > pos {
            out.push_str(&concat[pos..*match_start]);
        }
        if *match_start >= start {
            out.push_str(replacement);
        }
        pos = pos.max((*match_end).min(end));
    }

    if pos < end {
        out.push_str(&concat[pos..end]);
    }
    out
}

/// Byte ranges of every top-level `<w:tbl>` element.
pub fn top_level_tables(xml: &str, part: &str) -> TemplateResult<Vec<Range<usize>>> {
    let mut tables = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for tag in table_tag_pattern().find_iter(xml) {
        if tag.as_str().starts_with("</") {
            depth = depth.checked_sub(1).ok_or_else(|| TemplateError::MalformedDocument {
                part: part.to_string(),
                message: format!("unbalanced </w:tbl> at byte {}", tag.start()),
            })?;
            if depth == 0 {
                tables.push(start..tag.end());
            }
        } else {
            if depth == 0 {
                start = tag.start();
            }
            depth += 1;
        }
    }

    if depth != 0 {
        return Err(TemplateError::MalformedDocument {
            part: part.to_string(),
            message: "unterminated <w:tbl>".to_string(),
        });
    }
    Ok(tables)
}

/// Byte ranges (relative to `table_xml`) of the tables nested directly inside
/// a table, one level down.
pub fn child_tables(table_xml: &str, part: &str) -> TemplateResult<Vec<Range<usize>>> {
    let open_end = table_tag_pattern().find(table_xml).map_or(0, |tag| tag.end());
    let close_start = table_xml.rfind("</w:tbl>").unwrap_or(table_xml.len());
    if close_start <= open_end {
        return Ok(Vec::new());
    }

    Ok(top_level_tables(&table_xml[open_end..close_start], part)?
        .into_iter()
        .map(|range| range.start + open_end..range.end + open_end)
        .collect())
}

/// `xml` with every top-level table cut out.
pub fn strip_tables(xml: &str, part: &str) -> TemplateResult<String> {
    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    for range in top_level_tables(xml, part)? {
        out.push_str(&xml[pos..range.start]);
        pos = range.end;
    }
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Byte ranges (relative to `table_xml`) of the rows that belong directly to
/// the table. Rows of nested tables are part of their enclosing cell.
pub fn table_rows(table_xml: &str, part: &str) -> TemplateResult<Vec<Range<usize>>> {
    let malformed = |message: String| TemplateError::MalformedDocument {
        part: part.to_string(),
        message,
    };

    let mut rows = Vec::new();
    let mut table_depth = 0usize;
    let mut row_start: Option<usize> = None;

    for tag in row_tag_pattern().find_iter(table_xml) {
        let text = tag.as_str();
        if text == "</w:tbl>" {
            table_depth = table_depth
                .checked_sub(1)
                .ok_or_else(|| malformed("unbalanced </w:tbl>".to_string()))?;
        } else if text.starts_with("<w:tbl") {
            table_depth += 1;
        } else if table_depth == 1 {
            if text == "</w:tr>" {
                let start = row_start
                    .take()
                    .ok_or_else(|| malformed(format!("unbalanced </w:tr> at byte {}", tag.start())))?;
                rows.push(start..tag.end());
            } else {
                row_start = Some(tag.start());
            }
        }
    }

    if row_start.is_some() {
        return Err(malformed("unterminated <w:tr>".to_string()));
    }
    Ok(rows)
}

/// A document part split around its body content.
#[derive(Debug, Clone, Copy)]
pub struct BodySplit<'a> {
    /// Everything up to and including `<w:body>`.
    pub head: &'a str,
    /// Block content of the body, without the final section properties.
    pub content: &'a str,
    /// The final `<w:sectPr>` element and trailing whitespace (may be empty).
    pub section: &'a str,
    /// `</w:body>` and everything after it.
    pub tail: &'a str,
}

/// Split the main document part around its body.
pub fn split_body<'a>(xml: &'a str, part: &str) -> TemplateResult<BodySplit<'a>> {
    let malformed = |message: &str| TemplateError::MalformedDocument {
        part: part.to_string(),
        message: message.to_string(),
    };

    let open = body_open_pattern()
        .find(xml)
        .ok_or_else(|| malformed("missing <w:body>"))?;
    let close = xml
        .rfind("</w:body>")
        .ok_or_else(|| malformed("missing </w:body>"))?;
    if close < open.end() {
        return Err(malformed("</w:body> precedes <w:body>"));
    }

    let inner = &xml[open.end()..close];
    let section_start = if inner.trim_end().ends_with("</w:sectPr>") {
        section_pattern().find_iter(inner).last().map(|m| m.start())
    } else {
        None
    };
    let (content, section) = match section_start {
        Some(idx) => inner.split_at(idx),
        None => (inner, ""),
    };

    Ok(BodySplit {
        head: &xml[..open.end()],
        content,
        section,
        tail: &xml[close..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_pattern() -> Regex {
        Regex::new(r"%(\p{L}[\p{L}\p{N}_.\-]{0,63})%").unwrap()
    }

    #[test]
    fn test_unescape_and_escape() {
        assert_eq!(unescape_text("a &amp; b &lt;c&gt; &#65;&#x42;"), "a & b <c> AB");
        assert_eq!(unescape_text("fish & chips"), "fish & chips");
        assert_eq!(escape_text("a & <b>"), "a &amp; &lt;b&gt;");
    }

    #[test]
    fn test_paragraph_grouping() {
        let xml = "<w:p><w:r><w:t>%Na</w:t></w:r><w:r><w:t>me%</w:t></w:r></w:p>\
                   <w:p><w:r><w:tab/><w:t xml:space=\"preserve\"> x</w:t></w:r></w:p>";
        let paragraphs = paragraph_texts(xml);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text, "%Name%");
        assert_eq!(paragraphs[1].text, " x");
    }

    #[test]
    fn test_substitute_across_runs() {
        let xml = "<w:p><w:r><w:t>Hi %Na</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>me%!</w:t></w:r></w:p>";
        let (out, count) = substitute_tokens(xml, &token_pattern(), |token| {
            (token == "Name").then(|| "Anna & Co".to_string())
        });
        assert_eq!(count, 1);
        assert!(out.contains(r#"<w:t xml:space="preserve">Hi Anna &amp; Co</w:t>"#));
        assert!(out.contains(r#"<w:t xml:space="preserve">!</w:t>"#));
        assert!(out.contains("<w:b/>"));
    }

    #[test]
    fn test_unresolved_tokens_are_untouched() {
        let xml = "<w:p><w:r><w:t>%Other%</w:t></w:r></w:p>";
        let (out, count) = substitute_tokens(xml, &token_pattern(), |_| None);
        assert_eq!(count, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn test_tables_and_rows() {
        let xml = "<w:body><w:tbl><w:tblPr/><w:tr><w:tc><w:tbl><w:tr><w:tc/></w:tr></w:tbl></w:tc></w:tr>\
                   <w:tr><w:trPr/><w:tc/></w:tr></w:tbl><w:p/><w:tbl><w:tr/></w:tbl></w:body>";
        let tables = top_level_tables(xml, "doc").unwrap();
        assert_eq!(tables.len(), 2);

        let first = &xml[tables[0].clone()];
        let rows = table_rows(first, "doc").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(first[rows[1].clone()].contains("<w:trPr/>"));
    }

    #[test]
    fn test_child_tables_and_strip() {
        let inner = "<w:tbl><w:tr><w:tc><w:tbl><w:tr/></w:tbl></w:tc></w:tr></w:tbl>";
        let outer = format!("<w:tbl><w:tr><w:tc>{}<w:p/></w:tc></w:tr></w:tbl>", inner);

        let children = child_tables(&outer, "doc").unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(&outer[children[0].clone()], inner);
        assert!(child_tables("<w:tbl><w:tr/></w:tbl>", "doc").unwrap().is_empty());

        let row = format!("<w:tr><w:tc>{}<w:p/></w:tc></w:tr>", inner);
        assert_eq!(strip_tables(&row, "doc").unwrap(), "<w:tr><w:tc><w:p/></w:tc></w:tr>");
    }

    #[test]
    fn test_unbalanced_table_is_malformed() {
        let result = top_level_tables("<w:tbl><w:tr></w:tr>", "doc");
        assert!(matches!(result, Err(TemplateError::MalformedDocument { .. })));
    }

    #[test]
    fn test_split_body() {
        let xml = "<w:document><w:body><w:p/><w:sectPr><w:pgSz/></w:sectPr></w:body></w:document>";
        let split = split_body(xml, "doc").unwrap();
        assert_eq!(split.content, "<w:p/>");
        assert_eq!(split.section, "<w:sectPr><w:pgSz/></w:sectPr>");
        assert_eq!(split.tail, "</w:body></w:document>");
        assert_eq!(
            format!("{}{}{}{}", split.head, split.content, split.section, split.tail),
            xml
        );
    }
}

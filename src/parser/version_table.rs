//! npm "versions" tab parser
//!
//! Recovers (version, publish time) pairs from the version history table of a
//! package page. Each table row is expected to look like:
//!
//! ```text
//! <tr>
//!   <td><a class="code" href="/package/foo/v/1.2.3">1.2.3</a></td>
//!   <td>1,234</td>
//!   <td><time datetime="2026-10-19T10:00:00.000Z">2 days ago</time></td>
//! </tr>
//! ```
//!
//! The scan is a single pass over `quick_xml` events driving a small per-row
//! state machine. The reader runs without end-name checks so unclosed cells
//! and other HTML leniencies do not stop it. State lives in a [`ScanSession`]
//! created fresh for every call.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, warn};

use crate::parser::timestamp::parse_instant;
use crate::parser::types::VersionRecord;

/// Scan result keyed by version, in document encounter order
pub type VersionRecords = IndexMap<String, VersionRecord>;

/// Parser for the version history table of a package page
pub struct VersionTableScanner;

impl VersionTableScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan `document` and return one record per version.
    ///
    /// When a version appears in several rows, the earliest timestamp wins.
    pub fn scan(&self, document: &str) -> VersionRecords {
        let mut reader = Reader::from_str(document);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;

        let mut session = ScanSession::default();
        let mut last_position = reader.buffer_position();
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => session.handle_start(e),
                Ok(Event::Empty(ref e)) => session.handle_empty(e),
                Ok(Event::Text(ref e)) => session.handle_text(e),
                Ok(Event::End(ref e)) => session.handle_end(e),
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    // Malformed markup: continue after it unless the reader is stuck
                    debug!("Skipping malformed markup: {}", e);
                    if reader.buffer_position() == last_position {
                        break;
                    }
                }
            }
            last_position = reader.buffer_position();
        }

        let records = session.finish();
        debug!("Scanned {} versions from versions table", records.len());
        records
    }
}

impl Default for VersionTableScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased tag name
fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_ascii_lowercase()
}

/// Attribute value of a start tag; tolerates unquoted and bare attributes
fn attribute(tag: &BytesStart<'_>, name: &str) -> Option<String> {
    tag.html_attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

fn has_class(tag: &BytesStart<'_>, class_name: &str) -> bool {
    attribute(tag, "class")
        .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
}

/// Per-row state, reset at every `<tr>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum RowState {
    #[default]
    AwaitingVersion,
    HaveVersion {
        version: String,
        timestamp: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Default)]
struct ScanSession {
    row: RowState,
    /// Number of currently open `<td>` elements in the current row
    cell_depth: usize,
    /// Text collected inside an open `td a.code` element
    version_text: Option<String>,
    records: VersionRecords,
}

impl ScanSession {
    fn handle_start(&mut self, e: &BytesStart<'_>) {
        match tag_name(e.name().as_ref()).as_str() {
            "tr" => {
                self.row = RowState::AwaitingVersion;
                self.cell_depth = 0;
                self.version_text = None;
            }
            "td" => self.cell_depth += 1,
            "a" if self.cell_depth > 0 && has_class(e, "code") => {
                self.version_text = Some(String::new());
            }
            "time" => self.handle_time(e),
            _ => {}
        }
    }

    fn handle_empty(&mut self, e: &BytesStart<'_>) {
        if tag_name(e.name().as_ref()) == "time" {
            self.handle_time(e);
        }
    }

    fn handle_text(&mut self, e: &BytesText<'_>) {
        let Some(buffer) = self.version_text.as_mut() else {
            return;
        };
        match e.unescape() {
            Ok(text) => buffer.push_str(&text),
            Err(_) => buffer.push_str(&String::from_utf8_lossy(e)),
        }
    }

    fn handle_end(&mut self, e: &BytesEnd<'_>) {
        match tag_name(e.name().as_ref()).as_str() {
            "a" => self.finish_version_cell(),
            "td" => {
                self.finish_version_cell();
                self.cell_depth = self.cell_depth.saturating_sub(1);
            }
            "tr" | "table" => {
                self.row = RowState::AwaitingVersion;
                self.cell_depth = 0;
                self.version_text = None;
            }
            _ => {}
        }
    }

    fn handle_time(&mut self, e: &BytesStart<'_>) {
        if let Some(datetime) = attribute(e, "datetime") {
            self.on_time(&datetime);
        }
    }

    fn finish_version_cell(&mut self) {
        let Some(text) = self.version_text.take() else {
            return;
        };
        let version = text.trim();
        if !version.is_empty() {
            self.row = RowState::HaveVersion {
                version: version.to_string(),
                timestamp: None,
            };
        }
    }

    fn on_time(&mut self, datetime: &str) {
        let RowState::HaveVersion { version, timestamp } = &mut self.row else {
            return;
        };

        let Some(published_at) = parse_instant(datetime) else {
            warn!(
                "Failed to parse datetime {:?} for version {}",
                datetime, version
            );
            return;
        };

        *timestamp = Some(published_at);
        match self.records.get_mut(version.as_str()) {
            Some(existing) if published_at < existing.published_at => {
                existing.published_at = published_at;
            }
            Some(_) => {}
            None => {
                self.records.insert(
                    version.clone(),
                    VersionRecord::new(version.clone(), published_at),
                );
            }
        }
    }

    fn finish(self) -> VersionRecords {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn row(version: &str, datetime: &str) -> String {
        format!(
            r#"<tr><td><a class="code black-80" href="/package/foo/v/{v}">{v}</a></td><td class="downloads">12</td><td><time datetime="{d}" title="x">a day ago</time></td></tr>"#,
            v = version,
            d = datetime
        )
    }

    fn table(rows: &[String]) -> String {
        format!(
            "<html><body><table><tbody>{}</tbody></table></body></html>",
            rows.concat()
        )
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap()
    }

    #[test]
    fn scan_returns_records_in_document_order() {
        let document = table(&[
            row("2.0.0", "2026-10-19T03:00:00.000Z"),
            row("1.0.0", "2026-10-19T01:00:00.000Z"),
        ]);

        let records = VersionTableScanner::new().scan(&document);

        assert_eq!(
            records.into_values().collect::<Vec<_>>(),
            vec![
                VersionRecord::new("2.0.0", at(3)),
                VersionRecord::new("1.0.0", at(1)),
            ]
        );
    }

    #[rstest]
    #[case("2026-10-19T01:00:00.000Z", "2026-10-19T02:00:00.000Z")]
    #[case("2026-10-19T02:00:00.000Z", "2026-10-19T01:00:00.000Z")]
    fn scan_keeps_earliest_timestamp_for_repeated_version(
        #[case] first: &str,
        #[case] second: &str,
    ) {
        let document = table(&[row("1.0.0", first), row("1.0.0", second)]);

        let records = VersionTableScanner::new().scan(&document);

        assert_eq!(records.len(), 1);
        assert_eq!(records["1.0.0"], VersionRecord::new("1.0.0", at(1)));
    }

    #[test]
    fn scan_skips_rows_without_version_cell() {
        let document = table(&[
            r#"<tr><th>Version</th><th>Downloads</th><th>Published</th></tr>"#.to_string(),
            r#"<tr><td>1.0.0</td><td><time datetime="2026-10-19T01:00:00.000Z">x</time></td></tr>"#
                .to_string(),
        ]);

        assert!(VersionTableScanner::new().scan(&document).is_empty());
    }

    #[test]
    fn scan_skips_rows_with_invalid_datetime() {
        let document = table(&[
            row("1.0.0", "not-a-date"),
            row("1.1.0", "2026-10-19T05:00:00.000Z"),
        ]);

        let records = VersionTableScanner::new().scan(&document);

        assert_eq!(records.keys().collect::<Vec<_>>(), vec!["1.1.0"]);
    }

    #[test]
    fn scan_ignores_time_element_before_version_cell() {
        let document = table(&[
            r#"<tr><td><time datetime="2026-10-19T01:00:00.000Z">x</time></td><td><a class="code">1.0.0</a></td></tr>"#
                .to_string(),
        ]);

        assert!(VersionTableScanner::new().scan(&document).is_empty());
    }

    #[test]
    fn scan_resets_version_at_each_row_boundary() {
        // Second row has a timestamp but no version: it must not reuse 1.0.0
        let document = table(&[
            r#"<tr><td><a class="code">1.0.0</a></td></tr>"#.to_string(),
            r#"<tr><td>-</td><td><time datetime="2026-10-19T01:00:00.000Z">x</time></td></tr>"#
                .to_string(),
        ]);

        assert!(VersionTableScanner::new().scan(&document).is_empty());
    }

    #[test]
    fn scan_ignores_code_links_outside_table_cells() {
        let document = r#"<p><a class="code">9.9.9</a><time datetime="2026-10-19T01:00:00.000Z"></time></p>"#;

        assert!(VersionTableScanner::new().scan(document).is_empty());
    }

    #[test]
    fn scan_tolerates_nested_and_unclosed_markup() {
        let document = r#"
            <table>
              <tr><td><a class="code"><span> 3.0.0 </span></a>
                  <td><time datetime="2026-10-19T04:00:00.000Z">x</time>
              <tr><td><a class="code">3.0.1</td><td><time datetime="2026-10-19T05:00:00.000Z"></time></td>
            </table>"#;

        let records = VersionTableScanner::new().scan(document);

        assert_eq!(
            records.into_values().collect::<Vec<_>>(),
            vec![
                VersionRecord::new("3.0.0", at(4)),
                VersionRecord::new("3.0.1", at(5)),
            ]
        );
    }

    #[test]
    fn scan_ignores_code_links_after_table_with_unclosed_cell() {
        let document = r#"<table><tr><td>layout</table><div><a class="code">9.9.9</a><time datetime="2026-10-19T01:00:00.000Z"></div>"#;

        assert!(VersionTableScanner::new().scan(document).is_empty());
    }

    #[test]
    fn scan_ignores_time_after_row_end() {
        let document = r#"<table><tr><td><a class="code">1.0.0</a></td></tr></table><p><time datetime="2026-10-19T01:00:00.000Z"></time></p>"#;

        assert!(VersionTableScanner::new().scan(document).is_empty());
    }

    #[test]
    fn scan_accepts_unquoted_attributes_and_uppercase_tags() {
        let document = r#"<TABLE><TR><TD><A CLASS=code>4.0.0</A></TD><TD><TIME DATETIME=2026-10-19T02:00:00.000Z /></TD></TR></TABLE>"#;

        let records = VersionTableScanner::new().scan(document);

        assert_eq!(records["4.0.0"], VersionRecord::new("4.0.0", at(2)));
    }

    #[test]
    fn scan_skips_comments_doctype_and_scripts() {
        let document = format!(
            r#"<!DOCTYPE html><html><head><script>var x = "<tr>";</script><!-- <a class="code">0.0.1</a> --></head><body>{}</body></html>"#,
            table(&[row("5.0.0", "2026-10-19T03:00:00.000Z")])
                .trim_start_matches("<html><body>")
                .trim_end_matches("</body></html>")
        );

        let records = VersionTableScanner::new().scan(&document);

        assert_eq!(records.keys().collect::<Vec<_>>(), vec!["5.0.0"]);
    }

    #[test]
    fn scan_returns_empty_for_empty_document() {
        assert!(VersionTableScanner::new().scan("").is_empty());
    }
}

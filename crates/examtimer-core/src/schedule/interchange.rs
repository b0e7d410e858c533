//! CSV import/export of the schedule.
//!
//! Export writes `Start,End,Subject,Note` with the two text columns wrapped
//! in double quotes. Import is lenient: each line is tokenised on its own,
//! so one broken line cannot swallow the rest of the file, and lines that do
//! not yield a valid window are counted and skipped.

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::window::ExamWindow;

pub const CSV_HEADER: &str = "Start,End,Subject,Note";

const MAX_FIELDS: usize = 4;

/// Rows recovered from a CSV file.
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub windows: Vec<ExamWindow>,
    pub skipped: usize,
}

pub fn export_csv(windows: &[ExamWindow]) -> String {
    let mut out = String::from(CSV_HEADER);
    for w in windows {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{}",
            w.start,
            w.end,
            quote(&w.name),
            quote(&w.info)
        ));
    }
    out
}

/// Parse CSV text. The first line is always treated as the header.
///
/// Blank lines are ignored and do not count as skipped.
pub fn parse_csv(text: &str, default_subject: &str) -> ParsedCsv {
    let mut parsed = ParsedCsv::default();
    for (line_no, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, default_subject) {
            Some(window) => parsed.windows.push(window),
            None => {
                debug!(line = line_no + 1, "skipping malformed schedule row");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

fn parse_line(line: &str, default_subject: &str) -> Option<ExamWindow> {
    let fields = tokenize(line)?;
    let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");
    if field(0).is_empty() || field(1).is_empty() {
        return None;
    }
    let name = if field(2).is_empty() {
        default_subject
    } else {
        field(2)
    };
    ExamWindow::new(field(0), field(1), name, field(3)).ok()
}

fn tokenize(line: &str) -> Option<Vec<String>> {
    let line = strip_quote_padding(line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    let record = reader.records().next()?.ok()?;
    Some(record.iter().take(MAX_FIELDS).map(str::to_string).collect())
}

#[derive(Clone, Copy)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted,
    AfterQuote,
}

/// Drop whitespace between a delimiter and an opening quote.
///
/// The reader only honours a quote as the first byte of a field, so
/// hand-edited rows like `09:00, 10:00, "History, Paper 2"` would otherwise
/// split inside the quotes.
fn strip_quote_padding(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut padding = String::new();
    let mut state = Scan::FieldStart;
    for c in line.chars() {
        state = match (state, c) {
            (Scan::FieldStart, '"') => {
                padding.clear();
                out.push(c);
                Scan::Quoted
            }
            (Scan::FieldStart, c) if c.is_whitespace() => {
                padding.push(c);
                Scan::FieldStart
            }
            (Scan::FieldStart | Scan::Unquoted | Scan::AfterQuote, ',') => {
                out.push_str(&padding);
                padding.clear();
                out.push(c);
                Scan::FieldStart
            }
            (Scan::FieldStart, _) => {
                out.push_str(&padding);
                padding.clear();
                out.push(c);
                Scan::Unquoted
            }
            (Scan::Quoted, '"') => {
                out.push(c);
                Scan::AfterQuote
            }
            // `""` inside a quoted field
            (Scan::AfterQuote, '"') => {
                out.push(c);
                Scan::Quoted
            }
            (Scan::AfterQuote, _) => {
                out.push(c);
                Scan::Unquoted
            }
            (state, c) => {
                out.push(c);
                state
            }
        };
    }
    out.push_str(&padding);
    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str, name: &str, info: &str) -> ExamWindow {
        ExamWindow::new(start, end, name, info).unwrap()
    }

    #[test]
    fn export_quotes_text_columns() {
        let csv = export_csv(&[
            window("09:00", "10:00", "Math", "Room 4"),
            window("11:00", "12:30", "History, Paper 2", ""),
        ]);
        assert_eq!(
            csv,
            "Start,End,Subject,Note\n\
             09:00,10:00,\"Math\",\"Room 4\"\n\
             11:00,12:30,\"History, Paper 2\",\"\""
        );
    }

    #[test]
    fn export_of_empty_schedule_is_header_only() {
        assert_eq!(export_csv(&[]), CSV_HEADER);
    }

    #[test]
    fn parse_handles_quoted_commas_and_bare_tokens() {
        let text = "Start,End,Subject,Note\n\
                    09:00,10:00,\"Physics, Paper 1\",\"Bring calculator\"\n\
                    13:00,14:00,Chemistry,Lab\n";
        let parsed = parse_csv(text, "Subject");
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.windows.len(), 2);
        assert_eq!(parsed.windows[0].name, "Physics, Paper 1");
        assert_eq!(parsed.windows[0].info, "Bring calculator");
        assert_eq!(parsed.windows[1].name, "Chemistry");
        assert_eq!(parsed.windows[1].info, "Lab");
    }

    #[test]
    fn parse_skips_malformed_lines() {
        let text = "Start,End,Subject,Note\r\n\
                    09:00,10:00,\"Math\",\"\"\r\n\
                    ,10:00,\"No start\",\"\"\r\n\
                    just one field\r\n\
                    \r\n\
                    11:00,10:00,\"Backwards\",\"\"\r\n\
                    noon,13:00,\"Words\",\"\"\r\n\
                    14:00,15:00\r\n";
        let parsed = parse_csv(text, "Subject");
        assert_eq!(parsed.windows.len(), 2);
        assert_eq!(parsed.skipped, 4);
        assert_eq!(parsed.windows[1].start, "14:00");
        assert_eq!(parsed.windows[1].name, "Subject");
    }

    #[test]
    fn parse_ignores_extra_columns_and_padding() {
        let text = "header\n 9:00 , 10:00 , \"Math\" , \"Hall A\" , extra\n";
        let parsed = parse_csv(text, "Subject");
        assert_eq!(parsed.windows.len(), 1);
        let w = &parsed.windows[0];
        assert_eq!((w.start.as_str(), w.end.as_str()), ("09:00", "10:00"));
        assert_eq!(w.name, "Math");
        assert_eq!(w.info, "Hall A");
    }

    #[test]
    fn header_only_or_empty_text_imports_nothing() {
        assert!(parse_csv("", "Subject").windows.is_empty());
        let parsed = parse_csv("Start,End,Subject,Note", "Subject");
        assert!(parsed.windows.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn padded_quoted_fields_keep_their_commas() {
        let text = "Start,End,Subject,Note\n09:00, 10:00, \"History, Paper 2\", \"Hall\"\n";
        let parsed = parse_csv(text, "Subject");
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.windows.len(), 1);
        assert_eq!(parsed.windows[0].name, "History, Paper 2");
        assert_eq!(parsed.windows[0].info, "Hall");
    }

    #[test]
    fn quote_padding_is_only_stripped_outside_quotes() {
        assert_eq!(
            strip_quote_padding("09:00,  \"a, \"\"b\"\", c\" , \"d\""),
            "09:00,\"a, \"\"b\"\", c\" ,\"d\""
        );
        assert_eq!(strip_quote_padding(" 9:00 , Math "), " 9:00 , Math ");
    }

    #[test]
    fn fully_quoted_value_roundtrips() {
        let original = window("09:00", "10:00", "\"Quoted\"", "");
        let parsed = parse_csv(&export_csv(std::slice::from_ref(&original)), "Subject");
        assert_eq!(parsed.windows[0].name, "\"Quoted\"");
    }

    #[test]
    fn embedded_quotes_roundtrip() {
        let original = window("09:00", "10:00", "Say \"cheese\"", "a, b");
        let parsed = parse_csv(&export_csv(std::slice::from_ref(&original)), "Subject");
        assert_eq!(parsed.windows[0].name, "Say \"cheese\"");
        assert_eq!(parsed.windows[0].info, "a, b");
    }
}

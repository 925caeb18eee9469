//! Parsing of JSON, CSV and plain-text input into list records.
//!
//! All three formats produce the same `Vec<ListRecord>`, so the strategy
//! applied afterwards never depends on where the data came from.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::ListAllError;
use crate::features::export::{CSV_HEADER, DESCRIPTION_INDENT};
use crate::model::{ExportFormat, ItemRecord, ListRecord, EXPORT_VERSION};

/// Name given to items that appear before any list header in plain text.
pub const DEFAULT_LIST_NAME: &str = "Imported List";

/// `1. [x] Title` / `[ ] Title` / `- [✓] Title`
static CHECKBOX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]\s*|[-*•]\s+)?\[([ xX✓✔])\]\s*(.+?)\s*$")
        .unwrap_or_else(|e| panic!("Invalid checkbox regex: {e}"))
});

/// `- Title` / `* Title` / `• Title`
static BULLET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-*•]\s+(.+?)\s*$").unwrap_or_else(|e| panic!("Invalid bullet regex: {e}"))
});

/// `3. Title` / `3) Title`
static NUMBERED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+[.)]\s+(.+?)\s*$")
        .unwrap_or_else(|e| panic!("Invalid numbered regex: {e}"))
});

/// `Title (×2)` / `Title (x2)`
static QUANTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)\s*\((?:×|x|X)\s*(\d+)\)$")
        .unwrap_or_else(|e| panic!("Invalid quantity regex: {e}"))
});

/// Guess the format of `content`.
#[must_use]
pub fn detect_format(content: &str) -> ExportFormat {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let first_line = trimmed.lines().next().unwrap_or_default();

    // A leading `[ ]` checkbox is plain text, not a JSON array.
    if trimmed.starts_with('{') || (trimmed.starts_with('[') && !CHECKBOX_PATTERN.is_match(first_line)) {
        return ExportFormat::Json;
    }

    let header_start = format!("{},{}", CSV_HEADER[0], CSV_HEADER[1]);
    if first_line
        .to_lowercase()
        .replace('"', "")
        .starts_with(&header_start.to_lowercase())
    {
        return ExportFormat::Csv;
    }

    ExportFormat::Text
}

/// Parse `content` in the given format.
///
/// # Errors
///
/// Returns `ListAllError::Import` describing the first malformed record.
pub fn parse(content: &str, format: ExportFormat) -> Result<Vec<ListRecord>, ListAllError> {
    let content = content.trim_start_matches('\u{feff}');
    let lists = match format {
        ExportFormat::Json => parse_json(content)?,
        ExportFormat::Csv => parse_csv(content)?,
        ExportFormat::Text => parse_text(content)?,
    };

    if lists.is_empty() {
        return Err(ListAllError::Import(format!(
            "no lists found in {format} input"
        )));
    }
    Ok(lists)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Document {
        #[serde(default)]
        version: Option<u32>,
        lists: Vec<ListRecord>,
    },
    Lists(Vec<ListRecord>),
}

/// Parse an export document, or a bare array of lists.
///
/// # Errors
///
/// Returns `ListAllError::Import` for malformed JSON or a newer export version.
pub fn parse_json(content: &str) -> Result<Vec<ListRecord>, ListAllError> {
    let input: JsonInput = serde_json::from_str(content).map_err(|e| {
        ListAllError::Import(format!(
            "invalid JSON at line {}, column {}: {e}",
            e.line(),
            e.column()
        ))
    })?;

    let lists = match input {
        JsonInput::Document { version, lists } => {
            if let Some(version) = version.filter(|v| *v > EXPORT_VERSION) {
                return Err(ListAllError::Import(format!(
                    "export version {version} is newer than supported version {EXPORT_VERSION}"
                )));
            }
            lists
        }
        JsonInput::Lists(lists) => lists,
    };

    for (index, list) in lists.iter().enumerate() {
        if list.name.trim().is_empty() {
            return Err(ListAllError::Import(format!(
                "list #{} has an empty name",
                index + 1
            )));
        }
    }
    Ok(lists)
}

/// Parse CSV with the export header. Columns are matched by header name, so
/// their order does not matter and only the first two are required.
///
/// # Errors
///
/// Returns `ListAllError::Import` with the offending line number.
pub fn parse_csv(content: &str) -> Result<Vec<ListRecord>, ListAllError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ListAllError::Import(format!("unreadable CSV header: {e}")))?
        .clone();
    let columns = CsvColumns::from_headers(&headers)?;

    let mut lists: Vec<ListRecord> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for row in reader.records() {
        let row = row.map_err(|e| {
            let line = e.position().map_or(0, csv::Position::line);
            ListAllError::Import(format!("CSV line {line}: {e}"))
        })?;
        let line = row.position().map_or(0, csv::Position::line);

        let list_name = columns.get(&row, columns.list_name);
        if list_name.is_empty() {
            if row.iter().all(str::is_empty) {
                continue;
            }
            return Err(ListAllError::Import(format!("CSV line {line}: missing list name")));
        }

        let index = *by_name
            .entry(list_name.to_lowercase())
            .or_insert_with(|| {
                lists.push(ListRecord::named(list_name));
                lists.len() - 1
            });

        let title = columns.get(&row, columns.item_title);
        if title.is_empty() {
            continue;
        }

        let mut item = ItemRecord::titled(title);
        let description = columns.get(&row, columns.description);
        if !description.is_empty() {
            item.description = Some(description.to_string());
        }
        item.quantity = optional(columns.get(&row, columns.quantity), |raw| {
            raw.parse::<u32>()
                .ok()
                .filter(|q| *q >= 1)
                .ok_or_else(|| format!("invalid quantity '{raw}'"))
        })
        .map_err(|e| ListAllError::Import(format!("CSV line {line}: {e}")))?;
        item.is_crossed_out = optional(columns.get(&row, columns.crossed_out), parse_flag)
            .map_err(|e| ListAllError::Import(format!("CSV line {line}: {e}")))?;
        item.order_number = optional(columns.get(&row, columns.order), |raw| {
            raw.parse::<i64>().map_err(|_| format!("invalid order '{raw}'"))
        })
        .map_err(|e| ListAllError::Import(format!("CSV line {line}: {e}")))?;
        item.created_at = optional(columns.get(&row, columns.created), parse_time)
            .map_err(|e| ListAllError::Import(format!("CSV line {line}: {e}")))?;
        item.modified_at = optional(columns.get(&row, columns.modified), parse_time)
            .map_err(|e| ListAllError::Import(format!("CSV line {line}: {e}")))?;

        lists[index].items.push(item);
    }

    Ok(lists)
}

/// Column positions found in a CSV header.
struct CsvColumns {
    list_name: Option<usize>,
    item_title: Option<usize>,
    description: Option<usize>,
    quantity: Option<usize>,
    crossed_out: Option<usize>,
    order: Option<usize>,
    created: Option<usize>,
    modified: Option<usize>,
}

impl CsvColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ListAllError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        };

        let columns = Self {
            list_name: find(CSV_HEADER[0]),
            item_title: find(CSV_HEADER[1]),
            description: find(CSV_HEADER[2]),
            quantity: find(CSV_HEADER[3]),
            crossed_out: find(CSV_HEADER[4]),
            order: find(CSV_HEADER[5]),
            created: find(CSV_HEADER[6]),
            modified: find(CSV_HEADER[7]),
        };

        if columns.list_name.is_none() || columns.item_title.is_none() {
            return Err(ListAllError::Import(format!(
                "CSV header must contain '{}' and '{}'",
                CSV_HEADER[0], CSV_HEADER[1]
            )));
        }
        Ok(columns)
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, column: Option<usize>) -> &'r str {
        column.and_then(|c| row.get(c)).unwrap_or_default()
    }
}

fn optional<T>(
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<Option<T>, String> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" | "x" | "✓" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!("invalid crossed-out flag '{raw}'")),
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

/// Parse the plain-text export layout, or loose checklists.
///
/// A line followed by a row of dashes starts a list. Items may be written as
/// `1. [ ] Title (×2)`, `[x] Title`, `- Title`, `3. Title` or a bare line.
/// Lines indented under an item extend its description, including
/// whitespace-only ones, which become blank description lines.
///
/// # Errors
///
/// Returns `ListAllError::Import` if the input contains no items or lists.
pub fn parse_text(content: &str) -> Result<Vec<ListRecord>, ListAllError> {
    let lines: Vec<&str> = content.lines().collect();
    let mut lists: Vec<ListRecord> = Vec::new();
    let mut last_was_item = false;
    let mut in_banner = false;
    let mut blank_lines = 0;
    let mut index = 0;

    while index < lines.len() {
        let raw = lines[index];
        let line = raw.trim();
        let next = lines.get(index + 1).map(|l| l.trim());
        index += 1;

        if line.is_empty() {
            // Whitespace-only indented lines are blank description lines.
            if last_was_item && !raw.is_empty() {
                blank_lines += 1;
            } else {
                last_was_item = false;
                blank_lines = 0;
            }
            continue;
        }
        if last_was_item {
            let exported = raw.strip_prefix(DESCRIPTION_INDENT);
            let indented = raw.starts_with("  ") || raw.starts_with('\t');
            let loose_item = CHECKBOX_PATTERN.is_match(line) || BULLET_PATTERN.is_match(line);
            if exported.is_some() || (indented && !loose_item) {
                let text = exported.map_or(line, str::trim_end);
                if let Some(item) = lists.last_mut().and_then(|l| l.items.last_mut()) {
                    let description = item.description.get_or_insert_with(String::new);
                    if !description.is_empty() {
                        description.push('\n');
                    }
                    description.push_str(&"\n".repeat(blank_lines));
                    description.push_str(text);
                }
                blank_lines = 0;
                continue;
            }
        }

        if is_rule(line, '=') || is_rule(line, '-') {
            continue;
        }
        if next.is_some_and(|n| is_rule(n, '=')) {
            in_banner = true;
            last_was_item = false;
            index += 1;
            continue;
        }
        if next.is_some_and(|n| is_rule(n, '-')) {
            lists.push(ListRecord::named(line));
            in_banner = false;
            last_was_item = false;
            index += 1;
            continue;
        }
        if in_banner && line.starts_with("Exported:") {
            continue;
        }
        in_banner = false;
        if line == "(no items)" && lists.last().is_some_and(|l| l.items.is_empty()) {
            continue;
        }

        let item = parse_item_line(line);
        if lists.is_empty() {
            lists.push(ListRecord::named(DEFAULT_LIST_NAME));
        }
        if let Some(list) = lists.last_mut() {
            list.items.push(item);
        }
        last_was_item = true;
        blank_lines = 0;
    }

    Ok(lists)
}

fn is_rule(line: &str, ch: char) -> bool {
    line.chars().count() >= 3 && line.chars().all(|c| c == ch)
}

fn parse_item_line(line: &str) -> ItemRecord {
    let (text, crossed_out) = if let Some(caps) = CHECKBOX_PATTERN.captures(line) {
        let mark = caps.get(1).map_or("", |m| m.as_str());
        let text = caps.get(2).map_or("", |m| m.as_str());
        (text, Some(mark != " "))
    } else if let Some(caps) = BULLET_PATTERN.captures(line) {
        (caps.get(1).map_or(line, |m| m.as_str()), None)
    } else if let Some(caps) = NUMBERED_PATTERN.captures(line) {
        (caps.get(1).map_or(line, |m| m.as_str()), None)
    } else {
        (line, None)
    };

    let (title, quantity) = match QUANTITY_PATTERN.captures(text) {
        Some(caps) => {
            let title = caps.get(1).map_or(text, |m| m.as_str());
            let quantity = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|q| *q >= 1);
            if title.trim().is_empty() {
                (text, None)
            } else {
                (title, quantity)
            }
        }
        None => (text, None),
    };

    ItemRecord {
        quantity,
        is_crossed_out: crossed_out,
        ..ItemRecord::titled(title)
    }
}

//! Text and structured-text transformers
//!
//! Markdown rendering uses CommonMark (plus tables and strikethrough).
//! Markup stripping removes tags and comments, then decodes character
//! entities so plain-text output reads as text (`&amp;` → `&`).

use crate::error::{Error, Result};
use bytes::Bytes;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use serde_json::{Map, Value};

const TAG_PATTERN: &str = r"(?s)<!--.*?-->|<[^>]*>";

pub(crate) fn utf8<'a>(data: &'a [u8], what: &str) -> Result<&'a str> {
    std::str::from_utf8(data)
        .map_err(|e| Error::Conversion(format!("{} is not valid UTF-8: {}", what, e)))
}

/// Render Markdown to HTML
pub fn markdown_to_html(data: &Bytes) -> Result<Bytes> {
    let source = utf8(data, "markdown")?;
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut rendered = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut rendered, Parser::new_ext(source, options));
    Ok(Bytes::from(rendered))
}

/// Render Markdown to HTML, then strip all markup
pub fn markdown_to_text(data: &Bytes) -> Result<Bytes> {
    html_to_text(&markdown_to_html(data)?)
}

/// Strip all markup tags from HTML
pub fn html_to_text(data: &Bytes) -> Result<Bytes> {
    let source = utf8(data, "html")?;
    Ok(Bytes::from(strip_tags(source)?))
}

fn strip_tags(source: &str) -> Result<String> {
    let tags = Regex::new(TAG_PATTERN).map_err(|e| Error::Conversion(e.to_string()))?;
    let stripped = tags.replace_all(source, "");
    Ok(html_escape::decode_html_entities(&stripped).into_owned())
}

/// CSV as plain text: commas become spaces
pub fn csv_to_text(data: &Bytes) -> Result<Bytes> {
    let text: Vec<u8> = data
        .iter()
        .map(|&b| if b == b',' { b' ' } else { b })
        .collect();
    Ok(Bytes::from(text))
}

/// CSV as a JSON array of objects keyed by the header row.
///
/// Fields are matched to headers by position. A short row omits its
/// missing trailing keys, extra fields without a header are dropped, and
/// rows whose fields are all empty are skipped.
pub fn csv_to_json(data: &Bytes) -> Result<Bytes> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_ref());

    let headers = reader
        .headers()
        .map_err(|e| Error::Conversion(format!("csv header: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Conversion(format!("csv record: {}", e)))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, field)| (header.to_string(), Value::String(field.to_string())))
            .collect();
        rows.push(Value::Object(row));
    }

    Ok(Bytes::from(serde_json::to_vec(&rows)?))
}

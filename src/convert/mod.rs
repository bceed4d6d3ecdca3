//! Content conversion engine
//!
//! Conversions are a lookup table keyed by source media type, then by the
//! requested file extension. Each cell names the resulting mime type and a
//! pure transform over the stored bytes.
//!
//! | Source             | Extensions                          |
//! |--------------------|-------------------------------------|
//! | `text/plain`       | txt                                 |
//! | `text/markdown`    | md, html, txt                       |
//! | `text/html`        | html, txt                           |
//! | `text/csv`         | csv, txt, json                      |
//! | `application/json` | json, yaml, yml, txt                |
//! | `application/yaml` | yaml, txt                           |
//! | `image/*`          | png, jpg, jpeg, webp, gif, avif     |

pub mod data;
pub mod raster;
pub mod text;

use crate::error::{Error, Result};
use crate::fragment::MediaType;
use bytes::Bytes;

/// A byte-level transformation
pub type Transform = fn(&Bytes) -> Result<Bytes>;

/// One legal (source, extension) cell of the conversion table
#[derive(Clone, Copy)]
pub struct Rule {
    /// Requested file extension
    pub ext: &'static str,
    /// Mime type of the converted bytes
    pub target: &'static str,
    /// Transformation applied to the stored bytes
    pub transform: Transform,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("ext", &self.ext)
            .field("target", &self.target)
            .finish()
    }
}

const fn rule(ext: &'static str, target: &'static str, transform: Transform) -> Rule {
    Rule {
        ext,
        target,
        transform,
    }
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub bytes: Bytes,
    pub mime_type: &'static str,
}

fn identity(data: &Bytes) -> Result<Bytes> {
    Ok(data.clone())
}

const TEXT_PLAIN: &[Rule] = &[rule("txt", "text/plain", identity)];

const TEXT_MARKDOWN: &[Rule] = &[
    rule("md", "text/markdown", identity),
    rule("html", "text/html", text::markdown_to_html),
    rule("txt", "text/plain", text::markdown_to_text),
];

const TEXT_HTML: &[Rule] = &[
    rule("html", "text/html", identity),
    rule("txt", "text/plain", text::html_to_text),
];

const TEXT_CSV: &[Rule] = &[
    rule("csv", "text/csv", identity),
    rule("txt", "text/plain", text::csv_to_text),
    rule("json", "application/json", text::csv_to_json),
];

const APPLICATION_JSON: &[Rule] = &[
    rule("json", "application/json", identity),
    rule("yaml", "application/yaml", data::json_to_yaml),
    rule("yml", "application/yaml", data::json_to_yaml),
    rule("txt", "text/plain", data::json_to_text),
];

const APPLICATION_YAML: &[Rule] = &[
    rule("yaml", "application/yaml", identity),
    rule("txt", "text/plain", data::yaml_to_text),
];

const IMAGE_PNG: &[Rule] = &[
    rule("png", "image/png", identity),
    rule("jpg", "image/jpeg", raster::to_jpeg),
    rule("jpeg", "image/jpeg", raster::to_jpeg),
    rule("webp", "image/webp", raster::to_webp),
    rule("gif", "image/gif", raster::to_gif),
    rule("avif", "image/avif", raster::to_avif),
];

const IMAGE_JPEG: &[Rule] = &[
    rule("jpg", "image/jpeg", identity),
    rule("jpeg", "image/jpeg", identity),
    rule("png", "image/png", raster::to_png),
    rule("webp", "image/webp", raster::to_webp),
    rule("gif", "image/gif", raster::to_gif),
    rule("avif", "image/avif", raster::to_avif),
];

const IMAGE_WEBP: &[Rule] = &[
    rule("webp", "image/webp", identity),
    rule("png", "image/png", raster::to_png),
    rule("jpg", "image/jpeg", raster::to_jpeg),
    rule("jpeg", "image/jpeg", raster::to_jpeg),
    rule("gif", "image/gif", raster::to_gif),
    rule("avif", "image/avif", raster::to_avif),
];

// Same-format GIF is passed through so animation survives.
const IMAGE_GIF: &[Rule] = &[
    rule("gif", "image/gif", identity),
    rule("png", "image/png", raster::to_png),
    rule("jpg", "image/jpeg", raster::to_jpeg),
    rule("jpeg", "image/jpeg", raster::to_jpeg),
    rule("webp", "image/webp", raster::to_webp),
    rule("avif", "image/avif", raster::to_avif),
];

/// Every legal conversion for `source`, native representation first
pub fn rules_for(source: MediaType) -> &'static [Rule] {
    match source {
        MediaType::TextPlain => TEXT_PLAIN,
        MediaType::TextMarkdown => TEXT_MARKDOWN,
        MediaType::TextHtml => TEXT_HTML,
        MediaType::TextCsv => TEXT_CSV,
        MediaType::ApplicationJson => APPLICATION_JSON,
        MediaType::ApplicationYaml => APPLICATION_YAML,
        MediaType::ImagePng => IMAGE_PNG,
        MediaType::ImageJpeg => IMAGE_JPEG,
        MediaType::ImageWebp => IMAGE_WEBP,
        MediaType::ImageGif => IMAGE_GIF,
    }
}

/// Look up the conversion for `(source, ext)`
pub fn find_rule(source: MediaType, ext: &str) -> Option<&'static Rule> {
    rules_for(source).iter().find(|r| r.ext == ext)
}

/// Convert `data` of type `source` into the representation named by `ext`.
///
/// Fails with `Error::UnsupportedConversion` when the extension is not
/// legal for the source type, and with `Error::Conversion` when the stored
/// bytes cannot be parsed as their declared type.
pub fn convert(data: &Bytes, source: MediaType, ext: &str) -> Result<Converted> {
    let rule = find_rule(source, ext).ok_or_else(|| {
        Error::UnsupportedConversion(format!(
            "{} fragments cannot be converted to .{} (supported: {})",
            source,
            ext,
            source.extensions().join(", ")
        ))
    })?;

    let bytes = (rule.transform)(data)?;
    tracing::debug!(
        source = %source,
        ext,
        target = rule.target,
        in_len = data.len(),
        out_len = bytes.len(),
        "Converted fragment data"
    );
    Ok(Converted {
        bytes,
        mime_type: rule.target,
    })
}

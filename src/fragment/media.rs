//! Supported media types
//!
//! A fragment's `type` is a full Content-Type value (possibly carrying
//! parameters such as `charset`). Only the base media type decides whether
//! a fragment is accepted and how it can be converted.

use crate::convert;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base media types a fragment may have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "text/plain")]
    TextPlain,
    #[serde(rename = "text/markdown")]
    TextMarkdown,
    #[serde(rename = "text/html")]
    TextHtml,
    #[serde(rename = "text/csv")]
    TextCsv,
    #[serde(rename = "application/json")]
    ApplicationJson,
    #[serde(rename = "application/yaml")]
    ApplicationYaml,
    #[serde(rename = "image/png")]
    ImagePng,
    #[serde(rename = "image/jpeg")]
    ImageJpeg,
    #[serde(rename = "image/webp")]
    ImageWebp,
    #[serde(rename = "image/gif")]
    ImageGif,
}

impl MediaType {
    /// Every supported base media type
    pub const ALL: [MediaType; 10] = [
        MediaType::TextPlain,
        MediaType::TextMarkdown,
        MediaType::TextHtml,
        MediaType::TextCsv,
        MediaType::ApplicationJson,
        MediaType::ApplicationYaml,
        MediaType::ImagePng,
        MediaType::ImageJpeg,
        MediaType::ImageWebp,
        MediaType::ImageGif,
    ];

    /// Canonical `type/subtype` string
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::TextPlain => "text/plain",
            MediaType::TextMarkdown => "text/markdown",
            MediaType::TextHtml => "text/html",
            MediaType::TextCsv => "text/csv",
            MediaType::ApplicationJson => "application/json",
            MediaType::ApplicationYaml => "application/yaml",
            MediaType::ImagePng => "image/png",
            MediaType::ImageJpeg => "image/jpeg",
            MediaType::ImageWebp => "image/webp",
            MediaType::ImageGif => "image/gif",
        }
    }

    /// Parse a Content-Type value, ignoring parameters.
    ///
    /// Fails with `Error::Validation` when the base type is not supported.
    pub fn parse(content_type: &str) -> Result<Self> {
        let base = base_media_type(content_type);
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == base)
            .ok_or_else(|| {
                Error::Validation(format!("Invalid type, got type={}", content_type))
            })
    }

    /// Whether a Content-Type value has a supported base type
    pub fn is_supported(content_type: &str) -> bool {
        Self::parse(content_type).is_ok()
    }

    /// True for `text/*` types
    pub fn is_text(&self) -> bool {
        self.as_str().starts_with("text/")
    }

    /// Mime types this type can be retrieved as (including itself)
    pub fn formats(&self) -> Vec<&'static str> {
        let mut formats: Vec<&'static str> = Vec::new();
        for rule in convert::rules_for(*self) {
            if !formats.contains(&rule.target) {
                formats.push(rule.target);
            }
        }
        formats
    }

    /// File extensions accepted when retrieving this type
    pub fn extensions(&self) -> Vec<&'static str> {
        convert::rules_for(*self).iter().map(|r| r.ext).collect()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Strip parameters from a Content-Type value:
/// `"Text/HTML; charset=utf-8"` → `"text/html"`.
pub fn base_media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

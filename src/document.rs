//! Documents: decoded search results with typed fragment access.

use crate::error::Error;
use crate::fragments::{
    decode_fragment_map, DocumentLink, Embed, Fragment, GeoPoint, Group, Image, Link,
    StructuredText,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct RawDocument {
    id: String,
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(default)]
    href: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    slugs: Vec<String>,
    #[serde(default)]
    data: Value,
}

/// One decoded document.
///
/// Fragments are keyed `"type.field"`. Fields that failed to decode are
/// absent; the document itself never fails over one bad field.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub doc_type: String,
    pub href: String,
    pub tags: Vec<String>,
    pub slugs: Vec<String>,
    pub fragments: HashMap<String, Fragment>,
}

impl Document {
    pub fn from_json(value: &Value) -> Result<Document, Error> {
        let raw: RawDocument = serde_json::from_value(value.clone())?;
        let fragments = decode_fragment_map(&raw.doc_type, &raw.data[&raw.doc_type]);
        Ok(Document {
            id: raw.id,
            doc_type: raw.doc_type,
            href: raw.href,
            tags: raw.tags,
            slugs: raw.slugs,
            fragments,
        })
    }

    /// The document's current slug: first of `slugs`, `-` when none.
    pub fn slug(&self) -> &str {
        self.slugs.first().map(String::as_str).unwrap_or("-")
    }

    /// Fragment lookup by `"type.field"` path.
    pub fn get(&self, path: &str) -> Option<&Fragment> {
        self.fragments.get(path)
    }

    pub fn get_text(&self, path: &str) -> Option<&str> {
        match self.get(path) {
            Some(Fragment::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn get_select(&self, path: &str) -> Option<&str> {
        match self.get(path) {
            Some(Fragment::Select(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get_number(&self, path: &str) -> Option<f64> {
        match self.get(path) {
            Some(Fragment::Number(number)) => Some(*number),
            _ => None,
        }
    }

    pub fn get_date(&self, path: &str) -> Option<NaiveDate> {
        match self.get(path) {
            Some(Fragment::Date(date)) => Some(*date),
            _ => None,
        }
    }

    pub fn get_timestamp(&self, path: &str) -> Option<DateTime<FixedOffset>> {
        match self.get(path) {
            Some(Fragment::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }

    /// Color value without its leading `#`.
    pub fn get_color(&self, path: &str) -> Option<&str> {
        match self.get(path) {
            Some(Fragment::Color(hex)) => Some(hex.as_str()),
            _ => None,
        }
    }

    pub fn get_image(&self, path: &str) -> Option<&Image> {
        match self.get(path) {
            Some(Fragment::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn get_link(&self, path: &str) -> Option<&Link> {
        match self.get(path) {
            Some(Fragment::Link(link)) => Some(link),
            _ => None,
        }
    }

    pub fn get_embed(&self, path: &str) -> Option<&Embed> {
        match self.get(path) {
            Some(Fragment::Embed(embed)) => Some(embed),
            _ => None,
        }
    }

    pub fn get_geopoint(&self, path: &str) -> Option<&GeoPoint> {
        match self.get(path) {
            Some(Fragment::GeoPoint(point)) => Some(point),
            _ => None,
        }
    }

    pub fn get_group(&self, path: &str) -> Option<&Group> {
        match self.get(path) {
            Some(Fragment::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn get_structured_text(&self, path: &str) -> Option<&StructuredText> {
        match self.get(path) {
            Some(Fragment::StructuredText(text)) => Some(text),
            _ => None,
        }
    }

    /// Document links of an array-valued field (e.g. related posts).
    pub fn linked_documents(&self, path: &str) -> Vec<&DocumentLink> {
        match self.get(path) {
            Some(Fragment::Multiple(fragments)) => fragments
                .iter()
                .filter_map(|fragment| match fragment {
                    Fragment::Link(Link::Document(link)) => Some(link),
                    _ => None,
                })
                .collect(),
            Some(Fragment::Link(Link::Document(link))) => vec![link],
            _ => Vec::new(),
        }
    }
}

//! Typed document fragments.
//!
//! Every field of a document decodes to one [`Fragment`] variant, picked
//! by the payload's `type` discriminator. Unknown discriminators and
//! unparsable values fail with [`FragmentError`] and are isolated to the
//! field: the surrounding document still decodes.

pub mod link;
pub mod structured_text;

pub use link::{DocumentLink, Link, MediaLink, WebLink};
pub use structured_text::{Block, Span, SpanKind, StructuredText, TextBlock};

use crate::error::{Error, FragmentError};
use crate::fragments::link::required_str;
use crate::render::{escape_html, HtmlRenderer};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// One named rendition of an image.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub url: String,
    pub width: u64,
    pub height: u64,
    pub alt: Option<String>,
}

impl ImageView {
    pub fn as_html(&self) -> String {
        format!(
            "<img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\" />",
            escape_html(&self.url),
            escape_html(self.alt.as_deref().unwrap_or("")),
            self.width,
            self.height
        )
    }

    pub(crate) fn decode(value: &Value) -> Result<ImageView, FragmentError> {
        Ok(ImageView {
            url: required_str(value, "url")?,
            width: value["dimensions"]["width"].as_u64().unwrap_or(0),
            height: value["dimensions"]["height"].as_u64().unwrap_or(0),
            alt: value["alt"].as_str().map(str::to_string),
        })
    }
}

/// Image fragment: the main view plus named alternates.
#[derive(Debug, Clone)]
pub struct Image {
    pub main: ImageView,
    pub views: HashMap<String, ImageView>,
}

impl Image {
    /// Look up a view by name; `"main"` returns the main view.
    pub fn view(&self, name: &str) -> Option<&ImageView> {
        if name == "main" {
            Some(&self.main)
        } else {
            self.views.get(name)
        }
    }
}

/// Embed fragment: an oEmbed envelope.
#[derive(Debug, Clone)]
pub struct Embed {
    pub embed_type: String,
    pub provider: String,
    pub provider_url: Option<String>,
    pub embed_url: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub html: Option<String>,
    /// The raw oEmbed object, for fields the typed view doesn't carry.
    pub oembed: Value,
}

impl Embed {
    /// The embed wrapper div. The oEmbed `html` payload is inserted raw.
    pub fn as_html(&self) -> String {
        format!(
            "<div data-oembed=\"{}\" data-oembed-type=\"{}\" data-oembed-provider=\"{}\">{}</div>",
            escape_html(self.provider_url.as_deref().unwrap_or("")),
            escape_html(&self.embed_type.to_lowercase()),
            escape_html(&self.provider.to_lowercase()),
            self.html.as_deref().unwrap_or("")
        )
    }

    pub(crate) fn decode(value: &Value) -> Result<Embed, FragmentError> {
        let oembed = value
            .get("oembed")
            .cloned()
            .ok_or_else(|| FragmentError::Malformed("embed without oembed object".to_string()))?;
        Ok(Embed {
            embed_type: required_str(&oembed, "type")?,
            provider: required_str(&oembed, "provider_name")?,
            provider_url: oembed["provider_url"].as_str().map(str::to_string),
            embed_url: oembed["embed_url"].as_str().map(str::to_string),
            width: oembed["width"].as_u64(),
            height: oembed["height"].as_u64(),
            html: oembed["html"].as_str().map(str::to_string),
            oembed,
        })
    }
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One entry of a group fragment: an ordered field map.
#[derive(Debug, Clone, Default)]
pub struct GroupItem {
    pub fragments: Vec<(String, Fragment)>,
}

impl GroupItem {
    pub fn get(&self, name: &str) -> Option<&Fragment> {
        self.fragments
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, fragment)| fragment)
    }
}

/// Group fragment: an ordered sequence of field maps.
#[derive(Debug, Clone, Default)]
pub struct Group {
    pub items: Vec<GroupItem>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl std::ops::Index<usize> for Group {
    type Output = GroupItem;

    fn index(&self, index: usize) -> &GroupItem {
        &self.items[index]
    }
}

/// A decoded document field.
#[derive(Debug, Clone)]
pub enum Fragment {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    Color(String),
    Select(String),
    Embed(Embed),
    Image(Image),
    Link(Link),
    StructuredText(StructuredText),
    Group(Group),
    GeoPoint(GeoPoint),
    Separator,
    /// Array-valued field: each element decoded independently.
    Multiple(Vec<Fragment>),
}

impl Fragment {
    /// Decode one field value by its `type` discriminator.
    pub fn decode(value: &Value) -> Result<Fragment, FragmentError> {
        if value.is_array() {
            return Ok(Fragment::Multiple(decode_elements(value)));
        }

        let discriminator = value["type"]
            .as_str()
            .ok_or_else(|| FragmentError::Malformed("fragment without type field".to_string()))?;
        let payload = &value["value"];

        match discriminator {
            "Text" => Ok(Fragment::Text(as_string(payload)?)),
            "Select" => Ok(Fragment::Select(as_string(payload)?)),
            "Number" => payload
                .as_f64()
                .map(Fragment::Number)
                .ok_or_else(|| FragmentError::Malformed("non-numeric Number value".to_string())),
            "Date" => {
                let text = as_string(payload)?;
                NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                    .map(Fragment::Date)
                    .map_err(|_| FragmentError::DateParse(text))
            }
            "Timestamp" => {
                let text = as_string(payload)?;
                DateTime::parse_from_rfc3339(&text)
                    .map(Fragment::Timestamp)
                    .map_err(|_| FragmentError::DateParse(text))
            }
            "Color" => {
                let text = as_string(payload)?;
                let hex = text.strip_prefix('#').unwrap_or(&text);
                if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    Ok(Fragment::Color(hex.to_string()))
                } else {
                    Err(FragmentError::Malformed(format!("invalid color value: {}", text)))
                }
            }
            "Embed" => Embed::decode(payload).map(Fragment::Embed),
            "Image" => {
                let main = ImageView::decode(&payload["main"])?;
                let mut views = HashMap::new();
                if let Some(raw_views) = payload["views"].as_object() {
                    for (name, raw) in raw_views {
                        views.insert(name.clone(), ImageView::decode(raw)?);
                    }
                }
                Ok(Fragment::Image(Image { main, views }))
            }
            "StructuredText" => StructuredText::decode(payload).map(Fragment::StructuredText),
            "Group" => {
                let raw_items = payload
                    .as_array()
                    .ok_or_else(|| FragmentError::Malformed("Group value is not an array".to_string()))?;
                let items = raw_items
                    .iter()
                    .map(|raw| GroupItem {
                        fragments: decode_object_fields(raw),
                    })
                    .collect();
                Ok(Fragment::Group(Group { items }))
            }
            "GeoPoint" => {
                let latitude = payload["latitude"].as_f64();
                let longitude = payload["longitude"].as_f64();
                match (latitude, longitude) {
                    (Some(latitude), Some(longitude)) => Ok(Fragment::GeoPoint(GeoPoint {
                        latitude,
                        longitude,
                    })),
                    _ => Err(FragmentError::Malformed(
                        "GeoPoint without numeric coordinates".to_string(),
                    )),
                }
            }
            "Separator" => Ok(Fragment::Separator),
            link_type if link_type.starts_with("Link.") => {
                Link::decode(link_type, payload).map(Fragment::Link)
            }
            other => Err(FragmentError::UnknownType(other.to_string())),
        }
    }

    /// Default HTML rendering of this fragment.
    pub fn as_html(&self, renderer: &HtmlRenderer<'_>) -> Result<String, Error> {
        match self {
            Fragment::Text(text) => Ok(format!("<span class=\"text\">{}</span>", escape_html(text))),
            Fragment::Select(text) => {
                Ok(format!("<span class=\"text\">{}</span>", escape_html(text)))
            }
            Fragment::Number(number) => {
                Ok(format!("<span class=\"number\">{}</span>", format_number(*number)))
            }
            Fragment::Date(date) => Ok(format!("<time>{}</time>", date.format("%Y-%m-%d"))),
            Fragment::Timestamp(ts) => Ok(format!("<time>{}</time>", ts.to_rfc3339())),
            Fragment::Color(hex) => Ok(format!("<span class=\"color\">#{}</span>", hex)),
            Fragment::Embed(embed) => Ok(embed.as_html()),
            Fragment::Image(image) => Ok(image.main.as_html()),
            Fragment::Link(link) => link.as_html(renderer),
            Fragment::StructuredText(text) => text.as_html(renderer),
            Fragment::Group(group) => {
                let mut items = Vec::with_capacity(group.items.len());
                for item in &group.items {
                    let mut parts = Vec::with_capacity(item.fragments.len());
                    for (_, fragment) in &item.fragments {
                        parts.push(fragment.as_html(renderer)?);
                    }
                    items.push(parts.join("\n"));
                }
                Ok(items.join("\n"))
            }
            Fragment::GeoPoint(point) => Ok(format!(
                "<div class=\"geopoint\"><span class=\"latitude\">{}</span><span class=\"longitude\">{}</span></div>",
                point.latitude, point.longitude
            )),
            Fragment::Separator => Ok("<hr/>".to_string()),
            Fragment::Multiple(fragments) => {
                let mut parts = Vec::with_capacity(fragments.len());
                for fragment in fragments {
                    parts.push(fragment.as_html(renderer)?);
                }
                Ok(parts.join("\n"))
            }
        }
    }

    /// Plain-text rendering; markup-only fragments yield an empty string.
    pub fn as_text(&self) -> String {
        match self {
            Fragment::Text(text) | Fragment::Select(text) => text.clone(),
            Fragment::Number(number) => format_number(*number),
            Fragment::Date(date) => date.format("%Y-%m-%d").to_string(),
            Fragment::Timestamp(ts) => ts.to_rfc3339(),
            Fragment::Color(hex) => format!("#{}", hex),
            Fragment::StructuredText(text) => text.as_text(" "),
            Fragment::Group(group) => group
                .items
                .iter()
                .flat_map(|item| item.fragments.iter().map(|(_, f)| f.as_text()))
                .collect::<Vec<_>>()
                .join(" "),
            Fragment::GeoPoint(point) => format!("{},{}", point.latitude, point.longitude),
            Fragment::Link(Link::Document(link)) => link.slug.clone(),
            Fragment::Link(Link::Web(web)) => web.url.clone(),
            Fragment::Multiple(fragments) => fragments
                .iter()
                .map(Fragment::as_text)
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        }
    }
}

fn as_string(value: &Value) -> Result<String, FragmentError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| FragmentError::Malformed("expected a string value".to_string()))
}

// Integral numbers print without a trailing ".0".
fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.is_finite() {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

fn decode_elements(value: &Value) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    if let Some(items) = value.as_array() {
        for (index, item) in items.iter().enumerate() {
            match Fragment::decode(item) {
                Ok(fragment) => fragments.push(fragment),
                Err(error) => {
                    warn!(index, %error, "skipping undecodable array element");
                }
            }
        }
    }
    fragments
}

/// Decode a group-item object: bare field names, per-field fault isolation.
pub(crate) fn decode_object_fields(value: &Value) -> Vec<(String, Fragment)> {
    let mut fragments = Vec::new();
    if let Some(object) = value.as_object() {
        for (field, raw) in object {
            match Fragment::decode(raw) {
                Ok(fragment) => fragments.push((field.clone(), fragment)),
                Err(error) => {
                    warn!(field, %error, "skipping undecodable fragment field");
                }
            }
        }
    }
    fragments
}

/// Decode a document's field map into `"type.field"`-keyed fragments.
///
/// Fields that fail to decode are logged and dropped; the rest of the
/// document is unaffected.
pub(crate) fn decode_fragment_map(doc_type: &str, data: &Value) -> HashMap<String, Fragment> {
    let mut fragments = HashMap::new();
    if let Some(object) = data.as_object() {
        for (field, raw) in object {
            let key = format!("{}.{}", doc_type, field);
            match Fragment::decode(raw) {
                Ok(fragment) => {
                    fragments.insert(key, fragment);
                }
                Err(error) => {
                    warn!(field = %key, %error, "skipping undecodable fragment field");
                }
            }
        }
    }
    fragments
}

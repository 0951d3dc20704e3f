//! Link fragments: document, web, image and file targets.

use crate::error::FragmentError;
use crate::fragments::{decode_fragment_map, Fragment};
use crate::render::{escape_html, HtmlRenderer};
use serde_json::Value;
use std::collections::HashMap;

/// Link to another document in the repository.
///
/// `is_broken` is preserved verbatim from the payload, never recomputed.
/// When the search was submitted with `fetchLinks`, the requested fields
/// of the target document ride along in `fragments`.
#[derive(Debug, Clone)]
pub struct DocumentLink {
    pub id: String,
    pub doc_type: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub is_broken: bool,
    pub fragments: HashMap<String, Fragment>,
}

impl DocumentLink {
    pub fn get(&self, path: &str) -> Option<&Fragment> {
        self.fragments.get(path)
    }

    /// Text field of the linked document, present with `fetchLinks`.
    pub fn get_text(&self, path: &str) -> Option<&str> {
        match self.fragments.get(path) {
            Some(Fragment::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Link to an external URL.
#[derive(Debug, Clone)]
pub struct WebLink {
    pub url: String,
}

/// Link to a repository-hosted media item (image or file).
#[derive(Debug, Clone)]
pub struct MediaLink {
    pub url: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Link {
    Document(DocumentLink),
    Web(WebLink),
    Image(MediaLink),
    File(MediaLink),
}

impl Link {
    /// Resolve this link to the URL it points at.
    pub fn url(&self, renderer: &HtmlRenderer<'_>) -> Result<String, crate::error::Error> {
        renderer.resolve(self)
    }

    /// Anchor-tag rendering; the inner text is the slug, URL or file name.
    pub fn as_html(&self, renderer: &HtmlRenderer<'_>) -> Result<String, crate::error::Error> {
        let href = renderer.resolve(self)?;
        let text = match self {
            Link::Document(doc_link) => doc_link.slug.clone(),
            Link::Web(web) => web.url.clone(),
            Link::Image(media) | Link::File(media) => {
                media.name.clone().unwrap_or_else(|| media.url.clone())
            }
        };
        Ok(format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&href),
            escape_html(&text)
        ))
    }

    pub(crate) fn decode(link_type: &str, value: &Value) -> Result<Link, FragmentError> {
        match link_type {
            "Link.document" => {
                let document = &value["document"];
                let id = required_str(document, "id")?;
                let doc_type = required_str(document, "type")?;
                let tags = string_array(&document["tags"]);
                let slug = document["slug"].as_str().unwrap_or("-").to_string();
                let is_broken = value["isBroken"].as_bool().unwrap_or(false);
                // fetchLinks data, when the server included it
                let fragments = match document.get("data") {
                    Some(data) => decode_fragment_map(&doc_type, &data[&doc_type]),
                    None => HashMap::new(),
                };
                Ok(Link::Document(DocumentLink {
                    id,
                    doc_type,
                    tags,
                    slug,
                    is_broken,
                    fragments,
                }))
            }
            "Link.web" => Ok(Link::Web(WebLink {
                url: required_str(value, "url")?,
            })),
            "Link.image" => Ok(Link::Image(decode_media(value)?)),
            "Link.file" => Ok(Link::File(decode_media(value)?)),
            other => Err(FragmentError::UnknownType(other.to_string())),
        }
    }
}

fn decode_media(value: &Value) -> Result<MediaLink, FragmentError> {
    // Media links nest their payload under "image" or "file".
    let inner = value
        .get("image")
        .or_else(|| value.get("file"))
        .unwrap_or(value);
    Ok(MediaLink {
        url: required_str(inner, "url")?,
        name: inner["name"].as_str().map(str::to_string),
    })
}

pub(crate) fn required_str(value: &Value, key: &str) -> Result<String, FragmentError> {
    value[key]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| FragmentError::Malformed(format!("missing string field: {}", key)))
}

pub(crate) fn string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

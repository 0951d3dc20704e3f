//! Search response pages and pagination.

use crate::document::Document;
use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default)]
    results_per_page: u32,
    #[serde(default)]
    results_size: u32,
    #[serde(default)]
    total_results_size: u32,
    total_pages: Option<u32>,
    #[serde(default)]
    next_page: Option<String>,
    #[serde(default)]
    prev_page: Option<String>,
    #[serde(default)]
    results: Vec<Value>,
}

fn default_page() -> u32 {
    1
}

/// One page of search results.
///
/// Counts come straight from the payload; `next_page`/`prev_page` are the
/// server-supplied URLs passed through verbatim, never recomputed.
#[derive(Debug, Clone)]
pub struct Response {
    pub page: u32,
    pub results_per_page: u32,
    pub results_size: u32,
    pub total_results_size: u32,
    pub total_pages: u32,
    pub next_page: Option<String>,
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

impl Response {
    pub fn from_json(value: &Value) -> Result<Response, Error> {
        let raw: RawResponse = serde_json::from_value(value.clone())?;
        let mut results = Vec::with_capacity(raw.results.len());
        for result in &raw.results {
            results.push(Document::from_json(result)?);
        }
        let total_pages = raw
            .total_pages
            .unwrap_or_else(|| derive_total_pages(raw.total_results_size, raw.results_per_page));
        Ok(Response {
            page: raw.page,
            results_per_page: raw.results_per_page,
            results_size: raw.results_size,
            total_results_size: raw.total_results_size,
            total_pages,
            next_page: raw.next_page,
            prev_page: raw.prev_page,
            results,
        })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.results.get(index)
    }

    pub fn first(&self) -> Option<&Document> {
        self.results.first()
    }

    /// Restartable iteration over the page's documents.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.results.iter()
    }
}

impl std::ops::Index<usize> for Response {
    type Output = Document;

    fn index(&self, index: usize) -> &Document {
        &self.results[index]
    }
}

impl<'a> IntoIterator for &'a Response {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

fn derive_total_pages(total_results_size: u32, results_per_page: u32) -> u32 {
    if results_per_page == 0 {
        return 0;
    }
    total_results_size.div_ceil(results_per_page)
}

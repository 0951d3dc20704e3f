//! API root: repository metadata and the entry point for queries.
//!
//! Fetching the root URL yields the repository's refs, bookmarks, types,
//! tags and named forms. The [`Api`] value is immutable after
//! construction and freely shareable; request state lives in the
//! [`SearchForm`] values it hands out.

use crate::cache::{Cache, MemoryCache};
use crate::document::Document;
use crate::error::Error;
use crate::form::{Form, Query, RawForm, SearchForm};
use crate::predicates::at;
use crate::response::Response;
use crate::transport::{classify_status, fetch_cached, HttpClient, ReqwestClient};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A named snapshot pointer into the content repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Ref {
    #[serde(default)]
    pub id: String,
    /// The hash token sent as the `ref` request parameter.
    #[serde(rename = "ref")]
    pub value: String,
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master: bool,
}

impl AsRef<str> for Ref {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Deserialize)]
struct RawApiData {
    #[serde(default)]
    refs: Vec<Ref>,
    #[serde(default)]
    bookmarks: HashMap<String, String>,
    #[serde(default)]
    types: HashMap<String, String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    forms: HashMap<String, RawForm>,
    #[serde(default)]
    experiments: Value,
}

/// The injected collaborators a search form needs to submit.
pub(crate) struct Collaborators {
    pub(crate) client: Arc<dyn HttpClient>,
    pub(crate) cache: Arc<dyn Cache>,
    pub(crate) access_token: Option<String>,
    pub(crate) master_value: String,
    pub(crate) master_ttl: Duration,
    pub(crate) ref_ttl: Duration,
}

// Master-ref responses can change on every publish; frozen refs are
// immutable and can live in cache much longer.
const DEFAULT_MASTER_TTL: Duration = Duration::from_secs(5);
const DEFAULT_REF_TTL: Duration = Duration::from_secs(3600);

const EVERYTHING_FORM: &str = "everything";

/// Configuration for an [`Api`] fetch: token, transport, cache, TTLs.
pub struct ApiBuilder {
    access_token: Option<String>,
    client: Option<Arc<dyn HttpClient>>,
    cache: Option<Arc<dyn Cache>>,
    master_ttl: Duration,
    ref_ttl: Duration,
}

impl Default for ApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiBuilder {
    pub fn new() -> Self {
        Self {
            access_token: None,
            client: None,
            cache: None,
            master_ttl: DEFAULT_MASTER_TTL,
            ref_ttl: DEFAULT_REF_TTL,
        }
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Substitute the HTTP transport collaborator.
    pub fn client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Substitute the response cache collaborator.
    pub fn cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn master_ttl(mut self, ttl: Duration) -> Self {
        self.master_ttl = ttl;
        self
    }

    pub fn ref_ttl(mut self, ttl: Duration) -> Self {
        self.ref_ttl = ttl;
        self
    }

    /// Retrieve and parse the API root.
    pub async fn fetch(self, url: &str) -> Result<Api, Error> {
        let client: Arc<dyn HttpClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestClient::new()?),
        };
        let cache: Arc<dyn Cache> = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::default()));

        let mut request_url =
            reqwest::Url::parse(url).map_err(|e| Error::Url(e.to_string()))?;
        if let Some(token) = &self.access_token {
            request_url
                .query_pairs_mut()
                .append_pair("access_token", token);
        }
        debug!(url = %request_url, "fetching API root");

        let token_present = self.access_token.is_some();
        let body = fetch_cached(
            client.as_ref(),
            cache.as_ref(),
            request_url.as_str(),
            self.master_ttl,
        )
        .await
        .map_err(|e| classify_status(e, token_present))?;

        Api::parse(
            &body,
            client,
            cache,
            self.access_token,
            self.master_ttl,
            self.ref_ttl,
        )
    }
}

/// Parsed API root, bound to its collaborators for form submission.
pub struct Api {
    refs: Vec<Ref>,
    master: Ref,
    bookmarks: HashMap<String, String>,
    types: HashMap<String, String>,
    tags: Vec<String>,
    forms: HashMap<String, Arc<Form>>,
    experiments: Value,
    collaborators: Arc<Collaborators>,
}

impl Api {
    /// Fetch the API root with default collaborators and no token.
    pub async fn fetch(url: &str) -> Result<Api, Error> {
        ApiBuilder::new().fetch(url).await
    }

    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }

    fn parse(
        body: &str,
        client: Arc<dyn HttpClient>,
        cache: Arc<dyn Cache>,
        access_token: Option<String>,
        master_ttl: Duration,
        ref_ttl: Duration,
    ) -> Result<Api, Error> {
        let raw: RawApiData = serde_json::from_str(body)?;
        // first master wins when the feed carries several
        let master = raw
            .refs
            .iter()
            .find(|r| r.is_master)
            .cloned()
            .ok_or(Error::NoMasterFound)?;

        let collaborators = Arc::new(Collaborators {
            client,
            cache,
            access_token,
            master_value: master.value.clone(),
            master_ttl,
            ref_ttl,
        });

        let mut forms = HashMap::with_capacity(raw.forms.len());
        for (name, raw_form) in raw.forms {
            forms.insert(name, Arc::new(Form::from_raw(raw_form)?));
        }

        Ok(Api {
            refs: raw.refs,
            master,
            bookmarks: raw.bookmarks,
            types: raw.types,
            tags: raw.tags,
            forms,
            experiments: raw.experiments,
            collaborators,
        })
    }

    /// All refs, in feed order.
    pub fn refs(&self) -> &[Ref] {
        &self.refs
    }

    /// The first ref flagged as master.
    pub fn master_ref(&self) -> &Ref {
        &self.master
    }

    /// Look up a ref by its label; first match wins.
    pub fn ref_by_label(&self, label: &str) -> Result<&Ref, Error> {
        self.refs
            .iter()
            .find(|r| r.label == label)
            .ok_or_else(|| Error::RefNotFound(label.to_string()))
    }

    pub fn bookmarks(&self) -> &HashMap<String, String> {
        &self.bookmarks
    }

    /// The document id a bookmark points at.
    pub fn bookmark(&self, name: &str) -> Result<&str, Error> {
        self.bookmarks
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::BookmarkNotFound(name.to_string()))
    }

    pub fn types(&self) -> &HashMap<String, String> {
        &self.types
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn experiments(&self) -> &Value {
        &self.experiments
    }

    pub fn forms(&self) -> &HashMap<String, Arc<Form>> {
        &self.forms
    }

    /// A fresh [`SearchForm`] bound to this root, seeded with the form's
    /// field defaults.
    pub fn form(&self, name: &str) -> Result<SearchForm, Error> {
        let form = self
            .forms
            .get(name)
            .cloned()
            .ok_or_else(|| Error::FormNotFound(name.to_string()))?;
        Ok(SearchForm::new(form, self.collaborators.clone()))
    }

    /// Query the `everything` form at the master ref.
    pub async fn query(&self, query: impl Into<Query>) -> Result<Response, Error> {
        self.form(EVERYTHING_FORM)?
            .with_ref(&self.master)
            .query(query)
            .submit()
            .await
    }

    /// Fetch a single document by id, if it exists at the master ref.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>, Error> {
        let response = self.query(at("document.id", id)).await?;
        Ok(response.results.into_iter().next())
    }
}

//! Query forms: the immutable endpoint description and the request
//! builder that submits against it.

use crate::api::Collaborators;
use crate::error::Error;
use crate::predicates::{serialize_query, Predicate};
use crate::response::Response;
use crate::transport::{classify_status, fetch_cached};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// One declared form field.
#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawForm {
    name: Option<String>,
    method: String,
    rel: Option<String>,
    enctype: String,
    action: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

/// Immutable description of a named query endpoint.
#[derive(Debug, Clone)]
pub struct Form {
    pub name: Option<String>,
    pub method: String,
    pub rel: Option<String>,
    pub enctype: String,
    pub action: String,
    /// Declared fields, in declaration order.
    pub fields: Vec<(String, Field)>,
}

impl Form {
    pub(crate) fn from_raw(raw: RawForm) -> Result<Form, Error> {
        let mut fields = Vec::with_capacity(raw.fields.len());
        for (name, value) in raw.fields {
            let field: Field = serde_json::from_value(value)?;
            fields.push((name, field));
        }
        Ok(Form {
            name: raw.name,
            method: raw.method,
            rel: raw.rel,
            enctype: raw.enctype,
            action: raw.action,
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, desc)| desc)
    }

    /// Baseline parameters: fields with a non-empty default, in
    /// declaration order.
    pub fn default_data(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|(name, field)| {
                field
                    .default
                    .as_ref()
                    .filter(|default| !default.is_empty())
                    .map(|default| (name.clone(), default.clone()))
            })
            .collect()
    }
}

/// A query argument for [`SearchForm::query`]: raw query-language text or
/// a predicate list.
pub enum Query {
    Raw(String),
    Predicates(Vec<Predicate>),
}

impl From<&str> for Query {
    fn from(raw: &str) -> Self {
        Query::Raw(raw.to_string())
    }
}

impl From<String> for Query {
    fn from(raw: String) -> Self {
        Query::Raw(raw)
    }
}

impl From<Predicate> for Query {
    fn from(predicate: Predicate) -> Self {
        Query::Predicates(vec![predicate])
    }
}

impl From<Vec<Predicate>> for Query {
    fn from(predicates: Vec<Predicate>) -> Self {
        Query::Predicates(predicates)
    }
}

impl Query {
    fn into_text(self) -> String {
        match self {
            Query::Raw(raw) => raw,
            Query::Predicates(predicates) => serialize_query(&predicates),
        }
    }
}

/// A request in progress against a [`Form`].
///
/// Consuming builder: every call takes `self` and returns the updated
/// form, so one chain is owned by one logical caller. The underlying
/// `Form` is shared and never mutated.
#[derive(Clone)]
pub struct SearchForm {
    form: Arc<Form>,
    collaborators: Arc<Collaborators>,
    data: Vec<(String, String)>,
}

impl SearchForm {
    pub(crate) fn new(form: Arc<Form>, collaborators: Arc<Collaborators>) -> SearchForm {
        let data = form.default_data();
        SearchForm {
            form,
            collaborators,
            data,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Current merged parameters, defaults plus overrides.
    pub fn data(&self) -> &[(String, String)] {
        &self.data
    }

    /// Set the repository ref to query at. Accepts a [`crate::Ref`] or a
    /// raw hash token.
    pub fn with_ref(mut self, reference: impl AsRef<str>) -> Self {
        self.put_single("ref", reference.as_ref().to_string());
        self
    }

    /// Set the query. Replaces any previous `query` call and shadows the
    /// form's default `q`.
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.put_single("q", query.into().into_text());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.put_single("page", page.to_string());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.put_single("pageSize", page_size.to_string());
        self
    }

    pub fn orderings(mut self, orderings: &str) -> Self {
        self.put_single("orderings", orderings.to_string());
        self
    }

    /// Ask the server to inline the given fields of linked documents.
    pub fn fetch_links(mut self, fields: &[&str]) -> Self {
        self.put_single("fetchLinks", fields.join(","));
        self
    }

    /// Set an arbitrary declared or raw parameter.
    ///
    /// Integer-declared fields validate their value eagerly; repeated
    /// sets accumulate only when the field is declared `multiple`.
    pub fn set(mut self, field: &str, value: &str) -> Result<Self, Error> {
        let multiple = match self.form.field(field) {
            Some(desc) => {
                if desc.kind == "Integer" && value.parse::<i64>().is_err() {
                    return Err(Error::InvalidParameter {
                        field: field.to_string(),
                        value: value.to_string(),
                    });
                }
                desc.multiple
            }
            None => false,
        };
        if multiple {
            self.data.push((field.to_string(), value.to_string()));
        } else {
            self.put_single(field, value.to_string());
        }
        Ok(self)
    }

    fn put_single(&mut self, field: &str, value: String) {
        self.data.retain(|(name, _)| name != field);
        self.data.push((field.to_string(), value));
    }

    /// Submit the search and decode the result page.
    ///
    /// Requires a ref set earlier in the chain. Exactly one outbound
    /// fetch per call; cache policy and retries belong to the
    /// collaborators.
    pub async fn submit(self) -> Result<Response, Error> {
        let ref_value = self
            .data
            .iter()
            .find(|(name, _)| name == "ref")
            .map(|(_, value)| value.clone())
            .ok_or(Error::MissingRef)?;

        let collaborators = &self.collaborators;
        let mut params: Vec<(&str, &str)> = self
            .data
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        if let Some(token) = &collaborators.access_token {
            params.push(("access_token", token.as_str()));
        }

        let url = reqwest::Url::parse_with_params(&self.form.action, params)
            .map_err(|e| Error::Url(e.to_string()))?;
        debug!(url = %url, form = ?self.form.name, "submitting search form");

        let ttl = if ref_value == collaborators.master_value {
            collaborators.master_ttl
        } else {
            collaborators.ref_ttl
        };
        let body = fetch_cached(
            collaborators.client.as_ref(),
            collaborators.cache.as_ref(),
            url.as_str(),
            ttl,
        )
        .await
        .map_err(|e| classify_status(e, collaborators.access_token.is_some()))?;

        let json: Value = serde_json::from_str(&body)?;
        Response::from_json(&json)
    }
}

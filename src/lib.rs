//! Stela: client SDK for the Stela hosted content API.
//!
//! Resolves API root metadata, builds and submits parameterized searches
//! against named forms, and decodes documents into typed fragments that
//! render to HTML or plain text.
//!
//! ```ignore
//! use stela::{predicates, Api, HtmlRenderer};
//!
//! let api = Api::fetch("https://myrepo.example.org/api").await?;
//! let response = api
//!     .form("everything")?
//!     .with_ref(api.master_ref())
//!     .query(predicates::at("document.type", "product"))
//!     .submit()
//!     .await?;
//! let resolve = |link: &stela::DocumentLink| format!("/{}", link.id);
//! let renderer = HtmlRenderer::new().link_resolver(&resolve);
//! for doc in &response {
//!     if let Some(body) = doc.get_structured_text("product.description") {
//!         println!("{}", body.as_html(&renderer)?);
//!     }
//! }
//! ```

pub mod api;
pub mod cache;
pub mod document;
pub mod error;
pub mod form;
pub mod fragments;
pub mod predicates;
pub mod render;
pub mod response;
pub mod transport;

pub use api::{Api, ApiBuilder, Ref};
pub use cache::{Cache, MemoryCache, NoCache};
pub use document::Document;
pub use error::{Error, FragmentError};
pub use form::{Field, Form, Query, SearchForm};
pub use fragments::{
    Block, DocumentLink, Embed, Fragment, GeoPoint, Group, GroupItem, Image, ImageView, Link,
    MediaLink, Span, SpanKind, StructuredText, TextBlock, WebLink,
};
pub use render::{Element, HtmlRenderer};
pub use response::Response;
pub use transport::{HttpClient, ReqwestClient};

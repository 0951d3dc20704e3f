//! Rendering configuration: link resolution and serializer overrides.
//!
//! Both hooks are explicit function-typed fields on [`HtmlRenderer`],
//! passed into every `as_html` call; there are no global hooks.

use crate::error::Error;
use crate::fragments::link::{DocumentLink, Link};
use crate::fragments::structured_text::TextBlock;
use crate::fragments::{Embed, ImageView};

/// Resolves a document link to the URL it should point at.
///
/// The content repository only knows document ids; routing them to site
/// URLs is the caller's concern.
pub type LinkResolverFn<'a> = &'a dyn Fn(&DocumentLink) -> String;

/// Per-element HTML override.
///
/// Called with the element descriptor and its default inner HTML
/// (children already rendered). Returning `Some` replaces the element's
/// entire default serialization verbatim; `None` falls through to the
/// default tags.
pub type SerializerFn<'a> = &'a dyn Fn(&Element<'_>, &str) -> Option<String>;

/// Descriptor handed to the serializer override for each block and span.
#[derive(Debug)]
pub enum Element<'a> {
    Heading { level: u8, content: &'a TextBlock },
    Paragraph { content: &'a TextBlock },
    Preformatted { content: &'a TextBlock },
    ListItem { content: &'a TextBlock },
    OrderedListItem { content: &'a TextBlock },
    Image { view: &'a ImageView },
    Embed { embed: &'a Embed },
    Strong,
    Em,
    Label { name: &'a str },
    Hyperlink { link: &'a Link },
}

/// Rendering configuration for `as_html`.
#[derive(Clone, Copy, Default)]
pub struct HtmlRenderer<'a> {
    link_resolver: Option<LinkResolverFn<'a>>,
    serializer: Option<SerializerFn<'a>>,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_resolver(mut self, resolver: LinkResolverFn<'a>) -> Self {
        self.link_resolver = Some(resolver);
        self
    }

    pub fn serializer(mut self, serializer: SerializerFn<'a>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Consult the serializer override for one element.
    pub(crate) fn serialize_override(&self, element: &Element<'_>, inner: &str) -> Option<String> {
        self.serializer.and_then(|serialize| serialize(element, inner))
    }

    /// Resolve a link to its href.
    ///
    /// Document links require the caller-supplied resolver; the other
    /// link kinds carry their URL directly.
    pub(crate) fn resolve(&self, link: &Link) -> Result<String, Error> {
        match link {
            Link::Document(doc_link) => match self.link_resolver {
                Some(resolve) => Ok(resolve(doc_link)),
                None => Err(Error::MissingLinkResolver),
            },
            Link::Web(web) => Ok(web.url.clone()),
            Link::Image(media) | Link::File(media) => Ok(media.url.clone()),
        }
    }
}

/// Escape text for inclusion in HTML bodies and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

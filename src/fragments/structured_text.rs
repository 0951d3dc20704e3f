//! Structured text: ordered blocks carrying inline span ranges.
//!
//! Decoding keeps blocks exactly as the payload orders them; consecutive
//! list items are grouped into `<ul>`/`<ol>` only at render time. Span
//! ranges are character offsets into the block text, sorted for stable
//! nesting (start ascending, wider spans outer).

use crate::error::{Error, FragmentError};
use crate::fragments::link::Link;
use crate::fragments::{Embed, ImageView};
use crate::render::{escape_html, Element, HtmlRenderer};
use serde_json::Value;
use tracing::warn;

/// Inline markup kinds.
#[derive(Debug, Clone)]
pub enum SpanKind {
    Strong,
    Em,
    Label(String),
    Hyperlink(Link),
}

/// One inline span over `[start, end)` character offsets.
#[derive(Debug, Clone)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

/// Text content of a block plus its inline spans.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub text: String,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Heading { level: u8, content: TextBlock },
    Paragraph(TextBlock),
    Preformatted(TextBlock),
    ListItem(TextBlock),
    OrderedListItem(TextBlock),
    Image(ImageView),
    Embed(Embed),
}

impl Block {
    /// Inline text of the block; `None` for image and embed blocks.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph(content)
            | Block::Preformatted(content)
            | Block::ListItem(content)
            | Block::OrderedListItem(content) => Some(&content.text),
            Block::Image(_) | Block::Embed(_) => None,
        }
    }
}

/// Rich-text fragment: an ordered block sequence.
#[derive(Debug, Clone, Default)]
pub struct StructuredText {
    pub blocks: Vec<Block>,
}

impl StructuredText {
    pub(crate) fn decode(value: &Value) -> Result<StructuredText, FragmentError> {
        let records = value.as_array().ok_or_else(|| {
            FragmentError::Malformed("StructuredText value is not an array".to_string())
        })?;
        let mut blocks = Vec::with_capacity(records.len());
        for record in records {
            match decode_block(record) {
                Ok(block) => blocks.push(block),
                Err(error) => {
                    warn!(%error, "skipping undecodable structured-text block");
                }
            }
        }
        Ok(StructuredText { blocks })
    }

    /// Render to HTML.
    ///
    /// Single pass over the blocks: runs of same-kind list items become
    /// one list chunk; chunks are joined with blank lines. Each element
    /// consults the renderer's serializer override before default tags.
    pub fn as_html(&self, renderer: &HtmlRenderer<'_>) -> Result<String, Error> {
        let mut chunks = Vec::new();
        let mut index = 0;
        while index < self.blocks.len() {
            match &self.blocks[index] {
                Block::ListItem(_) => {
                    let mut items = String::new();
                    while let Some(Block::ListItem(content)) = self.blocks.get(index) {
                        items.push_str(&render_list_item(content, false, renderer)?);
                        index += 1;
                    }
                    chunks.push(format!("<ul>{}</ul>", items));
                }
                Block::OrderedListItem(_) => {
                    let mut items = String::new();
                    while let Some(Block::OrderedListItem(content)) = self.blocks.get(index) {
                        items.push_str(&render_list_item(content, true, renderer)?);
                        index += 1;
                    }
                    chunks.push(format!("<ol>{}</ol>", items));
                }
                block => {
                    chunks.push(render_block(block, renderer)?);
                    index += 1;
                }
            }
        }
        Ok(chunks.join("\n\n"))
    }

    /// Plain text of all text blocks joined by `separator`; image and
    /// embed blocks contribute nothing.
    pub fn as_text(&self, separator: &str) -> String {
        self.blocks
            .iter()
            .filter_map(Block::text)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn decode_block(record: &Value) -> Result<Block, FragmentError> {
    let kind = record["type"]
        .as_str()
        .ok_or_else(|| FragmentError::Malformed("block without type field".to_string()))?;

    match kind {
        "paragraph" => Ok(Block::Paragraph(decode_text_block(record)?)),
        "preformatted" => Ok(Block::Preformatted(decode_text_block(record)?)),
        "list-item" => Ok(Block::ListItem(decode_text_block(record)?)),
        "o-list-item" => Ok(Block::OrderedListItem(decode_text_block(record)?)),
        "image" => Ok(Block::Image(ImageView::decode(record)?)),
        "embed" => Embed::decode(record).map(Block::Embed),
        _ => match kind.strip_prefix("heading").and_then(|n| n.parse::<u8>().ok()) {
            Some(level @ 1..=6) => Ok(Block::Heading {
                level,
                content: decode_text_block(record)?,
            }),
            _ => Err(FragmentError::UnknownType(kind.to_string())),
        },
    }
}

fn decode_text_block(record: &Value) -> Result<TextBlock, FragmentError> {
    let text = record["text"]
        .as_str()
        .ok_or_else(|| FragmentError::Malformed("text block without text".to_string()))?
        .to_string();
    let mut spans = Vec::new();
    if let Some(raw_spans) = record["spans"].as_array() {
        for raw in raw_spans {
            match decode_span(raw) {
                Ok(span) => spans.push(span),
                Err(error) => {
                    warn!(%error, "skipping undecodable span");
                }
            }
        }
    }
    Ok(TextBlock { text, spans })
}

fn decode_span(record: &Value) -> Result<Span, FragmentError> {
    let start = record["start"]
        .as_u64()
        .ok_or_else(|| FragmentError::Malformed("span without start offset".to_string()))?
        as usize;
    let end = record["end"]
        .as_u64()
        .ok_or_else(|| FragmentError::Malformed("span without end offset".to_string()))?
        as usize;
    let kind = record["type"]
        .as_str()
        .ok_or_else(|| FragmentError::Malformed("span without type field".to_string()))?;

    let kind = match kind {
        "strong" => SpanKind::Strong,
        "em" => SpanKind::Em,
        "label" => {
            let name = record["data"]["label"]
                .as_str()
                .ok_or_else(|| FragmentError::Malformed("label span without label".to_string()))?;
            SpanKind::Label(name.to_string())
        }
        "hyperlink" => {
            let data = &record["data"];
            let link_type = data["type"].as_str().ok_or_else(|| {
                FragmentError::Malformed("hyperlink span without link type".to_string())
            })?;
            SpanKind::Hyperlink(Link::decode(link_type, &data["value"])?)
        }
        other => return Err(FragmentError::UnknownType(other.to_string())),
    };

    Ok(Span { start, end, kind })
}

fn render_block(block: &Block, renderer: &HtmlRenderer<'_>) -> Result<String, Error> {
    match block {
        Block::Heading { level, content } => {
            let inner = render_spans(content, renderer)?;
            let element = Element::Heading {
                level: *level,
                content,
            };
            Ok(renderer
                .serialize_override(&element, &inner)
                .unwrap_or_else(|| format!("<h{}>{}</h{}>", level, inner, level)))
        }
        Block::Paragraph(content) => {
            let inner = render_spans(content, renderer)?;
            let element = Element::Paragraph { content };
            Ok(renderer
                .serialize_override(&element, &inner)
                .unwrap_or_else(|| format!("<p>{}</p>", inner)))
        }
        Block::Preformatted(content) => {
            let inner = render_spans(content, renderer)?;
            let element = Element::Preformatted { content };
            Ok(renderer
                .serialize_override(&element, &inner)
                .unwrap_or_else(|| format!("<pre>{}</pre>", inner)))
        }
        Block::ListItem(content) => render_list_item(content, false, renderer),
        Block::OrderedListItem(content) => render_list_item(content, true, renderer),
        Block::Image(view) => {
            let inner = view.as_html();
            let element = Element::Image { view };
            Ok(renderer
                .serialize_override(&element, &inner)
                .unwrap_or_else(|| format!("<p class=\"block-img\">{}</p>", inner)))
        }
        Block::Embed(embed) => {
            let inner = embed.as_html();
            let element = Element::Embed { embed };
            Ok(renderer
                .serialize_override(&element, &inner)
                .unwrap_or(inner))
        }
    }
}

fn render_list_item(
    content: &TextBlock,
    ordered: bool,
    renderer: &HtmlRenderer<'_>,
) -> Result<String, Error> {
    let inner = render_spans(content, renderer)?;
    let element = if ordered {
        Element::OrderedListItem { content }
    } else {
        Element::ListItem { content }
    };
    Ok(renderer
        .serialize_override(&element, &inner)
        .unwrap_or_else(|| format!("<li>{}</li>", inner)))
}

/// Convert a block's span set into nested tags.
///
/// Spans are sorted start-ascending with ties broken by length
/// descending, so wider spans become outer tags; properly nested spans
/// recurse, and overlap without containment is clipped at the enclosing
/// boundary rather than crashing.
fn render_spans(content: &TextBlock, renderer: &HtmlRenderer<'_>) -> Result<String, Error> {
    if content.spans.is_empty() {
        return Ok(escape_html(&content.text));
    }
    let chars: Vec<char> = content.text.chars().collect();
    let mut ordered: Vec<&Span> = content.spans.iter().collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));
    render_range(&chars, 0, chars.len(), &ordered, renderer)
}

fn render_range(
    chars: &[char],
    from: usize,
    to: usize,
    spans: &[&Span],
    renderer: &HtmlRenderer<'_>,
) -> Result<String, Error> {
    let mut out = String::new();
    let mut cursor = from;
    let mut index = 0;
    while index < spans.len() {
        let span = spans[index];
        let start = span.start.max(cursor).min(to);
        let end = span.end.min(to);
        if end <= start {
            // empty after clipping
            index += 1;
            continue;
        }
        out.push_str(&escape_html(&slice_chars(chars, cursor, start)));

        // spans starting inside this one are its children
        let mut after = index + 1;
        while after < spans.len() && spans[after].start < end {
            after += 1;
        }
        let inner = render_range(chars, start, end, &spans[index + 1..after], renderer)?;
        out.push_str(&render_span(span, &inner, renderer)?);
        cursor = end;
        index = after;
    }
    out.push_str(&escape_html(&slice_chars(chars, cursor, to)));
    Ok(out)
}

fn slice_chars(chars: &[char], from: usize, to: usize) -> String {
    let from = from.min(chars.len());
    let to = to.min(chars.len());
    if from >= to {
        String::new()
    } else {
        chars[from..to].iter().collect()
    }
}

fn render_span(span: &Span, inner: &str, renderer: &HtmlRenderer<'_>) -> Result<String, Error> {
    match &span.kind {
        SpanKind::Strong => Ok(renderer
            .serialize_override(&Element::Strong, inner)
            .unwrap_or_else(|| format!("<strong>{}</strong>", inner))),
        SpanKind::Em => Ok(renderer
            .serialize_override(&Element::Em, inner)
            .unwrap_or_else(|| format!("<em>{}</em>", inner))),
        SpanKind::Label(name) => Ok(renderer
            .serialize_override(&Element::Label { name }, inner)
            .unwrap_or_else(|| format!("<span class=\"{}\">{}</span>", escape_html(name), inner))),
        SpanKind::Hyperlink(link) => {
            if let Some(out) = renderer.serialize_override(&Element::Hyperlink { link }, inner) {
                return Ok(out);
            }
            let href = renderer.resolve(link)?;
            Ok(format!("<a href=\"{}\">{}</a>", escape_html(&href), inner))
        }
    }
}

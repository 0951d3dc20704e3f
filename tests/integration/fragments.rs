//! Fragment decoding against realistic document payloads.

use super::test_utils::init_tracing;
use serde_json::json;
use stela::{Document, Fragment, HtmlRenderer, Link};

#[test]
fn test_group_fragment_with_nested_links_and_text() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {"documents": {"type": "Group", "value": [
            {
                "linktodoc": {"type": "Link.document", "value": {
                    "document": {
                        "id": "UrDejAEAAFwMyrW9",
                        "type": "doc",
                        "tags": [],
                        "slug": "installing-meta-micro"
                    },
                    "isBroken": false
                }},
                "desc": {"type": "StructuredText", "value": [
                    {
                        "type": "paragraph",
                        "text": "A detailed step by step point of view on how installing happens.",
                        "spans": []
                    }
                ]}
            },
            {
                "linktodoc": {"type": "Link.document", "value": {
                    "document": {
                        "id": "UrDmKgEAALwMyrXA",
                        "type": "doc",
                        "tags": [],
                        "slug": "using-meta-micro"
                    },
                    "isBroken": false
                }}
            }
        ]}}}
    });
    let document = Document::from_json(&value).unwrap();

    let group = document.get_group("article.documents").unwrap();
    assert_eq!(group.len(), 2);

    let desc = group[0].get("desc").unwrap();
    let html = desc.as_html(&HtmlRenderer::new()).unwrap();
    assert_eq!(
        html,
        "<p>A detailed step by step point of view on how installing happens.</p>"
    );

    match group[1].get("linktodoc").unwrap() {
        Fragment::Link(Link::Document(link)) => assert_eq!(link.slug, "using-meta-micro"),
        other => panic!("expected document link, got {:?}", other),
    }
}

#[test]
fn test_document_link_resolves_through_resolver() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {"source": {"type": "Link.document", "value": {
            "document": {
                "id": "UlfoxUnM0wkXYXbE",
                "type": "product",
                "tags": ["Macaron"],
                "slug": "dark-chocolate-macaron"
            },
            "isBroken": false
        }}}}
    });
    let document = Document::from_json(&value).unwrap();

    let resolve = |link: &stela::DocumentLink| format!("http://localhost/{}/{}", link.id, link.slug);
    let renderer = HtmlRenderer::new().link_resolver(&resolve);
    let source = document.get_link("article.source").unwrap();
    assert_eq!(
        source.url(&renderer).unwrap(),
        "http://localhost/UlfoxUnM0wkXYXbE/dark-chocolate-macaron"
    );
}

#[test]
fn test_embed_fragment_renders_oembed_wrapper() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {"video": {"type": "Embed", "value": {"oembed": {
            "provider_url": "http://www.youtube.com/",
            "type": "video",
            "thumbnail_height": 360,
            "height": 270,
            "thumbnail_url": "http://i1.ytimg.com/vi/baGfM6dBzs8/hqdefault.jpg",
            "width": 480,
            "provider_name": "YouTube",
            "html": "<iframe width=\"480\" height=\"270\" src=\"http://www.youtube.com/embed/baGfM6dBzs8?feature=oembed\" frameborder=\"0\" allowfullscreen></iframe>",
            "author_name": "Siobhan Wilson",
            "version": "1.0",
            "author_url": "http://www.youtube.com/user/siobhanwilsonsongs",
            "thumbnail_width": 480,
            "title": "Siobhan Wilson - All Dressed Up",
            "embed_url": "https://www.youtube.com/watch?v=baGfM6dBzs8"
        }}}}}
    });
    let document = Document::from_json(&value).unwrap();

    let video = document.get_embed("article.video").unwrap();
    assert_eq!(
        video.as_html(),
        "<div data-oembed=\"http://www.youtube.com/\" data-oembed-type=\"video\" data-oembed-provider=\"youtube\"><iframe width=\"480\" height=\"270\" src=\"http://www.youtube.com/embed/baGfM6dBzs8?feature=oembed\" frameborder=\"0\" allowfullscreen></iframe></div>"
    );
    assert_eq!(
        video.embed_url.as_deref(),
        Some("https://www.youtube.com/watch?v=baGfM6dBzs8")
    );
}

#[test]
fn test_color_fragment_strips_leading_hash() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {"background": {"type": "Color", "value": "#000000"}}}
    });
    let document = Document::from_json(&value).unwrap();

    let hex = format!("#{}", document.get_color("article.background").unwrap());
    assert_eq!(hex, "#000000");
}

#[test]
fn test_geopoint_fragment_exposes_coordinates() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {"location": {"type": "GeoPoint", "value": {
            "latitude": 48.877108,
            "longitude": 2.333879
        }}}}
    });
    let document = Document::from_json(&value).unwrap();

    let place = document.get_geopoint("article.location").unwrap();
    let coordinates = format!("{},{}", place.latitude, place.longitude);
    assert_eq!(coordinates, "48.877108,2.333879");
}

#[test]
fn test_array_valued_field_decodes_each_element() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "blog-post",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"blog-post": {"relatedpost": [
            {"type": "Link.document", "value": {
                "document": {
                    "id": "UlfoxUnM0wkXYXbm",
                    "type": "blog-post",
                    "tags": [],
                    "slug": "get-the-right-approach-to-ganache",
                    "data": {"blog-post": {"author": {
                        "type": "Text",
                        "value": "John M. Martelle, Fine Pastry Magazine"
                    }}}
                },
                "isBroken": false
            }},
            {"type": "Link.document", "value": {
                "document": {
                    "id": "UlfoxUnM0wkXYXbl",
                    "type": "blog-post",
                    "tags": [],
                    "slug": "pastry-art-brainstorms"
                },
                "isBroken": false
            }}
        ]}}
    });
    let document = Document::from_json(&value).unwrap();

    let links = document.linked_documents("blog-post.relatedpost");
    assert_eq!(links.len(), 2);
    // fetchLinks data rides along on the first link
    assert_eq!(
        links[0].get_text("blog-post.author"),
        Some("John M. Martelle, Fine Pastry Magazine")
    );
    assert_eq!(links[1].get_text("blog-post.author"), None);
}

#[test]
fn test_unknown_fragment_type_does_not_sink_the_document() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {
            "mystery": {"type": "Wormhole", "value": 42},
            "title": {"type": "Text", "value": "Still here"},
            "when": {"type": "Date", "value": "2013-07-27"},
            "stamp": {"type": "Timestamp", "value": "2014-06-18T15:30:00+00:00"}
        }}
    });
    let document = Document::from_json(&value).unwrap();

    assert!(document.get("article.mystery").is_none());
    assert_eq!(document.get_text("article.title"), Some("Still here"));
    assert_eq!(
        document.get_date("article.when").unwrap().to_string(),
        "2013-07-27"
    );
    assert!(document.get_timestamp("article.stamp").is_some());
}

#[test]
fn test_unparsable_date_field_becomes_absent() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {
            "when": {"type": "Date", "value": "27/07/2013"},
            "title": {"type": "Text", "value": "Still here"}
        }}
    });
    let document = Document::from_json(&value).unwrap();

    assert!(document.get("article.when").is_none());
    assert_eq!(document.get_text("article.title"), Some("Still here"));
}

#[test]
fn test_broken_document_link_is_preserved_verbatim() {
    init_tracing();
    let value = json!({
        "id": "abcd",
        "type": "article",
        "href": "",
        "slugs": [],
        "tags": [],
        "data": {"article": {"source": {"type": "Link.document", "value": {
            "document": {"id": "gone", "type": "product", "tags": []},
            "isBroken": true
        }}}}
    });
    let document = Document::from_json(&value).unwrap();

    match document.get_link("article.source").unwrap() {
        Link::Document(link) => assert!(link.is_broken),
        other => panic!("expected document link, got {:?}", other),
    }
}

//! Article extraction from nur.cn markup.
//!
//! nur.cn article pages live under `/news/` and end in `.shtml`. The
//! headline sits in `<h2 class="tt">` and the body in
//! `<div class="view_p mazmun">`. Only pages carrying neither of those
//! fall back to the document `<title>` or first `<h1>`, and to the
//! document's `<p>` paragraphs; on nur.cn markup those would be site
//! chrome.

use crate::models::Article;
use chrono::{Local, SecondsFormat};
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.tt").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("div.view_p.mazmun").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static DOC_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

static PUBLISHED: Lazy<Vec<Selector>> = Lazy::new(|| {
    parse_all(&[
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="publishdate"]"#,
        r#"meta[name="pubdate"]"#,
    ])
});
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time[datetime]").unwrap());
static CATEGORY: Lazy<Vec<Selector>> = Lazy::new(|| {
    parse_all(&[r#"meta[property="article:section"]"#, r#"meta[name="category"]"#])
});
static AUTHOR: Lazy<Vec<Selector>> = Lazy::new(|| {
    parse_all(&[r#"meta[name="author"]"#, r#"meta[property="article:author"]"#])
});

fn parse_all(selectors: &[&str]) -> Vec<Selector> {
    selectors.iter().map(|s| Selector::parse(s).unwrap()).collect()
}

/// Whether a URL points at a news article page.
pub fn is_article_url(url: &Url) -> bool {
    let path = url.path();
    path.contains("/news/") && path.ends_with(".shtml")
}

/// Extract an [`Article`] from page markup.
///
/// Returns `None` when the page has neither a title nor a body.
#[instrument(level = "debug", skip(html))]
pub fn extract_article(html: &str, url: &str) -> Option<Article> {
    if html.trim().is_empty() {
        return None;
    }
    let document = Html::parse_document(html);

    let headline = first_text(&document, &TITLE);
    let body = document.select(&BODY).next().map(stripped_lines);
    let nur_markup = headline.is_some() || body.is_some();

    let title = if nur_markup {
        headline.unwrap_or_default()
    } else {
        first_text(&document, &DOC_TITLE)
            .or_else(|| first_text(&document, &H1))
            .unwrap_or_default()
    };
    let content = match body {
        Some(body) => body,
        None if nur_markup => String::new(),
        None => paragraphs(&document),
    };

    if title.is_empty() && content.is_empty() {
        debug!("No title or body found");
        return None;
    }

    let publish_date = first_meta(&document, &PUBLISHED).or_else(|| {
        document
            .select(&TIME)
            .find_map(|t| non_empty(t.value().attr("datetime")))
    });

    Some(Article {
        url: url.to_string(),
        content_length: content.chars().count(),
        title,
        content,
        publish_date,
        category: first_meta(&document, &CATEGORY),
        author: first_meta(&document, &AUTHOR),
        crawl_time: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
    })
}

/// All outgoing links of a page, resolved against `base`, fragments
/// stripped, in document order without repeats.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    document
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .unique()
        .collect()
}

/// Text of the first match, each text node trimmed and concatenated.
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| el.text().map(str::trim).collect::<String>())
        .find(|t| !t.is_empty())
}

/// Text nodes of an element, trimmed, one per line.
fn stripped_lines(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).join("\n")
}

fn paragraphs(document: &Html) -> String {
    document
        .select(&PARAGRAPH)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .join("\n")
}

fn first_meta(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        document
            .select(sel)
            .find_map(|m| non_empty(m.value().attr("content")))
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

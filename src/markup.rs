//! Everything that knows what GitHub's HTML looks like.
//!
//! The rest of the crate only sees [`PinnedItem`] values and an optional
//! website string. When GitHub changes its markup, the selectors and
//! [`FieldSpec`]s below are the only things that should need to move.

use crate::types::PinnedItem;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const PINNED_ITEM_SELECTOR_STR: &str = ".pinned-item-list-item";
const REPO_NAME_SELECTOR_STR: &str = ".repo";
const DESCRIPTION_SELECTOR_STR: &str = ".pinned-item-desc";
const LANGUAGE_COLOR_SELECTOR_STR: &str = ".repo-language-color";
const STARS_SELECTOR_STR: &str = "a[href$=\"/stargazers\"]";
const FORKS_SELECTOR_STR: &str = "a[href$=\"/forks\"], a[href$=\"/network/members\"]";
const WEBSITE_SELECTOR_STR: &str = ".BorderGrid-cell a[href]";
const WEBSITE_FALLBACK_SELECTOR_STR: &str = ".Layout-sidebar a[href]";

static PINNED_ITEM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(PINNED_ITEM_SELECTOR_STR).expect("Failed to parse pinned item selector - this is a bug")
});

static REPO_NAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(REPO_NAME_SELECTOR_STR).expect("Failed to parse repo name selector - this is a bug")
});

static DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(DESCRIPTION_SELECTOR_STR).expect("Failed to parse description selector - this is a bug")
});

static LANGUAGE_COLOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(LANGUAGE_COLOR_SELECTOR_STR)
        .expect("Failed to parse language color selector - this is a bug")
});

static STARS_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(STARS_SELECTOR_STR).expect("Failed to parse stars selector - this is a bug")
});

static FORKS_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(FORKS_SELECTOR_STR).expect("Failed to parse forks selector - this is a bug")
});

static WEBSITE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(WEBSITE_SELECTOR_STR).expect("Failed to parse website selector - this is a bug")
});

static WEBSITE_FALLBACK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(WEBSITE_FALLBACK_SELECTOR_STR)
        .expect("Failed to parse website fallback selector - this is a bug")
});

/// How to read one field out of a container element.
#[derive(Clone, Copy)]
pub enum FieldSpec {
    /// Text content of the first descendant matching the selector.
    Text(&'static LazyLock<Selector>),
    /// Text of the first non-blank sibling following the matched element.
    NextSiblingText(&'static LazyLock<Selector>),
    /// A property from the matched element's inline `style` attribute.
    StyleProperty {
        selector: &'static LazyLock<Selector>,
        property: &'static str,
    },
}

pub static REPO_NAME: FieldSpec = FieldSpec::Text(&REPO_NAME_SELECTOR);
pub static DESCRIPTION: FieldSpec = FieldSpec::Text(&DESCRIPTION_SELECTOR);
pub static LANGUAGE: FieldSpec = FieldSpec::NextSiblingText(&LANGUAGE_COLOR_SELECTOR);
pub static LANGUAGE_COLOR: FieldSpec = FieldSpec::StyleProperty {
    selector: &LANGUAGE_COLOR_SELECTOR,
    property: "background-color",
};
pub static STARS: FieldSpec = FieldSpec::Text(&STARS_SELECTOR);
pub static FORKS: FieldSpec = FieldSpec::Text(&FORKS_SELECTOR);

/// Reads `spec` from `element`. Returns `None` when the sub-element is missing
/// or its value is blank; values are always trimmed.
pub fn extract_field(element: ElementRef<'_>, spec: &FieldSpec) -> Option<String> {
    let value = match *spec {
        FieldSpec::Text(selector) => element.select(selector).next().map(element_text),
        FieldSpec::NextSiblingText(selector) => {
            element.select(selector).next().and_then(next_sibling_text)
        }
        FieldSpec::StyleProperty { selector, property } => element
            .select(selector)
            .next()
            .and_then(|marker| marker.value().attr("style"))
            .and_then(|style| style_property(style, property)),
    }?;

    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parses a profile page into its pinned items, in document order.
pub fn parse_pinned_items(html: &str) -> Vec<PinnedItem> {
    let document = Html::parse_document(html);

    let items = document
        .select(&PINNED_ITEM_SELECTOR)
        .map(|item| PinnedItem {
            repo: extract_field(item, &REPO_NAME),
            description: extract_field(item, &DESCRIPTION),
            language: extract_field(item, &LANGUAGE),
            language_color: extract_field(item, &LANGUAGE_COLOR),
            stars: extract_field(item, &STARS),
            forks: extract_field(item, &FORKS),
        })
        .collect();
    items
}

/// First `https` link in the repository sidebar, if any.
pub fn find_website(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let website = document
        .select(&WEBSITE_SELECTOR)
        .chain(document.select(&WEBSITE_FALLBACK_SELECTOR))
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .find(|href| href.starts_with("https"))
        .map(str::to_string);
    website
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn next_sibling_text(element: ElementRef<'_>) -> Option<String> {
    element.next_siblings().find_map(|sibling| match sibling.value() {
        Node::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(sibling)
            .map(element_text)
            .filter(|text| !text.trim().is_empty()),
        _ => None,
    })
}

fn style_property(style: &str, property: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.trim().to_string())
}

//! Structural queries over parsed HTML.

use scraper::{ElementRef, Html, Selector};

/// Parse a full page. Blank input yields `None`.
pub fn parse_document(text: &str) -> Option<Html> {
    if text.trim().is_empty() {
        return None;
    }
    Some(Html::parse_document(text))
}

/// Parse a markup snippet. Blank input yields `None`.
pub fn parse_fragment(text: &str) -> Option<Html> {
    if text.trim().is_empty() {
        return None;
    }
    Some(Html::parse_fragment(text))
}

pub fn select_first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

pub fn select_all<'a>(element: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    element.select(selector).collect()
}

/// Attribute value, ignoring attributes that are blank
pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Visible text of an element, trimmed
pub fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// src/utils/text.rs
//! Text helpers shared by the section parsers.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use crate::utils::error::ExtractError;

/// Visible-label spans. The site renders each label twice; the `aria-hidden` copy is the visual one.
pub static ARIA_HIDDEN_SPAN: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span[aria-hidden='true']").expect("Failed to compile ARIA_HIDDEN_SPAN")
});

static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").expect("Failed to compile SPAN"));

const PLACEHOLDER_PATTERNS: &[&str] = &[
    "nothing to see for now",
    "will appear here",
    "no skills have been",
    "hasn't added",
    "not added any",
];

/// Compiles a runtime selector, mapping the parse error into our taxonomy.
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector(format!("{css}: {e:?}")))
}

/// Collapses runs of whitespace and trims.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All text below `element`, whitespace-normalized.
pub fn element_text(element: ElementRef) -> String {
    normalize(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text nodes below `element` as trimmed, non-empty lines in document order.
pub fn text_lines(element: ElementRef) -> Vec<String> {
    element
        .text()
        .map(normalize)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Every line after the first one (a heading followed by its value), newline-joined.
pub fn text_under_subtitle(element: ElementRef) -> String {
    text_lines(element).into_iter().skip(1).collect::<Vec<_>>().join("\n")
}

/// Text of the first `span` below `element`, or empty.
pub fn first_span_text(element: ElementRef) -> String {
    descendants(element, &SPAN).next().map(element_text).unwrap_or_default()
}

/// Matches of `selector` strictly below `element`.
pub fn descendants<'a, 'b>(
    element: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    element.select(selector).filter(move |found| found.id() != element.id())
}

/// Direct element children, skipping text and comment nodes.
pub fn element_children(element: ElementRef) -> Vec<ElementRef> {
    element.children().filter_map(ElementRef::wrap).collect()
}

pub fn first_element_child(element: ElementRef) -> Option<ElementRef> {
    element.children().find_map(ElementRef::wrap)
}

/// Parent element, if any.
pub fn parent_element(element: ElementRef) -> Option<ElementRef> {
    element.parent().and_then(ElementRef::wrap)
}

/// Matches of `selector` below `root` that are not nested inside another match.
pub fn outermost<'a>(root: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    descendants(root, selector)
        .filter(|candidate| {
            !candidate
                .ancestors()
                .take_while(|node| node.id() != root.id())
                .filter_map(ElementRef::wrap)
                .any(|ancestor| selector.matches(&ancestor))
        })
        .collect()
}

/// Distinct non-empty strings, first occurrence order.
pub fn unique_texts<I, S>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for text in texts {
        let text = normalize(text.as_ref());
        if !text.is_empty() && seen.insert(text.clone()) {
            unique.push(text);
        }
    }
    unique
}

/// Unique texts of the `aria-hidden` spans below `element`.
pub fn unique_span_texts(element: ElementRef) -> Vec<String> {
    unique_texts(element.select(&ARIA_HIDDEN_SPAN).map(element_text))
}

/// Texts of the `aria-hidden` spans below `element`, duplicates kept.
pub fn span_texts(element: ElementRef) -> Vec<String> {
    element.select(&ARIA_HIDDEN_SPAN).map(element_text).collect()
}

/// True for the site's "this section is empty" filler copy.
pub fn is_empty_section_placeholder(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLACEHOLDER_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// "Top VoicesTop Voices" -> "Top Voices". Anything else is returned unchanged.
pub fn collapse_doubled(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if !chars.is_empty() && chars.len() % 2 == 0 {
        let (left, right) = chars.split_at(chars.len() / 2);
        if left == right {
            return left.iter().collect();
        }
    }
    text.to_string()
}

/// `href` of `element`, treating an empty attribute as absent.
pub fn href(element: ElementRef) -> Option<String> {
    element
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

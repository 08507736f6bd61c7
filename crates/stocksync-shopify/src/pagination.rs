//! Cursor pagination for Admin REST list endpoints.
//!
//! Each list response carries a `Link` header with the URLs of adjacent
//! pages; the cursor is the `page_info` query parameter of the `rel="next"`
//! URL:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```
//!
//! A follow-up request may only repeat `limit` alongside `page_info`; any
//! other filter from the first request is encoded in the cursor.

use reqwest::Url;

/// Upper bound on pages per listing. A cursor that never ends is a bug on
/// one side or the other; stop instead of looping.
pub const MAX_PAGES: usize = 200;

/// Returns the `page_info` cursor of the `rel="next"` link, or `None` on the
/// last page.
#[must_use]
pub fn next_page_info(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .map(str::trim)
        .find(|directive| is_next(directive))
        .and_then(link_target)
        .and_then(|target| Url::parse(target).ok())
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "page_info")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|cursor| !cursor.is_empty())
}

fn is_next(directive: &str) -> bool {
    directive
        .split(';')
        .skip(1)
        .map(str::trim)
        .any(|param| param == r#"rel="next""# || param == "rel=next")
}

fn link_target(directive: &str) -> Option<&str> {
    let open = directive.find('<')?;
    let close = directive[open..].find('>')? + open;
    let target = &directive[open + 1..close];
    (!target.is_empty()).then_some(target)
}

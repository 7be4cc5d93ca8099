//! Route labels for spans and metrics.

use bazaar::orders::OrderNumber;
use uuid::Uuid;

/// Collapse identifiers in a request path so that every order shares one
/// route label.
pub(super) fn normalise_path(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if OrderNumber::parse(segment).is_ok() {
                "{order_number}"
            } else if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

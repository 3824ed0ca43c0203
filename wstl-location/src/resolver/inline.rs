//! `json://` arguments.

use crate::location::RawItem;

/// The payload, verbatim, as the only item. Nothing is decoded or validated.
#[must_use]
pub fn resolve_inline(payload: &str) -> Vec<RawItem> {
    vec![RawItem::Content(payload.to_owned())]
}

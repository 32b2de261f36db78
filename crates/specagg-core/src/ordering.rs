//! Deterministic ordering of tags and paths

use crate::aggregate::{PathItem, Tag};
use crate::types::HTTP_METHODS;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

/// Group key for paths whose primary operation carries no tag
pub const UNTAGGED_GROUP: &str = "untagged";

/// Orders tags and paths by a configured tag priority list.
///
/// Listed tags come first in list order; everything else follows by name.
#[derive(Debug, Clone, Copy)]
pub struct OrderingPolicy<'a> {
    tag_order: &'a [String],
}

impl<'a> OrderingPolicy<'a> {
    pub fn new(tag_order: &'a [String]) -> Self {
        Self { tag_order }
    }

    fn priority(&self, name: &str) -> Option<usize> {
        self.tag_order.iter().position(|t| t == name)
    }

    /// Compare two tag names under the priority rule
    pub fn compare_tags(&self, a: &str, b: &str) -> Ordering {
        match (self.priority(a), self.priority(b)) {
            (Some(ia), Some(ib)) => ia.cmp(&ib),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_names(a, b),
        }
    }

    pub fn sort_tags(&self, tags: &mut [Tag]) {
        tags.sort_by(|a, b| self.compare_tags(&a.name, &b.name));
    }

    /// Regroup paths by primary tag, groups in tag order, paths within a
    /// group by template.
    pub fn sort_paths(&self, paths: IndexMap<String, PathItem>) -> IndexMap<String, PathItem> {
        let mut groups: IndexMap<String, Vec<(String, PathItem)>> = IndexMap::new();
        for (path, item) in paths {
            let key = primary_tag(&item).unwrap_or(UNTAGGED_GROUP).to_string();
            groups.entry(key).or_default().push((path, item));
        }

        groups.sort_by(|a, _, b, _| self.compare_tags(a, b));

        let mut sorted = IndexMap::new();
        for (_, mut entries) in groups {
            entries.sort_by(|(a, _), (b, _)| compare_names(a, b));
            sorted.extend(entries);
        }
        sorted
    }
}

/// First tag of the first operation present, by method precedence
pub fn primary_tag(item: &PathItem) -> Option<&str> {
    HTTP_METHODS
        .iter()
        .find_map(|method| item.get(*method))
        .and_then(|operation| operation.get("tags"))
        .and_then(JsonValue::as_array)
        .and_then(|tags| tags.first())
        .and_then(JsonValue::as_str)
}

/// Case-insensitive order with a byte-wise tie break, so the result is
/// total and stable across platforms.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

//! Nested view over the flat collection listing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Collection;
use crate::request::RequestSummary;

/// A collection together with its sub-collections and requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNode {
    /// The collection itself.
    #[serde(flatten)]
    pub collection: Collection,
    /// Child collections in listing order.
    #[serde(default)]
    pub children: Vec<Self>,
    /// Requests owned by this collection, in sort order.
    #[serde(default)]
    pub requests: Vec<RequestSummary>,
}

/// Everything the sidebar shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionForest {
    /// Top-level collections.
    pub collections: Vec<CollectionNode>,
    /// Requests with no collection, or whose collection no longer exists.
    pub loose_requests: Vec<RequestSummary>,
}

/// Builds the nested forest from flat listings.
///
/// A collection whose parent is absent from `collections` is shown at the top
/// level, while its stored parent id is left untouched. Collections caught in
/// a stored cycle are also lifted to the top level so nothing disappears from
/// the view. Requests are placed under their collection ordered by
/// `sort_order` (unpositioned last, then by id).
#[must_use]
pub fn build_forest(collections: &[Collection], requests: &[RequestSummary]) -> CollectionForest {
    let index: HashMap<&str, usize> = collections
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); collections.len()];
    let mut roots = Vec::new();
    for (i, collection) in collections.iter().enumerate() {
        match collection
            .parent_collection_id
            .as_deref()
            .and_then(|parent| index.get(parent))
        {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut owned: HashMap<&str, Vec<RequestSummary>> = HashMap::new();
    let mut loose_requests = Vec::new();
    for request in requests {
        match request.collection_id.as_deref() {
            Some(id) if index.contains_key(id) => {
                owned.entry(id).or_default().push(request.clone());
            }
            _ => loose_requests.push(request.clone()),
        }
    }
    for list in owned.values_mut() {
        list.sort_by_key(RequestSummary::sort_key);
    }
    loose_requests.sort_by_key(RequestSummary::sort_key);

    let mut visited = vec![false; collections.len()];
    let mut nodes = Vec::new();
    for root in roots {
        nodes.push(build_node(root, collections, &children, &mut owned, &mut visited));
    }
    for i in 0..collections.len() {
        if !visited[i] {
            nodes.push(build_node(i, collections, &children, &mut owned, &mut visited));
        }
    }

    CollectionForest {
        collections: nodes,
        loose_requests,
    }
}

fn build_node(
    at: usize,
    collections: &[Collection],
    children: &[Vec<usize>],
    owned: &mut HashMap<&str, Vec<RequestSummary>>,
    visited: &mut [bool],
) -> CollectionNode {
    visited[at] = true;
    let collection = &collections[at];

    let mut nested = Vec::with_capacity(children[at].len());
    for &child in &children[at] {
        if !visited[child] {
            nested.push(build_node(child, collections, children, owned, visited));
        }
    }

    CollectionNode {
        collection: collection.clone(),
        children: nested,
        requests: owned.remove(collection.id.as_str()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collection(id: &str, parent: Option<&str>) -> Collection {
        Collection {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            schema: None,
            version: None,
            parent_collection_id: parent.map(ToString::to_string),
        }
    }

    fn request(id: i64, collection_id: Option<&str>, sort_order: Option<i64>) -> RequestSummary {
        RequestSummary {
            id,
            collection_id: collection_id.map(ToString::to_string),
            name: format!("r{id}"),
            description: String::new(),
            method: "GET".to_string(),
            url: String::new(),
            sort_order,
        }
    }

    fn count(node: &CollectionNode) -> usize {
        1 + node.children.iter().map(count).sum::<usize>()
    }

    fn names(nodes: &[CollectionNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.collection.id.as_str()).collect()
    }

    #[test]
    fn nests_children_under_parents() {
        let collections = vec![
            collection("root", None),
            collection("auth", Some("root")),
            collection("users", Some("root")),
            collection("tokens", Some("auth")),
        ];

        let forest = build_forest(&collections, &[]);

        assert_eq!(names(&forest.collections), vec!["root"]);
        let root = &forest.collections[0];
        assert_eq!(names(&root.children), vec!["auth", "users"]);
        assert_eq!(names(&root.children[0].children), vec!["tokens"]);
        assert_eq!(count(root), 4);
    }

    #[test]
    fn dangling_parent_is_shown_at_top_level() {
        let collections = vec![collection("orphan", Some("deleted"))];

        let forest = build_forest(&collections, &[]);

        assert_eq!(names(&forest.collections), vec!["orphan"]);
        assert_eq!(
            forest.collections[0].collection.parent_collection_id.as_deref(),
            Some("deleted")
        );
    }

    #[test]
    fn stored_cycle_does_not_hide_collections() {
        let collections = vec![collection("a", Some("b")), collection("b", Some("a"))];

        let forest = build_forest(&collections, &[]);

        assert_eq!(names(&forest.collections), vec!["a"]);
        assert_eq!(names(&forest.collections[0].children), vec!["b"]);
    }

    #[test]
    fn requests_are_sorted_within_their_collection() {
        let collections = vec![collection("root", None)];
        let requests = vec![
            request(3, Some("root"), None),
            request(1, Some("root"), Some(1)),
            request(2, Some("root"), Some(0)),
            request(4, None, Some(0)),
            request(5, Some("gone"), Some(0)),
        ];

        let forest = build_forest(&collections, &requests);

        let ids: Vec<i64> = forest.collections[0].requests.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        let loose: Vec<i64> = forest.loose_requests.iter().map(|r| r.id).collect();
        assert_eq!(loose, vec![4, 5]);
    }
}

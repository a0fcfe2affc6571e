//! Category grouping: the one ordering every renderer agrees on.

use crate::types::{Category, TechniqueRecord};

/// A category plus its records, sorted by `(display_name, key)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub records: Vec<TechniqueRecord>,
}

/// Group `records` by category.
///
/// Categories listed in `order` come first, in that order; any other category
/// follows in the order it was first seen. Categories without records are
/// omitted.
pub fn group_by_category(records: &[TechniqueRecord], order: &[Category]) -> Vec<CategoryGroup> {
    let mut seen: Vec<&Category> = Vec::new();
    for record in records {
        if !seen.contains(&&record.category) {
            seen.push(&record.category);
        }
    }

    let known = order.iter().filter(|c| seen.contains(c));
    let unknown = seen.iter().copied().filter(|c| !order.contains(c));

    let mut placed: Vec<&Category> = Vec::new();
    for category in known.chain(unknown) {
        if !placed.contains(&category) {
            placed.push(category);
        }
    }

    placed
        .into_iter()
        .map(|category| {
            let mut members: Vec<TechniqueRecord> = records
                .iter()
                .filter(|r| &r.category == category)
                .cloned()
                .collect();
            members.sort_by(|a, b| {
                a.display_name
                    .cmp(&b.display_name)
                    .then_with(|| a.key.cmp(&b.key))
            });
            CategoryGroup {
                category: category.clone(),
                records: members,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::TechniqueKey;

    fn record(key: &str, name: &str, category: &str) -> TechniqueRecord {
        TechniqueRecord {
            key: TechniqueKey::from(key),
            display_name: name.to_string(),
            category: Category::from(category),
            description: String::new(),
            version: "1.0.0".to_string(),
            implementing_type: String::new(),
            source_module: String::new(),
            dependencies: BTreeSet::new(),
            usage_example: None,
        }
    }

    fn names(groups: &[CategoryGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.category.0.as_str()).collect()
    }

    #[test]
    fn canonical_categories_precede_unknown_ones() {
        let records = vec![
            record("a", "A", "graph"),
            record("b", "B", "retrieval"),
            record("c", "C", "chunking"),
            record("d", "D", "agents"),
        ];
        let groups = group_by_category(&records, &Category::canonical_order());
        assert_eq!(names(&groups), vec!["chunking", "retrieval", "graph", "agents"]);
    }

    #[test]
    fn members_sorted_by_display_name_then_key() {
        let records = vec![
            record("z", "Beta", "chunking"),
            record("b", "Alpha", "chunking"),
            record("a", "Alpha", "chunking"),
        ];
        let groups = group_by_category(&records, &Category::canonical_order());
        let keys: Vec<&str> = groups[0].records.iter().map(|r| r.key.0.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "z"]);
    }

    #[test]
    fn input_order_does_not_change_grouping() {
        let mut records = vec![
            record("x", "X", "reranking"),
            record("y", "Y", "chunking"),
            record("z", "Z", "chunking"),
        ];
        let first = group_by_category(&records, &Category::canonical_order());
        records.reverse();
        let second = group_by_category(&records, &Category::canonical_order());
        assert_eq!(first, second);
    }
}
